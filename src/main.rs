use anyhow::Result;
use env_logger::Env;
use finetune_pilot::cli::interface::run_cli_interface;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    run_cli_interface().await?;
    Ok(())
}
