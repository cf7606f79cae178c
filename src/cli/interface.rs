use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use colored::Colorize;
use log::error;

use crate::adapters::openai::OpenAI;
use crate::core::train::Trainer;
use crate::utils::console::{final_report, ConsoleReporter};
use crate::utils::lib::{normalize_legacy_flags, Args};

pub async fn run_cli_interface() -> Result<()> {
    let args = parse_args();
    let openai = OpenAI::new(args.token.clone()).with_base_url(args.base_url.clone());
    let trainer = Trainer::new(openai, ConsoleReporter::new(), args.training_config());

    // A failed step ends the run after reporting; it is not a process error.
    match trainer.run().await {
        Ok(outcome) => println!("{}", final_report(outcome.fine_tuned_model.as_deref())),
        Err(err) => {
            error!("Fine-tuning run aborted: {:?}", err);
            eprintln!("{}", format!("{:#}", err).red());
        }
    }
    Ok(())
}

fn parse_args() -> Args {
    match Args::try_parse_from(normalize_legacy_flags(std::env::args_os())) {
        Ok(args) => args,
        Err(err) => {
            if !matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                eprintln!("{}", "[!] Failed to start.".red());
            }
            err.exit()
        }
    }
}
