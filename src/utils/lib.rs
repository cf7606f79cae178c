use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;
use tokio::time::Duration;

use crate::adapters::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::core::poll::PollPolicy;
use crate::core::train::TrainingConfig;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the training data file
    #[clap(short, long, value_parser)]
    pub file: PathBuf,

    /// OpenAI API token
    #[clap(short, long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub token: String,

    #[clap(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Suffix appended to the fine-tuned model name
    #[clap(long)]
    pub suffix: Option<String>,

    #[clap(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[clap(long, default_value = "1")]
    pub poll_interval_secs: u64,

    /// Give up after this many status checks per wait
    #[clap(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_polls: Option<u32>,

    /// Give up after waiting this many seconds per wait
    #[clap(long)]
    pub timeout_secs: Option<u64>,
}

impl Args {
    pub fn training_config(&self) -> TrainingConfig {
        TrainingConfig {
            file_path: self.file.clone(),
            model: self.model.clone(),
            suffix: self.suffix.clone(),
            poll: PollPolicy {
                interval: Duration::from_secs(self.poll_interval_secs),
                max_polls: self.max_polls,
                timeout: self.timeout_secs.map(Duration::from_secs),
            },
        }
    }
}

const LONG_FLAGS: &[&str] = &[
    "file",
    "token",
    "model",
    "suffix",
    "base-url",
    "poll-interval-secs",
    "max-polls",
    "timeout-secs",
];

/// Rewrites single-dash long flags (`-file x`, `-token=y`) into the
/// double-dash form clap expects.
pub fn normalize_legacy_flags<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| {
            let rewritten = arg.to_str().and_then(|text| {
                let rest = text.strip_prefix('-')?;
                if rest.starts_with('-') {
                    return None;
                }
                let name = rest.split('=').next().unwrap_or(rest);
                LONG_FLAGS.contains(&name).then(|| OsString::from(format!("-{}", text)))
            });
            rewritten.unwrap_or(arg)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn single_dash_long_flags_are_rewritten() {
        let normalized =
            normalize_legacy_flags(os(&["bin", "-file", "a.jsonl", "-token=sk", "-f", "b"]));
        assert_eq!(normalized, os(&["bin", "--file", "a.jsonl", "--token=sk", "-f", "b"]));
    }

    #[test]
    fn values_and_unknown_flags_are_left_alone() {
        let normalized = normalize_legacy_flags(os(&["bin", "--file", "-model.jsonl", "-x"]));
        assert_eq!(normalized, os(&["bin", "--file", "-model.jsonl", "-x"]));
    }

    #[test]
    fn legacy_and_modern_forms_parse_the_same() {
        let legacy_args = os(&["bin", "-file", "train.jsonl", "-token", "sk-1"]);
        let legacy = Args::try_parse_from(normalize_legacy_flags(legacy_args)).unwrap();
        let modern =
            Args::try_parse_from(os(&["bin", "--file", "train.jsonl", "--token", "sk-1"])).unwrap();

        assert_eq!(legacy.file, modern.file);
        assert_eq!(legacy.token, "sk-1");
        assert_eq!(legacy.model, DEFAULT_MODEL);
        assert_eq!(legacy.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn missing_file_is_a_usage_error() {
        let err = Args::try_parse_from(os(&["bin", "--token", "sk-1"])).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn poll_flags_become_a_policy() {
        let args = Args::try_parse_from(os(&[
            "bin",
            "-f",
            "t.jsonl",
            "-t",
            "sk",
            "--poll-interval-secs",
            "5",
            "--max-polls",
            "10",
            "--timeout-secs",
            "600",
        ]))
        .unwrap();
        let config = args.training_config();

        assert_eq!(
            config.poll,
            PollPolicy {
                interval: Duration::from_secs(5),
                max_polls: Some(10),
                timeout: Some(Duration::from_secs(600)),
            }
        );
    }

    #[test]
    fn zero_poll_cap_is_rejected() {
        let result = Args::try_parse_from(os(&["bin", "-f", "t", "-t", "sk", "--max-polls", "0"]));
        assert!(result.is_err());
    }
}
