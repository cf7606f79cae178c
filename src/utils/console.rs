use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::Duration;

use crate::core::train::{TrainingEvent, TrainingObserver};

/// Prints workflow progress the way an operator watches it: `[!]` for
/// in-flight stages, `[+]` for finished ones, and a wait line redrawn in
/// place while the remote side is busy. Everything goes to stdout.
pub struct ConsoleReporter {
    waiting: Mutex<Option<WaitLine>>,
}

/// The line currently being redrawn. A spinner when stdout is a terminal,
/// otherwise a plain `\r`-rewritten line.
enum WaitLine {
    Spinner(ProgressBar),
    Plain,
}

impl WaitLine {
    fn open() -> Self {
        let spinner = create_wait_spinner();
        if spinner.is_hidden() {
            WaitLine::Plain
        } else {
            WaitLine::Spinner(spinner)
        }
    }

    fn update(&self, message: String) {
        match self {
            WaitLine::Spinner(spinner) => spinner.set_message(message),
            WaitLine::Plain => {
                print!("\r{}", message);
                let _ = io::stdout().flush();
            }
        }
    }

    fn println(&self, line: String) {
        match self {
            WaitLine::Spinner(spinner) => spinner.println(line),
            WaitLine::Plain => println!("\n{}", line),
        }
    }

    fn close(self) {
        match self {
            WaitLine::Spinner(spinner) => spinner.finish(),
            WaitLine::Plain => println!(),
        }
    }
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self { waiting: Mutex::new(None) }
    }

    fn wait(&self, what: &str, elapsed: Duration) {
        let message = format!(
            "{} {} Elapsed Time: {}",
            "[!]".yellow(),
            what,
            format_elapsed(elapsed)
        );
        let Ok(mut waiting) = self.waiting.lock() else {
            println!("{}", message);
            return;
        };
        waiting.get_or_insert_with(WaitLine::open).update(message);
    }

    fn finish_wait(&self) {
        if let Ok(mut waiting) = self.waiting.lock() {
            if let Some(line) = waiting.take() {
                line.close();
            }
        }
    }

    fn print(&self, line: String) {
        if let Ok(waiting) = self.waiting.lock() {
            if let Some(waiting) = waiting.as_ref() {
                waiting.println(line);
                return;
            }
        }
        println!("{}", line);
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl TrainingObserver for ConsoleReporter {
    fn notify(&self, event: TrainingEvent<'_>) {
        match event {
            TrainingEvent::Started => println!(
                "{} Starting... Elapsed Time: {}",
                "[!]".yellow(),
                format_elapsed(Duration::ZERO)
            ),
            TrainingEvent::FileUploaded { file_id, elapsed } => println!(
                "{} File uploaded successfully. File ID: {} Elapsed Time: {}",
                "[+]".green(),
                file_id,
                format_elapsed(elapsed)
            ),
            TrainingEvent::WaitingForFile { elapsed } => {
                self.wait("Waiting for file processing...", elapsed)
            }
            TrainingEvent::FileProcessed => {
                self.finish_wait();
                println!("{} File processing completed.", "[+]".green());
            }
            TrainingEvent::JobStarting { elapsed } => println!(
                "{} Starting Fine-tuning Job... Elapsed Time: {}",
                "[!]".yellow(),
                format_elapsed(elapsed)
            ),
            TrainingEvent::JobCreated { job_id } => println!(
                "{} Fine-tuning job created successfully. Job ID: {}",
                "[+]".green(),
                job_id
            ),
            TrainingEvent::WaitingForJob { elapsed } => {
                self.wait("Waiting for fine-tuning job to complete...", elapsed)
            }
            TrainingEvent::JobCompleted { elapsed } => {
                self.finish_wait();
                println!("{} Fine-tuning job completed.", "[+]".green());
                println!("{} Elapsed Time: {}", "[!]".yellow(), format_elapsed(elapsed));
            }
            TrainingEvent::StatusCheckFailed { resource, error } => {
                let line = format!("Failed to check {} status: {:#}", resource, error);
                self.print(line.red().to_string())
            }
            // The caller prints the error itself; only the wait line is closed here.
            TrainingEvent::Aborted { .. } => self.finish_wait(),
        }
    }
}

pub fn create_wait_spinner() -> ProgressBar {
    let spinner = ProgressBar::with_draw_target(None, ProgressDrawTarget::stdout());
    let style = ProgressStyle::with_template("{spinner:.yellow} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

pub fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.2} seconds", elapsed.as_secs_f64())
}

/// Last line of a run.
pub fn final_report(fine_tuned_model: Option<&str>) -> String {
    match fine_tuned_model {
        Some(model) => format!("\nFine-tuned model ready to use: {}", model),
        None => "No fine-tuned model available.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_has_two_decimals() {
        assert_eq!(format_elapsed(Duration::from_millis(1500)), "1.50 seconds");
        assert_eq!(format_elapsed(Duration::ZERO), "0.00 seconds");
    }

    #[test]
    fn final_report_names_the_model() {
        assert_eq!(
            final_report(Some("ft:gpt-3.5-turbo-0613:acme::abc123")),
            "\nFine-tuned model ready to use: ft:gpt-3.5-turbo-0613:acme::abc123"
        );
        assert_eq!(final_report(None), "No fine-tuned model available.");
    }

    #[test]
    fn wait_line_is_closed_once_waiting_ends() {
        let reporter = ConsoleReporter::new();
        reporter.notify(TrainingEvent::WaitingForJob { elapsed: Duration::from_secs(2) });
        assert!(reporter.waiting.lock().unwrap().is_some());

        reporter.notify(TrainingEvent::JobCompleted { elapsed: Duration::from_secs(3) });
        assert!(reporter.waiting.lock().unwrap().is_none());
    }

    #[test]
    fn aborted_run_closes_the_wait_line() {
        let reporter = ConsoleReporter::new();
        reporter.notify(TrainingEvent::WaitingForJob { elapsed: Duration::from_secs(1) });
        assert!(reporter.waiting.lock().unwrap().is_some());

        let error = anyhow::anyhow!("fine-tuning job job-1 reached terminal status `failed`");
        reporter.notify(TrainingEvent::Aborted { error: &error });
        assert!(reporter.waiting.lock().unwrap().is_none());
    }
}
