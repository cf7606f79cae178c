use std::time::Duration;
use thiserror::Error;

/// Workflow failures a caller may want to tell apart.
///
/// These travel inside `anyhow::Error` and can be recovered with
/// `downcast_ref::<WorkflowError>()`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("{operation} response did not contain `{field}`")]
    MissingField {
        operation: &'static str,
        field: &'static str,
    },

    #[error("{resource} {id} reached terminal status `{status}`{}", detail_suffix(.message))]
    TerminalStatus {
        resource: &'static str,
        id: String,
        status: String,
        message: Option<String>,
    },

    #[error("{resource} {id} was still pending after {attempts} status checks")]
    PollLimit {
        resource: &'static str,
        id: String,
        attempts: u32,
    },

    #[error("{resource} {id} was still pending after {:.2} seconds", .waited.as_secs_f64())]
    Timeout {
        resource: &'static str,
        id: String,
        waited: Duration,
    },
}

fn detail_suffix(message: &Option<String>) -> String {
    match message {
        Some(message) => format!(": {}", message),
        None => String::new(),
    }
}
