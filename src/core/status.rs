use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// Where a remote resource stands from the point of view of a poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Pending,
    Succeeded,
    Failed,
}

pub trait RemoteStatus {
    fn progress(&self) -> Progress;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Uploaded,
    Processing,
    Processed,
    Error,
    Deleted,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    ValidatingFiles,
    Queued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl RemoteStatus for FileStatus {
    fn progress(&self) -> Progress {
        match self {
            FileStatus::Processed => Progress::Succeeded,
            FileStatus::Error | FileStatus::Deleted => Progress::Failed,
            _ => Progress::Pending,
        }
    }
}

impl RemoteStatus for JobStatus {
    fn progress(&self) -> Progress {
        match self {
            JobStatus::Succeeded => Progress::Succeeded,
            JobStatus::Failed | JobStatus::Cancelled => Progress::Failed,
            _ => Progress::Pending,
        }
    }
}

/// Reads the `status` field of a response body. A missing or non-string
/// status yields `None`, which poll loops treat as still pending.
pub fn parse_status<S>(body: &Value) -> Option<S>
where
    S: for<'de> Deserialize<'de>,
{
    body.get("status")
        .filter(|status| status.is_string())
        .and_then(|status| S::deserialize(status).ok())
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileStatus::Uploaded => "uploaded",
            FileStatus::Processing => "processing",
            FileStatus::Processed => "processed",
            FileStatus::Error => "error",
            FileStatus::Deleted => "deleted",
            FileStatus::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobStatus::ValidatingFiles => "validating_files",
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
            JobStatus::Unknown => "unknown",
        };
        f.write_str(name)
    }
}
