use anyhow::{Context, Result};
use log::{info, warn};
use serde_json::Value;
use std::path::PathBuf;
use tokio::time::{Duration, Instant};

use crate::adapters::provider::FineTuneProvider;
use crate::core::poll::{poll_until, PollPolicy, PollState, PollTarget};
use crate::core::status::{parse_status, FileStatus, JobStatus, Progress, RemoteStatus};
use crate::utils::json::{required_string_field, string_at, string_field};

pub struct TrainingConfig {
    pub file_path: PathBuf,
    pub model: String,
    pub suffix: Option<String>,
    pub poll: PollPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingOutcome {
    pub file_id: String,
    pub job_id: String,
    pub fine_tuned_model: Option<String>,
}

/// Progress notifications emitted while the workflow runs. Elapsed times
/// are measured from the start of the current stage.
#[derive(Debug)]
pub enum TrainingEvent<'a> {
    Started,
    FileUploaded { file_id: &'a str, elapsed: Duration },
    WaitingForFile { elapsed: Duration },
    FileProcessed,
    JobStarting { elapsed: Duration },
    JobCreated { job_id: &'a str },
    WaitingForJob { elapsed: Duration },
    JobCompleted { elapsed: Duration },
    StatusCheckFailed { resource: &'static str, error: &'a anyhow::Error },
    Aborted { error: &'a anyhow::Error },
}

pub trait TrainingObserver {
    fn notify(&self, event: TrainingEvent<'_>);
}

impl TrainingObserver for () {
    fn notify(&self, _event: TrainingEvent<'_>) {}
}

const FILE: &str = "file";
const JOB: &str = "fine-tuning job";

pub struct Trainer<P: FineTuneProvider, O: TrainingObserver> {
    provider: P,
    observer: O,
    config: TrainingConfig,
}

impl<P: FineTuneProvider, O: TrainingObserver> Trainer<P, O> {
    pub fn new(provider: P, observer: O, config: TrainingConfig) -> Trainer<P, O> {
        Self { provider, observer, config }
    }

    /// Runs upload, file processing, job creation, job completion and model
    /// lookup in order. The first failure aborts the run and is announced
    /// with `TrainingEvent::Aborted` before being returned.
    pub async fn run(&self) -> Result<TrainingOutcome> {
        let result = self.run_stages().await;
        if let Err(error) = &result {
            self.observer.notify(TrainingEvent::Aborted { error });
        }
        result
    }

    async fn run_stages(&self) -> Result<TrainingOutcome> {
        let started = Instant::now();
        self.observer.notify(TrainingEvent::Started);

        let file_id = self.upload().await.context("File upload failed")?;
        self.observer.notify(TrainingEvent::FileUploaded {
            file_id: &file_id,
            elapsed: started.elapsed(),
        });

        let stage = Instant::now();
        self.wait_for_file(&file_id)
            .await
            .context("File processing failed")?;
        self.observer.notify(TrainingEvent::FileProcessed);
        self.observer.notify(TrainingEvent::JobStarting { elapsed: stage.elapsed() });

        let job_id = self
            .create_job(&file_id)
            .await
            .context("Fine-tuning job creation failed")?;
        self.observer.notify(TrainingEvent::JobCreated { job_id: &job_id });

        let stage = Instant::now();
        self.wait_for_job(&job_id)
            .await
            .context("Fine-tuning job did not succeed")?;
        self.observer.notify(TrainingEvent::JobCompleted { elapsed: stage.elapsed() });

        let fine_tuned_model = self
            .fetch_fine_tuned_model(&job_id)
            .await
            .context("Failed to retrieve the fine-tuned model")?;

        Ok(TrainingOutcome { file_id, job_id, fine_tuned_model })
    }

    pub async fn upload(&self) -> Result<String> {
        let response = self.provider.upload_file(&self.config.file_path).await?;
        let file_id = required_string_field(&response, "id", "file upload")?;
        info!("Uploaded {:?} as {}", self.config.file_path, file_id);
        Ok(file_id)
    }

    pub async fn wait_for_file(&self, file_id: &str) -> Result<()> {
        let provider = &self.provider;
        let observer = &self.observer;
        poll_until(
            &self.config.poll,
            PollTarget { resource: FILE, id: file_id },
            move || async move {
                let response = provider.retrieve_file(file_id).await;
                classify::<FileStatus>(FILE, response, observer)
            },
            |elapsed| observer.notify(TrainingEvent::WaitingForFile { elapsed }),
        )
        .await?;
        Ok(())
    }

    pub async fn create_job(&self, file_id: &str) -> Result<String> {
        let response = self
            .provider
            .create_fine_tuning_job(file_id, &self.config.model, self.config.suffix.clone())
            .await?;
        let job_id = required_string_field(&response, "id", "fine-tuning job creation")?;
        info!("Created fine-tuning job {} for {}", job_id, file_id);
        Ok(job_id)
    }

    pub async fn wait_for_job(&self, job_id: &str) -> Result<()> {
        let provider = &self.provider;
        let observer = &self.observer;
        poll_until(
            &self.config.poll,
            PollTarget { resource: JOB, id: job_id },
            move || async move {
                let response = provider.retrieve_fine_tuning_job(job_id).await;
                classify::<JobStatus>(JOB, response, observer)
            },
            |elapsed| observer.notify(TrainingEvent::WaitingForJob { elapsed }),
        )
        .await?;
        Ok(())
    }

    pub async fn fetch_fine_tuned_model(&self, job_id: &str) -> Result<Option<String>> {
        let response = self.provider.retrieve_fine_tuning_job(job_id).await?;
        Ok(string_field(&response, "fine_tuned_model"))
    }
}

/// Maps one status response onto a poll state. A request that failed is
/// reported and treated as still pending.
fn classify<S>(
    resource: &'static str,
    response: Result<Value>,
    observer: &impl TrainingObserver,
) -> PollState<()>
where
    S: RemoteStatus + std::fmt::Display + for<'de> serde::Deserialize<'de>,
{
    let body = match response {
        Ok(body) => body,
        Err(error) => {
            warn!("{} status check failed: {:#}", resource, error);
            observer.notify(TrainingEvent::StatusCheckFailed { resource, error: &error });
            return PollState::Pending;
        }
    };

    match parse_status::<S>(&body) {
        Some(status) => match status.progress() {
            Progress::Succeeded => PollState::Done(()),
            Progress::Failed => PollState::Failed {
                status: string_field(&body, "status").unwrap_or_else(|| status.to_string()),
                message: string_at(&body, "/error/message"),
            },
            Progress::Pending => PollState::Pending,
        },
        None => PollState::Pending,
    }
}
