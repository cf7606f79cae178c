use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;

#[cfg(test)]
use mockall::automock;

/// Remote calls the fine-tuning workflow needs. Every method returns the
/// decoded JSON body of a successful response.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait FineTuneProvider: Send + Sync {
    async fn upload_file(&self, file_path: &Path) -> Result<Value>;

    async fn retrieve_file(&self, file_id: &str) -> Result<Value>;

    async fn create_fine_tuning_job(
        &self,
        training_file: &str,
        model: &str,
        suffix: Option<String>,
    ) -> Result<Value>;

    async fn retrieve_fine_tuning_job(&self, job_id: &str) -> Result<Value>;
}
