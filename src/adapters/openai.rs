use super::input::TrainingFile;
use super::provider::FineTuneProvider;
use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde_json::{json, Value};
use std::path::Path;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo-0613";

const FILE_PURPOSE: &str = "fine-tune";

pub struct OpenAI {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAI {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn generate_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .context("Failed to create Authorization header")?,
        );
        Ok(headers)
    }

    async fn get_json(&self, path: &str, operation: &str) -> Result<Value> {
        let response = self
            .client
            .get(self.url(path))
            .headers(self.generate_headers()?)
            .send()
            .await
            .with_context(|| format!("Failed to send {} request", operation))?;
        read_json(response, operation).await
    }
}

/// Decodes a successful response body, or turns a failed one into an error
/// carrying the status and response text.
async fn read_json(response: Response, operation: &str) -> Result<Value> {
    let status = response.status();
    if status.is_success() {
        let body: Value = response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} response as JSON", operation))?;
        info!("{} request successful", operation);
        debug!("Response: {:?}", body);
        Ok(body)
    } else {
        let error_text = response
            .text()
            .await
            .with_context(|| format!("Failed to get error text from {} response", operation))?;
        error!("{} failed with {}: {}", operation, status, error_text);
        anyhow::bail!("{} failed with {}: {}", operation, status, error_text)
    }
}

#[async_trait]
impl FineTuneProvider for OpenAI {
    async fn upload_file(&self, file_path: &Path) -> Result<Value> {
        let training_file = TrainingFile::new(file_path);
        let content = training_file.read().await?;
        let file_name = training_file.file_name()?;

        let part = Part::bytes(content)
            .file_name(file_name)
            .mime_str("application/json")
            .context("Failed to set MIME type")?;

        let form = Form::new()
            .part("file", part)
            .text("purpose", FILE_PURPOSE);

        let response = self
            .client
            .post(self.url("files"))
            .headers(self.generate_headers()?)
            .multipart(form)
            .send()
            .await
            .context("Failed to send file upload request")?;

        read_json(response, "file upload").await
    }

    async fn retrieve_file(&self, file_id: &str) -> Result<Value> {
        self.get_json(&format!("files/{}", file_id), "file status").await
    }

    async fn create_fine_tuning_job(
        &self,
        training_file: &str,
        model: &str,
        suffix: Option<String>,
    ) -> Result<Value> {
        let mut body = json!({
            "training_file": training_file,
            "model": model,
        });
        if let Some(suffix) = suffix {
            body["suffix"] = json!(suffix);
        }

        let response = self
            .client
            .post(self.url("fine_tuning/jobs"))
            .headers(self.generate_headers()?)
            .json(&body)
            .send()
            .await
            .context("Failed to send fine-tuning job request")?;

        read_json(response, "fine-tuning job creation").await
    }

    async fn retrieve_fine_tuning_job(&self, job_id: &str) -> Result<Value> {
        self.get_json(&format!("fine_tuning/jobs/{}", job_id), "fine-tuning job status")
            .await
    }
}
