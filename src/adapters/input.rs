use anyhow::{Context, Result};
use log::{debug, info};
use std::path::PathBuf;

/// A local training-data file about to be uploaded.
pub struct TrainingFile {
    path: PathBuf,
}

impl TrainingFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Base name sent as the multipart file name.
    pub fn file_name(&self) -> Result<String> {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .with_context(|| format!("Failed to get file name from {:?}", self.path))
    }

    pub async fn read(&self) -> Result<Vec<u8>> {
        info!("Reading training file: {:?}", self.path);
        let content = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to open file: {:?}", self.path))?;
        debug!("Read {} bytes from {:?}", content.len(), self.path);
        Ok(content)
    }
}
