//! Model downloader
//!
//! Fetches the ONNX export of the classifier and its JSON metadata from a
//! HuggingFace-style repository (`<base>/<remote path>`).

use anyhow::{Context, Result};
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Default repository holding the classifier
pub const DEFAULT_MODEL_URL: &str =
    "https://huggingface.co/prithivMLmods/Deep-Fake-Detector-v2-Model/resolve/main";

/// Files to download: (remote_path, local_name, description)
const MODEL_FILES: &[(&str, &str, &str)] = &[
    ("onnx/model.onnx", crate::engine::MODEL_FILE, "Classifier weights"),
    ("config.json", "config.json", "Label mapping"),
    ("preprocessor_config.json", "preprocessor_config.json", "Image preprocessing"),
];

/// Model downloader
pub struct ModelDownloader {
    model_dir: PathBuf,
    base_url: String,
}

impl ModelDownloader {
    /// Create a downloader targeting the specified model directory
    pub fn new(model_dir: PathBuf) -> Self {
        Self::with_base_url(model_dir, DEFAULT_MODEL_URL)
    }

    /// Create a downloader for a different repository
    pub fn with_base_url(model_dir: PathBuf, base_url: impl Into<String>) -> Self {
        Self {
            model_dir,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    /// Check if all model files are present
    pub fn is_complete(&self) -> bool {
        self.missing_files().is_empty()
    }

    /// Get list of missing model files
    pub fn missing_files(&self) -> Vec<&'static str> {
        MODEL_FILES
            .iter()
            .filter(|(_, local_name, _)| !self.model_dir.join(local_name).exists())
            .map(|(_, local_name, _)| *local_name)
            .collect()
    }

    fn url_for(&self, remote_path: &str) -> String {
        format!("{}/{}", self.base_url, remote_path)
    }

    /// Download all model files
    ///
    /// If `force` is true, re-downloads all files even if they exist.
    pub async fn download_all(&self, force: bool) -> Result<()> {
        tokio::fs::create_dir_all(&self.model_dir)
            .await
            .context("Failed to create model directory")?;

        info!("Downloading model to {:?}", self.model_dir);

        let client = reqwest::Client::new();
        let total_files = MODEL_FILES.len();

        for (i, (remote_path, local_name, description)) in MODEL_FILES.iter().enumerate() {
            let local_path = self.model_dir.join(local_name);

            if local_path.exists() && !force {
                info!("[{}/{}] {} already exists, skipping", i + 1, total_files, local_name);
                continue;
            }

            info!("[{}/{}] Downloading {} ({})", i + 1, total_files, local_name, description);
            self.download_file(&client, &self.url_for(remote_path), &local_path)
                .await
                .with_context(|| format!("Failed to download {}", local_name))?;
        }

        info!("Download complete! Model saved to {:?}", self.model_dir);
        Ok(())
    }

    /// Download a single file with progress reporting
    async fn download_file(&self, client: &reqwest::Client, url: &str, local_path: &Path) -> Result<()> {
        debug!("Downloading from {}", url);

        let response = client
            .get(url)
            .send()
            .await
            .context("Failed to start download")?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("Download failed with status: {}", response.status()));
        }

        let total_size = response.content_length().unwrap_or(0);

        let pb = ProgressBar::new(total_size);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec})")
                .context("Invalid progress bar template")?
                .progress_chars("#>-"),
        );

        // Download to a temporary file first
        let temp_path = local_path.with_extension("tmp");
        let mut file = File::create(&temp_path)
            .await
            .context("Failed to create temp file")?;

        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.context("Error reading download stream")?;
            file.write_all(&chunk).await.context("Error writing to file")?;

            downloaded += chunk.len() as u64;
            pb.set_position(downloaded);
        }

        file.flush().await.context("Failed to flush file")?;
        drop(file);

        tokio::fs::rename(&temp_path, local_path)
            .await
            .context("Failed to rename temp file")?;

        pb.finish_with_message("done");
        info!(
            "Downloaded {} ({})",
            local_path.file_name().unwrap_or_default().to_string_lossy(),
            format_bytes(downloaded)
        );

        Ok(())
    }
}

/// Format bytes as human-readable string
fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
