//! Upload analysis handlers

use crate::{ApiError, AppState};
use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use std::io::Write;
use std::path::Path;
use tracing::info;
use veriframe_analysis::AnalysisResult;

/// Extensions routed to the image pipeline on /api/analyze
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "webp", "gif", "tif", "tiff"];

/// Which pipeline an upload goes through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Image,
}

/// One uploaded file
#[derive(Debug)]
pub struct Upload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl Upload {
    /// Images by content type or extension, everything else is a video
    pub fn kind(&self) -> MediaKind {
        let image_type = self
            .content_type
            .as_deref()
            .map(|ct| ct.starts_with("image/"))
            .unwrap_or(false);

        if image_type || self.extension().map(is_image_extension).unwrap_or(false) {
            MediaKind::Image
        } else {
            MediaKind::Video
        }
    }

    fn extension(&self) -> Option<String> {
        let name = self.file_name.as_deref()?;
        let ext = Path::new(name).extension()?.to_str()?;
        // Short alphanumeric extensions only
        if ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            Some(ext.to_ascii_lowercase())
        } else {
            None
        }
    }

    /// Suffix for the scratch file holding the upload
    fn suffix(&self) -> String {
        self.extension().map(|ext| format!(".{}", ext)).unwrap_or_default()
    }
}

fn is_image_extension(ext: String) -> bool {
    IMAGE_EXTENSIONS.contains(&ext.as_str())
}

/// Take the first file field of a multipart body
pub async fn read_upload(mut multipart: Multipart) -> Result<Upload, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.file_name().is_none() && field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await?;

        if data.is_empty() {
            return Err(ApiError::BadRequest("uploaded file is empty".to_string()));
        }

        return Ok(Upload {
            file_name,
            content_type,
            data,
        });
    }

    Err(ApiError::BadRequest("no file in upload".to_string()))
}

/// POST /api/analyze - video or image, detected from the upload
pub async fn analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisResult>, ApiError> {
    let upload = read_upload(multipart).await?;
    let kind = upload.kind();
    run_analysis(state, upload, kind).await
}

/// POST /api/analyze/image
pub async fn analyze_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisResult>, ApiError> {
    let upload = read_upload(multipart).await?;
    run_analysis(state, upload, MediaKind::Image).await
}

/// Spool the upload to a scratch file and run the blocking pipeline on it
async fn run_analysis(
    state: AppState,
    upload: Upload,
    kind: MediaKind,
) -> Result<Json<AnalysisResult>, ApiError> {
    info!(
        "analyzing {:?} upload {:?} ({} bytes)",
        kind,
        upload.file_name.as_deref().unwrap_or("<unnamed>"),
        upload.data.len()
    );

    let orchestrator = state.orchestrator.clone();

    // Use spawn_blocking: frame extraction and inference are synchronous
    let result = tokio::task::spawn_blocking(move || -> Result<AnalysisResult, ApiError> {
        let mut file = tempfile::Builder::new()
            .prefix("veriframe-upload-")
            .suffix(&upload.suffix())
            .tempfile()?;
        file.write_all(&upload.data)?;
        file.flush()?;

        match kind {
            MediaKind::Image => Ok(orchestrator.process_image(file.path())),
            MediaKind::Video => Ok(orchestrator.process_video(file.path())?),
        }
    })
    .await
    .map_err(|e| ApiError::Internal(anyhow::anyhow!("task join error: {}", e)))??;

    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: Option<&str>, content_type: Option<&str>) -> Upload {
        Upload {
            file_name: name.map(str::to_string),
            content_type: content_type.map(str::to_string),
            data: Bytes::from_static(b"data"),
        }
    }

    #[test]
    fn test_kind_from_content_type() {
        assert_eq!(upload(Some("blob"), Some("image/png")).kind(), MediaKind::Image);
        assert_eq!(upload(Some("blob"), Some("video/mp4")).kind(), MediaKind::Video);
    }

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(upload(Some("face.JPG"), None).kind(), MediaKind::Image);
        assert_eq!(upload(Some("clip.mov"), Some("application/octet-stream")).kind(), MediaKind::Video);
        assert_eq!(upload(None, None).kind(), MediaKind::Video);
    }

    #[test]
    fn test_suffix_is_sanitized() {
        assert_eq!(upload(Some("clip.MP4"), None).suffix(), ".mp4");
        assert_eq!(upload(Some("clip"), None).suffix(), "");
        assert_eq!(upload(Some("x.m$4"), None).suffix(), "");
        assert_eq!(upload(Some("x.averyverylongext"), None).suffix(), "");
    }
}
