//! Analysis error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that fail a whole analysis request
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The video could not be decoded into frames
    #[error("frame extraction failed: {0}")]
    FrameExtraction(#[from] FrameError),

    /// The expert returned a different number of scores than frames given
    #[error("expert returned {scores} scores for {frames} frames")]
    LengthMismatch { frames: usize, scores: usize },

    /// Sampling rate or thresholds out of range
    #[error("invalid analysis config: {0}")]
    InvalidConfig(String),
}

/// Errors raised by a frame source
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("video not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to spawn ffmpeg: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("ffmpeg exited with status {status:?}: {stderr}")]
    Failed { status: Option<i32>, stderr: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while scoring a single image
///
/// These never fail a request: experts convert them to the neutral score.
/// Only model loading surfaces them to the caller.
#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    #[error("failed to decode image {path}: {message}")]
    ImageDecode { path: PathBuf, message: String },

    #[error("inference error: {0}")]
    Inference(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
