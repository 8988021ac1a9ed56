//! Frame source capability

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::error::FrameError;

/// Handle to one sampled still image
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FrameRef {
    /// 0-based position in sampling order
    pub index: usize,
    /// Image file holding the frame
    pub path: PathBuf,
}

impl FrameRef {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Ordered frames of one video
///
/// When the frames were written to a scratch directory, the set owns it and
/// the directory is removed when the set is dropped.
#[derive(Debug, Default)]
pub struct FrameSet {
    frames: Vec<FrameRef>,
    workdir: Option<TempDir>,
}

impl FrameSet {
    /// Frames from image paths already in sampling order
    pub fn from_paths(paths: Vec<PathBuf>) -> Self {
        let frames = paths
            .into_iter()
            .enumerate()
            .map(|(index, path)| FrameRef { index, path })
            .collect();
        Self { frames, workdir: None }
    }

    /// Frames that live inside `workdir`, which is deleted with the set
    pub fn in_workdir(paths: Vec<PathBuf>, workdir: TempDir) -> Self {
        Self {
            workdir: Some(workdir),
            ..Self::from_paths(paths)
        }
    }

    pub fn frames(&self) -> &[FrameRef] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn workdir(&self) -> Option<&Path> {
        self.workdir.as_ref().map(|dir| dir.path())
    }
}

/// Samples a video into ordered frames
///
/// Implementations must preserve temporal order and return frames readable
/// by the configured scoring expert. A readable video with no decodable
/// frames yields an empty set rather than an error.
pub trait FrameSource: Send + Sync {
    fn extract(&self, video: &Path, sampling_rate: f64) -> Result<FrameSet, FrameError>;
}
