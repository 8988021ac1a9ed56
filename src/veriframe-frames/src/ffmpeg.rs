//! Frame extraction using the FFmpeg command-line tool

use anyhow::Result;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info};

use veriframe_analysis::{FrameError, FrameSet, FrameSource};

/// File name pattern handed to ffmpeg for sampled frames
const FRAME_PATTERN: &str = "frame_%06d.jpg";
const FRAME_PREFIX: &str = "frame_";
const FRAME_EXT: &str = "jpg";

/// Frame source that runs `ffmpeg` to sample a video into JPEG files
#[derive(Debug, Clone)]
pub struct FfmpegFrameSource {
    ffmpeg: PathBuf,
    /// JPEG quality scale (2-31, lower = better)
    quality: u32,
}

impl FfmpegFrameSource {
    pub fn new(ffmpeg: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            quality: 2,
        }
    }

    pub fn with_quality(mut self, quality: u32) -> Self {
        self.quality = quality.clamp(2, 31);
        self
    }

    /// Whether the configured executable runs
    pub fn is_available(&self) -> bool {
        tool_available(&self.ffmpeg)
    }
}

impl Default for FfmpegFrameSource {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FrameSource for FfmpegFrameSource {
    fn extract(&self, video: &Path, sampling_rate: f64) -> Result<FrameSet, FrameError> {
        if !video.is_file() {
            return Err(FrameError::NotFound(video.to_path_buf()));
        }

        let workdir = tempfile::Builder::new().prefix("veriframe-frames-").tempdir()?;
        debug!("sampling {:?} at {} fps into {:?}", video, sampling_rate, workdir.path());

        // ffmpeg -v error -i input.mp4 -vf fps=5 -q:v 2 dir/frame_%06d.jpg
        let output = Command::new(&self.ffmpeg)
            .arg("-v")
            .arg("error")
            .arg("-nostdin")
            .arg("-i")
            .arg(video)
            .arg("-vf")
            .arg(fps_filter(sampling_rate))
            .arg("-q:v")
            .arg(self.quality.to_string())
            .arg(workdir.path().join(FRAME_PATTERN))
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(FrameError::Spawn)?;

        if !output.status.success() {
            return Err(FrameError::Failed {
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let frames = collect_frames(workdir.path())?;
        info!("sampled {} frames from {:?}", frames.len(), video);

        Ok(FrameSet::in_workdir(frames, workdir))
    }
}

fn fps_filter(sampling_rate: f64) -> String {
    format!("fps={}", sampling_rate)
}

/// List sampled frames in temporal order
fn collect_frames(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut frames: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            let is_frame = path
                .file_name()
                .and_then(|name| name.to_str())
                .map(|name| name.starts_with(FRAME_PREFIX))
                .unwrap_or(false);
            is_frame && path.extension().map(|ext| ext == FRAME_EXT).unwrap_or(false)
        })
        .collect();

    // Zero-padded sequence numbers sort lexically
    frames.sort();
    Ok(frames)
}

/// Check if ffmpeg is available
pub fn check_ffmpeg() -> bool {
    tool_available("ffmpeg")
}

/// Check if ffprobe is available
pub fn check_ffprobe() -> bool {
    tool_available("ffprobe")
}

fn tool_available(tool: impl AsRef<OsStr>) -> bool {
    Command::new(tool)
        .arg("-version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Read the container duration of a video in seconds using ffprobe
pub fn probe_duration(video: &Path) -> Result<f64> {
    let output = Command::new("ffprobe")
        .arg("-v")
        .arg("error")
        .arg("-show_entries")
        .arg("format=duration")
        .arg("-of")
        .arg("csv=p=0")
        .arg(video)
        .output()
        .map_err(|e| anyhow::anyhow!("failed to run ffprobe: {}", e))?;

    if !output.status.success() {
        return Err(anyhow::anyhow!(
            "ffprobe failed with exit code {:?}",
            output.status.code()
        ));
    }

    parse_duration(&String::from_utf8_lossy(&output.stdout))
}

fn parse_duration(raw: &str) -> Result<f64> {
    let duration: f64 = raw
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid ffprobe duration: {:?}", raw.trim()))?;
    Ok(duration)
}
