//! veriframe-frames - Video frame sampling
//!
//! Samples videos at a fixed rate with the FFmpeg command-line tool and
//! hands the frames to the analysis pipeline as JPEG files.

pub mod ffmpeg;

pub use ffmpeg::{check_ffmpeg, check_ffprobe, probe_duration, FfmpegFrameSource};
