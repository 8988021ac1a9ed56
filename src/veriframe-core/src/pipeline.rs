//! Wiring: configuration -> frame source + scoring expert -> orchestrator

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use veriframe_analysis::{Orchestrator, ScoringExpert, SyntheticExpert};
use veriframe_frames::FfmpegFrameSource;
use veriframe_model::{configure_onnx_runtime, OnnxConfig, OnnxExpert};

use crate::config::{Config, ExpertKind, FramesConfig, ScoringConfig};

/// Build the scoring expert selected in the configuration
pub fn build_expert(config: &ScoringConfig) -> Result<Arc<dyn ScoringExpert>> {
    match config.expert {
        ExpertKind::Synthetic => {
            warn!("using the synthetic expert: scores are placeholders, not model output");
            Ok(Arc::new(SyntheticExpert::new(config.seed)))
        }
        ExpertKind::Onnx => {
            let model_dir = config.resolve_model_dir();
            if !configure_onnx_runtime(&model_dir) {
                info!("no bundled ONNX Runtime in {:?}, using the system library", model_dir);
            }

            let expert = OnnxExpert::new(&OnnxConfig {
                model_dir,
                num_threads: config.num_threads,
            })
            .context("Failed to load ONNX expert")?;
            Ok(Arc::new(expert))
        }
    }
}

/// Build the ffmpeg frame source
pub fn build_frame_source(config: &FramesConfig) -> FfmpegFrameSource {
    FfmpegFrameSource::new(&config.ffmpeg_path).with_quality(config.jpeg_quality)
}

/// Build the orchestrator shared by the CLI and the HTTP server
pub fn build_orchestrator(config: &Config) -> Result<Arc<Orchestrator>> {
    let expert = build_expert(&config.scoring)?;
    let frames = Arc::new(build_frame_source(&config.frames));

    let orchestrator = Orchestrator::new(frames, expert, config.analysis)
        .context("Invalid analysis configuration")?;
    Ok(Arc::new(orchestrator))
}
