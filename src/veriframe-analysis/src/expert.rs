//! Scoring capability

use std::path::Path;
use tracing::warn;

use crate::error::ScoringError;
use crate::frames::FrameRef;

/// Score substituted for any item that could not be scored
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Maps images to fake probabilities in [0, 1]
///
/// Implementations never fail and never return NaN: an item that cannot be
/// scored gets [`NEUTRAL_SCORE`]. Experts are shared across concurrent
/// requests, so an implementation wrapping a non-reentrant model must
/// serialize access itself.
pub trait ScoringExpert: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Score a single image
    fn predict_one(&self, image: &Path) -> f64;

    /// Score frames in order, one score per frame
    fn predict_many(&self, frames: &[FrameRef]) -> Vec<f64> {
        frames.iter().map(|frame| self.predict_one(frame.path())).collect()
    }
}

/// Collapse a fallible score into the expert contract
///
/// Errors and non-finite scores become [`NEUTRAL_SCORE`] with a warning.
pub fn fail_safe(image: &Path, result: Result<f64, ScoringError>) -> f64 {
    match result {
        Ok(score) if score.is_finite() => score,
        Ok(score) => {
            warn!("non-finite score {} for {:?}, using neutral score", score, image);
            NEUTRAL_SCORE
        }
        Err(e) => {
            warn!("failed to score {:?}: {}, using neutral score", image, e);
            NEUTRAL_SCORE
        }
    }
}
