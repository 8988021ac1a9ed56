//! Run detection over frame scores
//!
//! A frame is manipulated when its score is strictly greater than the segment
//! threshold. Each maximal run of manipulated frames becomes one [`Segment`]
//! whose confidence is the highest score in the run. Runs are never merged,
//! so a single frame at or below the threshold splits two runs.
//!
//! Scores are compared as plain numbers and never clamped. Scores outside
//! [0, 1] therefore behave exactly as their numeric value dictates, and a NaN
//! score never exceeds the threshold, so it ends any open run.

use tracing::debug;

use crate::config::{validate_sampling_rate, validate_threshold};
use crate::error::Result;
use crate::model::{ScoreSequence, Segment};
use crate::timestamp::format_timestamp;

/// Converts a score sequence into manipulated time segments
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemporalAggregator {
    sampling_rate: f64,
    threshold: f64,
}

/// Open run while scanning
struct Run {
    start: usize,
    end: usize,
    peak: f64,
}

impl TemporalAggregator {
    /// Create an aggregator, rejecting a non-positive sampling rate or a
    /// threshold outside [0, 1]
    pub fn new(sampling_rate: f64, threshold: f64) -> Result<Self> {
        validate_sampling_rate(sampling_rate)?;
        validate_threshold("segment_threshold", threshold)?;
        Ok(Self { sampling_rate, threshold })
    }

    pub fn sampling_rate(&self) -> f64 {
        self.sampling_rate
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Scan scores in index order and emit one segment per run
    pub fn aggregate(&self, scores: &ScoreSequence) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut current: Option<Run> = None;

        for frame in scores {
            if frame.score > self.threshold {
                match current.as_mut() {
                    Some(run) => {
                        run.end = frame.index;
                        if frame.score > run.peak {
                            run.peak = frame.score;
                        }
                    }
                    None => {
                        current = Some(Run {
                            start: frame.index,
                            end: frame.index,
                            peak: frame.score,
                        });
                    }
                }
            } else if let Some(run) = current.take() {
                segments.push(self.close(run));
            }
        }

        if let Some(run) = current.take() {
            segments.push(self.close(run));
        }

        debug!(
            "aggregated {} frames into {} segments (threshold {})",
            scores.len(),
            segments.len(),
            self.threshold
        );

        segments
    }

    fn close(&self, run: Run) -> Segment {
        Segment {
            start_time: format_timestamp(run.start as f64 / self.sampling_rate),
            end_time: format_timestamp(run.end as f64 / self.sampling_rate),
            confidence: run.peak,
            start_frame: run.start,
            end_frame: run.end,
        }
    }
}

/// One-shot aggregation with validation of the parameters
pub fn aggregate(scores: &ScoreSequence, sampling_rate: f64, threshold: f64) -> Result<Vec<Segment>> {
    Ok(TemporalAggregator::new(sampling_rate, threshold)?.aggregate(scores))
}
