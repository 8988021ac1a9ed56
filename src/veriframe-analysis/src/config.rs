//! Analysis parameters

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Tunable parameters of the analysis pipeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Frames sampled per second of video
    #[serde(default = "default_sampling_rate")]
    pub sampling_rate: f64,

    /// A frame belongs to a run when its score is strictly above this
    #[serde(default = "default_threshold")]
    pub segment_threshold: f64,

    /// The input is fake when the overall confidence is strictly above this
    #[serde(default = "default_threshold")]
    pub decision_threshold: f64,
}

/// Highest accepted sampling rate: one frame per rendered millisecond
pub const MAX_SAMPLING_RATE: f64 = 1000.0;

fn default_sampling_rate() -> f64 { 5.0 }
fn default_threshold() -> f64 { 0.5 }

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sampling_rate: default_sampling_rate(),
            segment_threshold: default_threshold(),
            decision_threshold: default_threshold(),
        }
    }
}

impl AnalysisConfig {
    /// Check that the sampling rate is in (0, 1000] and both thresholds are in [0, 1]
    pub fn validate(&self) -> Result<()> {
        validate_sampling_rate(self.sampling_rate)?;
        validate_threshold("segment_threshold", self.segment_threshold)?;
        validate_threshold("decision_threshold", self.decision_threshold)?;
        Ok(())
    }
}

pub(crate) fn validate_sampling_rate(rate: f64) -> Result<()> {
    if rate.is_finite() && rate > 0.0 && rate <= MAX_SAMPLING_RATE {
        Ok(())
    } else {
        Err(AnalysisError::InvalidConfig(format!(
            "sampling_rate must be within (0, {}], got {}",
            MAX_SAMPLING_RATE, rate
        )))
    }
}

pub(crate) fn validate_threshold(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(AnalysisError::InvalidConfig(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = AnalysisConfig::default();
        assert_eq!(config.sampling_rate, 5.0);
        assert_eq!(config.segment_threshold, 0.5);
        assert_eq!(config.decision_threshold, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_sampling_rate() {
        for rate in [0.0, -1.0, 1000.5, 10_000.0, f64::NAN, f64::INFINITY] {
            let config = AnalysisConfig { sampling_rate: rate, ..Default::default() };
            assert!(config.validate().is_err(), "rate {} accepted", rate);
        }
    }

    #[test]
    fn test_accepts_max_sampling_rate() {
        let config = AnalysisConfig { sampling_rate: MAX_SAMPLING_RATE, ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_thresholds() {
        let config = AnalysisConfig { segment_threshold: 1.5, ..Default::default() };
        assert!(config.validate().is_err());

        let config = AnalysisConfig { decision_threshold: f64::NAN, ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: AnalysisConfig = serde_json::from_str(r#"{"sampling_rate": 2.0}"#).unwrap();
        assert_eq!(config.sampling_rate, 2.0);
        assert_eq!(config.segment_threshold, 0.5);
        assert_eq!(config.decision_threshold, 0.5);
    }
}
