//! Analysis pipeline: frames -> scores -> segments -> verdict

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::aggregator::TemporalAggregator;
use crate::config::{validate_threshold, AnalysisConfig};
use crate::error::{AnalysisError, Result};
use crate::expert::ScoringExpert;
use crate::frames::FrameSource;
use crate::model::{AnalysisResult, InputType, ScoreSequence};

/// Drives one analysis request end to end
///
/// Holds no per-request state, so a single orchestrator can serve concurrent
/// requests when its collaborators are shared.
pub struct Orchestrator {
    frames: Arc<dyn FrameSource>,
    expert: Arc<dyn ScoringExpert>,
    aggregator: TemporalAggregator,
    decision_threshold: f64,
}

impl Orchestrator {
    /// Create an orchestrator, validating the configuration up front
    pub fn new(
        frames: Arc<dyn FrameSource>,
        expert: Arc<dyn ScoringExpert>,
        config: AnalysisConfig,
    ) -> Result<Self> {
        validate_threshold("decision_threshold", config.decision_threshold)?;
        let aggregator = TemporalAggregator::new(config.sampling_rate, config.segment_threshold)?;

        info!(
            "orchestrator ready: expert={}, {} fps, segment threshold {}, decision threshold {}",
            expert.name(),
            config.sampling_rate,
            config.segment_threshold,
            config.decision_threshold
        );

        Ok(Self {
            frames,
            expert,
            aggregator,
            decision_threshold: config.decision_threshold,
        })
    }

    pub fn expert_name(&self) -> &str {
        self.expert.name()
    }

    /// Analyze a video file
    ///
    /// Extraction failures and frame/score count disagreements fail the
    /// request. A video with no sampled frames is reported as not fake.
    pub fn process_video(&self, video: &Path) -> Result<AnalysisResult> {
        let start = Instant::now();

        let frames = self.frames.extract(video, self.aggregator.sampling_rate())?;
        info!("extracted {} frames from {:?}", frames.len(), video);

        if frames.is_empty() {
            info!("no frames sampled from {:?}, reporting as authentic", video);
            return Ok(AnalysisResult::empty_video());
        }

        let scores = self.expert.predict_many(frames.frames());
        if scores.len() != frames.len() {
            return Err(AnalysisError::LengthMismatch {
                frames: frames.len(),
                scores: scores.len(),
            });
        }

        let segments = self.aggregator.aggregate(&ScoreSequence::from_scores(scores));
        let overall_confidence = segments
            .iter()
            .map(|seg| seg.confidence)
            .fold(0.0, f64::max);
        let is_fake = overall_confidence > self.decision_threshold;

        info!(
            "video analyzed in {}ms: {} segments, confidence {:.4}, fake={}",
            start.elapsed().as_millis(),
            segments.len(),
            overall_confidence,
            is_fake
        );

        Ok(AnalysisResult {
            input_type: InputType::Video,
            is_fake,
            overall_confidence,
            segments,
        })
    }

    /// Analyze a single image
    pub fn process_image(&self, image: &Path) -> AnalysisResult {
        let overall_confidence = self.expert.predict_one(image);
        let is_fake = overall_confidence > self.decision_threshold;
        debug!("image {:?} scored {:.4}, fake={}", image, overall_confidence, is_fake);

        AnalysisResult {
            input_type: InputType::Image,
            is_fake,
            overall_confidence,
            segments: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FrameError, ScoringError};
    use crate::expert::{fail_safe, NEUTRAL_SCORE};
    use crate::frames::{FrameRef, FrameSet};
    use std::path::PathBuf;

    /// Yields `count` placeholder frames for any video
    struct FixedFrames(usize);

    impl FrameSource for FixedFrames {
        fn extract(&self, _video: &Path, _sampling_rate: f64) -> std::result::Result<FrameSet, FrameError> {
            let paths = (0..self.0).map(|i| PathBuf::from(format!("frame_{:06}.jpg", i + 1))).collect();
            Ok(FrameSet::from_paths(paths))
        }
    }

    struct BrokenVideo;

    impl FrameSource for BrokenVideo {
        fn extract(&self, _video: &Path, _sampling_rate: f64) -> std::result::Result<FrameSet, FrameError> {
            Err(FrameError::Failed {
                status: Some(1),
                stderr: "moov atom not found".to_string(),
            })
        }
    }

    /// Replays scores by frame index
    struct Scripted(Vec<f64>);

    impl ScoringExpert for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        fn predict_one(&self, _image: &Path) -> f64 {
            self.0[0]
        }

        fn predict_many(&self, frames: &[FrameRef]) -> Vec<f64> {
            frames.iter().map(|f| self.0[f.index]).collect()
        }
    }

    /// Drops the last score
    struct Short;

    impl ScoringExpert for Short {
        fn name(&self) -> &str {
            "short"
        }

        fn predict_one(&self, _image: &Path) -> f64 {
            0.0
        }

        fn predict_many(&self, frames: &[FrameRef]) -> Vec<f64> {
            vec![0.9; frames.len().saturating_sub(1)]
        }
    }

    /// Fails on one frame, scores the rest high
    struct FlakyFrame(usize);

    impl ScoringExpert for FlakyFrame {
        fn name(&self) -> &str {
            "flaky"
        }

        fn predict_one(&self, image: &Path) -> f64 {
            let broken = format!("frame_{:06}.jpg", self.0 + 1);
            let result = if image.ends_with(&broken) {
                Err(ScoringError::ImageDecode {
                    path: image.to_path_buf(),
                    message: "truncated jpeg".to_string(),
                })
            } else {
                Ok(0.9)
            };
            fail_safe(image, result)
        }
    }

    fn orchestrator(frames: impl FrameSource + 'static, expert: impl ScoringExpert + 'static) -> Orchestrator {
        Orchestrator::new(Arc::new(frames), Arc::new(expert), AnalysisConfig::default()).unwrap()
    }

    #[test]
    fn test_reference_video_scenario() {
        let scores = vec![0.1, 0.1, 0.9, 0.95, 0.2];
        let orch = orchestrator(FixedFrames(5), Scripted(scores));

        let result = orch.process_video(Path::new("clip.mp4")).unwrap();
        assert_eq!(result.input_type, InputType::Video);
        assert_eq!(result.segments.len(), 1);
        assert_eq!(result.segments[0].start_time, "00:00:00.400");
        assert_eq!(result.segments[0].end_time, "00:00:00.600");
        assert_eq!(result.segments[0].confidence, 0.95);
        assert_eq!(result.overall_confidence, 0.95);
        assert!(result.is_fake);
    }

    #[test]
    fn test_authentic_video() {
        let orch = orchestrator(FixedFrames(10), Scripted(vec![0.1; 10]));

        let result = orch.process_video(Path::new("clip.mp4")).unwrap();
        assert!(result.segments.is_empty());
        assert_eq!(result.overall_confidence, 0.0);
        assert!(!result.is_fake);
    }

    #[test]
    fn test_zero_frames_is_not_fake() {
        let orch = orchestrator(FixedFrames(0), Short);

        let result = orch.process_video(Path::new("empty.mp4")).unwrap();
        assert_eq!(result, AnalysisResult::empty_video());
    }

    #[test]
    fn test_overall_confidence_is_max_over_segments() {
        let scores = vec![0.7, 0.1, 0.99, 0.2, 0.8];
        let orch = orchestrator(FixedFrames(5), Scripted(scores));

        let result = orch.process_video(Path::new("clip.mp4")).unwrap();
        assert_eq!(result.segments.len(), 3);
        assert_eq!(result.overall_confidence, 0.99);
    }

    #[test]
    fn test_length_mismatch_is_an_error() {
        let orch = orchestrator(FixedFrames(4), Short);

        match orch.process_video(Path::new("clip.mp4")) {
            Err(AnalysisError::LengthMismatch { frames, scores }) => {
                assert_eq!(frames, 4);
                assert_eq!(scores, 3);
            }
            other => panic!("expected length mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_extraction_failure_propagates() {
        let orch = orchestrator(BrokenVideo, Scripted(vec![0.9]));

        let err = orch.process_video(Path::new("corrupt.mp4")).unwrap_err();
        assert!(matches!(err, AnalysisError::FrameExtraction(_)));
    }

    #[test]
    fn test_failing_frame_degrades_to_neutral() {
        let orch = orchestrator(FixedFrames(5), FlakyFrame(2));

        let result = orch.process_video(Path::new("clip.mp4")).unwrap();
        // Frame 2 falls back to 0.5, which does not exceed the threshold
        assert_eq!(result.segments.len(), 2);
        assert_eq!(result.segments[0].end_frame, 1);
        assert_eq!(result.segments[1].start_frame, 3);
        assert!(result.is_fake);
        assert_eq!(NEUTRAL_SCORE, 0.5);
    }

    #[test]
    fn test_image_at_decision_threshold_is_not_fake() {
        let orch = orchestrator(FixedFrames(0), Scripted(vec![0.5]));

        let result = orch.process_image(Path::new("face.png"));
        assert_eq!(result.input_type, InputType::Image);
        assert_eq!(result.overall_confidence, 0.5);
        assert!(!result.is_fake);
        assert!(result.segments.is_empty());
    }

    #[test]
    fn test_image_above_decision_threshold_is_fake() {
        let orch = orchestrator(FixedFrames(0), Scripted(vec![0.73]));
        assert!(orch.process_image(Path::new("face.png")).is_fake);
    }

    #[test]
    fn test_thresholds_are_independent() {
        // Segment threshold low, decision threshold high
        let config = AnalysisConfig {
            sampling_rate: 5.0,
            segment_threshold: 0.3,
            decision_threshold: 0.8,
        };
        let orch = Orchestrator::new(
            Arc::new(FixedFrames(3)),
            Arc::new(Scripted(vec![0.1, 0.6, 0.1])),
            config,
        )
        .unwrap();

        let result = orch.process_video(Path::new("clip.mp4")).unwrap();
        assert_eq!(result.segments.len(), 1);
        assert_eq!(result.overall_confidence, 0.6);
        assert!(!result.is_fake);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = AnalysisConfig { sampling_rate: 0.0, ..Default::default() };
        let result = Orchestrator::new(Arc::new(FixedFrames(1)), Arc::new(Short), config);
        assert!(matches!(result, Err(AnalysisError::InvalidConfig(_))));

        let config = AnalysisConfig { decision_threshold: 1.2, ..Default::default() };
        let result = Orchestrator::new(Arc::new(FixedFrames(1)), Arc::new(Short), config);
        assert!(matches!(result, Err(AnalysisError::InvalidConfig(_))));

        let config = AnalysisConfig { segment_threshold: -0.1, ..Default::default() };
        let result = Orchestrator::new(Arc::new(FixedFrames(1)), Arc::new(Short), config);
        assert!(matches!(result, Err(AnalysisError::InvalidConfig(_))));
    }

    #[test]
    fn test_synthetic_expert_end_to_end() {
        let orch = orchestrator(FixedFrames(50), crate::synthetic::SyntheticExpert::default());

        let result = orch.process_video(Path::new("clip.mp4")).unwrap();
        assert_eq!(result.segments.len(), 1);
        assert_eq!(result.segments[0].start_frame, 21);
        assert_eq!(result.segments[0].end_frame, 29);
        assert!(result.is_fake);
    }
}
