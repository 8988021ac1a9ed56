//! Data model shared by the aggregator, orchestrator and transport

use serde::{Deserialize, Serialize};

/// Score of one sampled frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameScore {
    /// 0-based position in sampling order
    pub index: usize,
    /// Fake probability, expected in [0, 1]
    pub score: f64,
}

impl FrameScore {
    /// Elapsed time of this frame in seconds
    pub fn offset_secs(&self, sampling_rate: f64) -> f64 {
        self.index as f64 / sampling_rate
    }
}

/// Ordered frame scores with contiguous indices `0..len`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreSequence {
    frames: Vec<FrameScore>,
}

impl ScoreSequence {
    /// Build a sequence from raw scores in sampling order
    pub fn from_scores(scores: Vec<f64>) -> Self {
        let frames = scores
            .into_iter()
            .enumerate()
            .map(|(index, score)| FrameScore { index, score })
            .collect();
        Self { frames }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FrameScore> {
        self.frames.iter()
    }

    pub fn as_slice(&self) -> &[FrameScore] {
        &self.frames
    }
}

impl From<Vec<f64>> for ScoreSequence {
    fn from(scores: Vec<f64>) -> Self {
        Self::from_scores(scores)
    }
}

impl<'a> IntoIterator for &'a ScoreSequence {
    type Item = &'a FrameScore;
    type IntoIter = std::slice::Iter<'a, FrameScore>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

/// One contiguous run of manipulated frames projected onto time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Inclusive start, `HH:MM:SS.mmm`
    pub start_time: String,
    /// Inclusive end, `HH:MM:SS.mmm`
    pub end_time: String,
    /// Maximum score observed in the run
    pub confidence: f64,
    /// First frame index of the run
    #[serde(skip)]
    pub start_frame: usize,
    /// Last frame index of the run (inclusive)
    #[serde(skip)]
    pub end_frame: usize,
}

/// Kind of media that was analyzed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Video,
    Image,
}

/// Final verdict for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub input_type: InputType,
    #[serde(rename = "video_is_fake")]
    pub is_fake: bool,
    pub overall_confidence: f64,
    #[serde(rename = "manipulated_segments")]
    pub segments: Vec<Segment>,
}

impl AnalysisResult {
    /// Result for a video in which nothing could be sampled
    pub fn empty_video() -> Self {
        Self {
            input_type: InputType::Video,
            is_fake: false,
            overall_confidence: 0.0,
            segments: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_score_sequence_indices_are_contiguous() {
        let seq = ScoreSequence::from_scores(vec![0.2, 0.7, 0.1]);
        let indices: Vec<usize> = seq.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(seq.len(), 3);
    }

    #[test]
    fn test_frame_offset() {
        let frame = FrameScore { index: 3, score: 0.9 };
        assert!((frame.offset_secs(5.0) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_wire_format_is_frozen() {
        let result = AnalysisResult {
            input_type: InputType::Video,
            is_fake: true,
            overall_confidence: 0.95,
            segments: vec![Segment {
                start_time: "00:00:00.400".to_string(),
                end_time: "00:00:00.600".to_string(),
                confidence: 0.95,
                start_frame: 2,
                end_frame: 3,
            }],
        };

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            json!({
                "input_type": "video",
                "video_is_fake": true,
                "overall_confidence": 0.95,
                "manipulated_segments": [
                    {
                        "start_time": "00:00:00.400",
                        "end_time": "00:00:00.600",
                        "confidence": 0.95
                    }
                ]
            })
        );
    }

    #[test]
    fn test_image_input_type_serializes_lowercase() {
        let value = serde_json::to_value(InputType::Image).unwrap();
        assert_eq!(value, json!("image"));
    }

    #[test]
    fn test_result_deserializes_from_wire() {
        let body = r#"{
            "input_type": "image",
            "video_is_fake": false,
            "overall_confidence": 0.5,
            "manipulated_segments": []
        }"#;
        let result: AnalysisResult = serde_json::from_str(body).unwrap();
        assert_eq!(result.input_type, InputType::Image);
        assert!(!result.is_fake);
        assert!(result.segments.is_empty());
    }
}
