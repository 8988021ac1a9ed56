//! Deterministic synthetic expert
//!
//! Simulates a manipulated stretch in the middle of every video: frames
//! strictly between 40% and 60% of the sequence score high, all others low.
//! Scores come from a seeded generator, so the same input and seed always
//! produce the same output. Nothing is read from disk.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::Range;
use std::path::Path;

use crate::expert::ScoringExpert;
use crate::frames::FrameRef;

/// Fraction of the video where the simulated manipulation lives (exclusive)
const MANIPULATED_WINDOW: (f64, f64) = (0.4, 0.6);

const FAKE_SCORES: Range<f64> = 0.80..0.99;
const REAL_SCORES: Range<f64> = 0.0..0.2;

/// Stub expert for tests and demos
#[derive(Debug, Clone, Copy)]
pub struct SyntheticExpert {
    seed: u64,
}

impl SyntheticExpert {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Whether frame `index` of `total` falls in the simulated window
    pub fn is_manipulated(index: usize, total: usize) -> bool {
        let position = index as f64;
        let total = total as f64;
        MANIPULATED_WINDOW.0 * total < position && position < MANIPULATED_WINDOW.1 * total
    }
}

impl Default for SyntheticExpert {
    fn default() -> Self {
        Self::new(42)
    }
}

impl ScoringExpert for SyntheticExpert {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn predict_one(&self, image: &Path) -> f64 {
        let mut rng = StdRng::seed_from_u64(self.seed ^ path_seed(image));
        rng.gen_range(0.0..1.0)
    }

    fn predict_many(&self, frames: &[FrameRef]) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let total = frames.len();

        frames
            .iter()
            .map(|frame| {
                if Self::is_manipulated(frame.index, total) {
                    rng.gen_range(FAKE_SCORES)
                } else {
                    rng.gen_range(REAL_SCORES)
                }
            })
            .collect()
    }
}

/// FNV-1a over the path bytes, stable across toolchains and platforms
fn path_seed(path: &Path) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    path.to_string_lossy()
        .bytes()
        .fold(OFFSET, |hash, byte| (hash ^ byte as u64).wrapping_mul(PRIME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn frames(n: usize) -> Vec<FrameRef> {
        (0..n)
            .map(|index| FrameRef { index, path: PathBuf::from(format!("frame_{:06}.jpg", index + 1)) })
            .collect()
    }

    #[test]
    fn test_window_bounds_are_exclusive() {
        // 10 frames: window is 4 < i < 6
        let flagged: Vec<usize> = (0..10).filter(|&i| SyntheticExpert::is_manipulated(i, 10)).collect();
        assert_eq!(flagged, vec![5]);
    }

    #[test]
    fn test_scores_follow_window() {
        let scores = SyntheticExpert::default().predict_many(&frames(50));
        assert_eq!(scores.len(), 50);

        for (i, score) in scores.iter().enumerate() {
            if SyntheticExpert::is_manipulated(i, 50) {
                assert!((0.80..0.99).contains(score), "frame {} scored {}", i, score);
            } else {
                assert!((0.0..0.2).contains(score), "frame {} scored {}", i, score);
            }
        }
    }

    #[test]
    fn test_deterministic_for_seed() {
        let a = SyntheticExpert::new(7).predict_many(&frames(20));
        let b = SyntheticExpert::new(7).predict_many(&frames(20));
        assert_eq!(a, b);

        let path = Path::new("still.png");
        assert_eq!(SyntheticExpert::new(7).predict_one(path), SyntheticExpert::new(7).predict_one(path));
    }

    #[test]
    fn test_path_seed_is_fixed() {
        assert_eq!(path_seed(Path::new("")), 0xcbf2_9ce4_8422_2325);
        assert_eq!(path_seed(Path::new("a")), 0xaf63_dc4c_8601_ec8c);
        assert_ne!(path_seed(Path::new("a.jpg")), path_seed(Path::new("b.jpg")));
    }

    #[test]
    fn test_image_score_in_range() {
        let score = SyntheticExpert::default().predict_one(Path::new("portrait.jpg"));
        assert!((0.0..1.0).contains(&score));
    }

    #[test]
    fn test_empty_input() {
        assert!(SyntheticExpert::default().predict_many(&[]).is_empty());
    }
}
