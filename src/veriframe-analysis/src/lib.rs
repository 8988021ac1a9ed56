//! Veriframe analysis core
//!
//! Turns per-frame fake-probability scores into time segments of suspected
//! manipulation and a verdict for the whole input. Frame extraction and
//! frame scoring are injected through the [`FrameSource`] and
//! [`ScoringExpert`] traits.

pub mod aggregator;
pub mod config;
pub mod error;
pub mod expert;
pub mod frames;
pub mod model;
pub mod orchestrator;
pub mod synthetic;
pub mod timestamp;

pub use aggregator::{aggregate, TemporalAggregator};
pub use config::{AnalysisConfig, MAX_SAMPLING_RATE};
pub use error::{AnalysisError, FrameError, Result, ScoringError};
pub use expert::{fail_safe, ScoringExpert, NEUTRAL_SCORE};
pub use frames::{FrameRef, FrameSet, FrameSource};
pub use model::{AnalysisResult, FrameScore, InputType, ScoreSequence, Segment};
pub use orchestrator::Orchestrator;
pub use synthetic::SyntheticExpert;
pub use timestamp::format_timestamp;
