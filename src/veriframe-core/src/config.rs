//! Configuration management
//!
//! TOML configuration with named profiles. Every field has a default, so an
//! empty file (or no file at all) yields a working setup.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::warn;

use veriframe_analysis::AnalysisConfig;
use veriframe_web::ServerConfig;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub frames: FramesConfig,

    #[serde(default)]
    pub server: ServerConfig,

    /// Named profiles that can override base config
    #[serde(default)]
    pub profiles: HashMap<String, ProfileConfig>,
}

/// Which scoring expert backs the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExpertKind {
    /// Deterministic stub, no model needed
    Synthetic,
    /// ONNX Runtime classifier
    Onnx,
}

/// Scoring expert configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_expert")]
    pub expert: ExpertKind,

    /// Model directory (defaults to Veriframe/models under local app data)
    pub model_dir: Option<String>,

    /// Repository the model is downloaded from
    pub model_url: Option<String>,

    /// Threads for CPU inference
    #[serde(default = "default_num_threads")]
    pub num_threads: usize,

    /// Seed of the synthetic expert
    #[serde(default = "default_seed")]
    pub seed: u64,
}

/// Frame extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FramesConfig {
    /// ffmpeg executable
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    /// JPEG quality scale for sampled frames (2-31, lower = better)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u32,
}

/// Profile for overriding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub analysis: Option<AnalysisConfig>,
    pub scoring: Option<ScoringConfig>,
    pub frames: Option<FramesConfig>,
    pub server: Option<ServerConfig>,
}

// Default value functions
fn default_expert() -> ExpertKind { ExpertKind::Synthetic }
fn default_num_threads() -> usize { 4 }
fn default_seed() -> u64 { 42 }
fn default_ffmpeg_path() -> String { "ffmpeg".to_string() }
fn default_jpeg_quality() -> u32 { 2 }

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            expert: default_expert(),
            model_dir: None,
            model_url: None,
            num_threads: default_num_threads(),
            seed: default_seed(),
        }
    }
}

impl Default for FramesConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

impl ScoringConfig {
    /// Resolve model directory with fallback to default
    pub fn resolve_model_dir(&self) -> PathBuf {
        match self.model_dir {
            Some(ref dir) => PathBuf::from(dir),
            None => veriframe_model::default_model_dir(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file {}", path.as_ref().display()))?;
        toml::from_str(&content).context("Failed to parse config TOML")
    }

    /// Load from `path` when it exists, defaults otherwise, then apply `profile`
    pub fn load(path: Option<&Path>, profile: Option<&str>) -> Result<Self> {
        let config = match path {
            Some(path) if path.exists() => Self::from_file(path)?,
            Some(path) => {
                warn!("config file {:?} not found, using defaults", path);
                Self::default()
            }
            None => Self::default(),
        };

        let config = match profile {
            Some(name) => config.apply_profile(name)?,
            None => config,
        };

        config.analysis.validate()?;
        Ok(config)
    }

    /// Apply a named profile, merging settings
    ///
    /// Profile settings override base configuration values.
    pub fn apply_profile(mut self, profile_name: &str) -> Result<Self> {
        let profile = self
            .profiles
            .get(profile_name)
            .with_context(|| format!("Profile '{}' not found", profile_name))?
            .clone();

        if let Some(analysis) = profile.analysis {
            self.analysis = analysis;
        }
        if let Some(scoring) = profile.scoring {
            self.scoring = scoring;
        }
        if let Some(frames) = profile.frames {
            self.frames = frames;
        }
        if let Some(server) = profile.server {
            self.server = server;
        }

        Ok(self)
    }
}
