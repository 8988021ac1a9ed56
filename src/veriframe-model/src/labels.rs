//! Classifier metadata: class labels and image preprocessing

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

use veriframe_analysis::ScoringError;

/// Which output class means "fake" and which means "real"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelMap {
    pub fake_idx: usize,
    pub real_idx: usize,
}

impl Default for LabelMap {
    fn default() -> Self {
        Self { fake_idx: 1, real_idx: 0 }
    }
}

#[derive(Debug, Deserialize)]
struct ModelConfigFile {
    #[serde(default)]
    id2label: HashMap<String, String>,
}

impl LabelMap {
    /// Detect class indices from a label table
    ///
    /// Labels mentioning "fake" or "manipulated" mark the fake class, labels
    /// mentioning "real" or "original" the real class. Unmatched roles keep
    /// the defaults (real = 0, fake = 1).
    pub fn from_labels(id2label: &HashMap<String, String>) -> Self {
        let mut map = Self::default();

        for (idx, label) in id2label {
            let Ok(idx) = idx.parse::<usize>() else {
                warn!("ignoring non-numeric label id {:?}", idx);
                continue;
            };
            let label = label.to_lowercase();
            if label.contains("fake") || label.contains("manipulated") {
                map.fake_idx = idx;
            } else if label.contains("real") || label.contains("original") {
                map.real_idx = idx;
            }
        }

        map
    }

    /// Read `id2label` from a model `config.json`, falling back to defaults
    /// when the file is absent
    pub fn load(path: &Path) -> Result<Self, ScoringError> {
        if !path.exists() {
            debug!("no label config at {:?}, using default label mapping", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: ModelConfigFile = serde_json::from_str(&content)
            .map_err(|e| ScoringError::ModelLoad(format!("invalid {}: {}", path.display(), e)))?;

        info!("model labels: {:?}", config.id2label);
        let map = Self::from_labels(&config.id2label);
        info!("label mapping: real={}, fake={}", map.real_idx, map.fake_idx);
        Ok(map)
    }
}

/// Image size and normalization expected by the model
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessConfig {
    pub size: u32,
    pub mean: [f32; 3],
    pub std: [f32; 3],
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            size: 224,
            mean: [0.5; 3],
            std: [0.5; 3],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SizeField {
    Square(u32),
    Dims { height: u32, width: u32 },
    Shortest { shortest_edge: u32 },
}

#[derive(Debug, Deserialize)]
struct PreprocessorFile {
    size: Option<SizeField>,
    image_mean: Option<[f32; 3]>,
    image_std: Option<[f32; 3]>,
}

impl PreprocessConfig {
    /// Read a `preprocessor_config.json`, falling back to defaults when the
    /// file is absent
    pub fn load(path: &Path) -> Result<Self, ScoringError> {
        if !path.exists() {
            debug!("no preprocessor config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
            .map_err(|e| ScoringError::ModelLoad(format!("invalid {}: {}", path.display(), e)))
    }

    fn from_json(content: &str) -> serde_json::Result<Self> {
        let file: PreprocessorFile = serde_json::from_str(content)?;
        let defaults = Self::default();

        let size = match file.size {
            Some(SizeField::Square(size)) => size,
            // Non-square inputs are squared off to the larger side
            Some(SizeField::Dims { height, width }) => height.max(width),
            Some(SizeField::Shortest { shortest_edge }) => shortest_edge,
            None => defaults.size,
        };

        Ok(Self {
            size,
            mean: file.image_mean.unwrap_or(defaults.mean),
            std: file.image_std.unwrap_or(defaults.std),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_detects_swapped_labels() {
        let map = LabelMap::from_labels(&labels(&[("0", "Fake"), ("1", "Real")]));
        assert_eq!(map, LabelMap { fake_idx: 0, real_idx: 1 });
    }

    #[test]
    fn test_detects_descriptive_labels() {
        let map = LabelMap::from_labels(&labels(&[("0", "Realism"), ("1", "Deepfake")]));
        assert_eq!(map, LabelMap { fake_idx: 1, real_idx: 0 });

        let map = LabelMap::from_labels(&labels(&[("0", "manipulated"), ("1", "original")]));
        assert_eq!(map, LabelMap { fake_idx: 0, real_idx: 1 });
    }

    #[test]
    fn test_unknown_labels_keep_defaults() {
        let map = LabelMap::from_labels(&labels(&[("0", "LABEL_0"), ("x", "fake")]));
        assert_eq!(map, LabelMap::default());
    }

    #[test]
    fn test_missing_files_use_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        assert_eq!(LabelMap::load(&dir.path().join("config.json")).unwrap(), LabelMap::default());
        assert_eq!(
            PreprocessConfig::load(&dir.path().join("preprocessor_config.json")).unwrap(),
            PreprocessConfig::default()
        );
    }

    #[test]
    fn test_label_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"id2label": {"0": "Deepfake", "1": "Real"}, "model_type": "vit"}"#).unwrap();

        let map = LabelMap::load(&path).unwrap();
        assert_eq!(map, LabelMap { fake_idx: 0, real_idx: 1 });
    }

    #[test]
    fn test_invalid_label_config_is_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(LabelMap::load(&path), Err(ScoringError::ModelLoad(_))));
    }

    #[test]
    fn test_preprocessor_size_forms() {
        let config = PreprocessConfig::from_json(r#"{"size": {"height": 384, "width": 384}}"#).unwrap();
        assert_eq!(config.size, 384);

        let config = PreprocessConfig::from_json(r#"{"size": 256, "image_mean": [0.485, 0.456, 0.406]}"#).unwrap();
        assert_eq!(config.size, 256);
        assert_eq!(config.mean, [0.485, 0.456, 0.406]);
        assert_eq!(config.std, [0.5; 3]);

        let config = PreprocessConfig::from_json(r#"{"size": {"shortest_edge": 160}}"#).unwrap();
        assert_eq!(config.size, 160);

        let config = PreprocessConfig::from_json("{}").unwrap();
        assert_eq!(config, PreprocessConfig::default());
    }
}
