//! ONNX Runtime image classifier
//!
//! Images are resized to the model's square input, rescaled to [0, 1],
//! normalized per channel, laid out as NCHW and classified one at a time.
//! The fake-class probability of the softmaxed logits is the score.

use image::imageops::FilterType;
use ort::session::Session;
use ort::value::Tensor;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;
use tracing::{debug, info};

use veriframe_analysis::{fail_safe, ScoringError, ScoringExpert};

use crate::labels::{LabelMap, PreprocessConfig};

/// Model weights file inside the model directory
pub const MODEL_FILE: &str = "model.onnx";
const LABEL_CONFIG_FILE: &str = "config.json";
const PREPROCESSOR_CONFIG_FILE: &str = "preprocessor_config.json";

/// Configuration for the ONNX expert
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnnxConfig {
    /// Directory holding model.onnx and its JSON metadata
    pub model_dir: PathBuf,
    /// Number of threads for CPU inference
    pub num_threads: usize,
}

impl Default for OnnxConfig {
    fn default() -> Self {
        Self {
            model_dir: crate::default_model_dir(),
            num_threads: 4,
        }
    }
}

/// Model-backed scoring expert
///
/// The session is loaded once at construction and guarded by a mutex, so
/// concurrent requests run inference one after another.
pub struct OnnxExpert {
    session: Mutex<Session>,
    labels: LabelMap,
    preprocess: PreprocessConfig,
}

impl OnnxExpert {
    /// Load the model from `config.model_dir`
    pub fn new(config: &OnnxConfig) -> Result<Self, ScoringError> {
        info!("initializing ONNX expert");
        info!("model directory: {:?}", config.model_dir);

        let model_path = config.model_dir.join(MODEL_FILE);
        if !model_path.exists() {
            return Err(ScoringError::ModelLoad(format!(
                "model not found at {} - run 'veriframe download-model' first",
                model_path.display()
            )));
        }

        let labels = LabelMap::load(&config.model_dir.join(LABEL_CONFIG_FILE))?;
        let preprocess = PreprocessConfig::load(&config.model_dir.join(PREPROCESSOR_CONFIG_FILE))?;

        let load_err = |e: &dyn std::fmt::Display| {
            ScoringError::ModelLoad(format!("failed to load {}: {}", model_path.display(), e))
        };
        let session = Session::builder()
            .map_err(|e| load_err(&e))?
            .with_intra_threads(config.num_threads)
            .map_err(|e| load_err(&e))?
            .commit_from_file(&model_path)
            .map_err(|e| load_err(&e))?;

        info!(
            "ONNX expert ready: input {}x{}, fake class {}",
            preprocess.size, preprocess.size, labels.fake_idx
        );

        Ok(Self {
            session: Mutex::new(session),
            labels,
            preprocess,
        })
    }

    /// Score one image, surfacing failures
    pub fn try_predict(&self, image: &Path) -> Result<f64, ScoringError> {
        let start = Instant::now();
        let pixels = preprocess_image(image, &self.preprocess)?;
        let size = self.preprocess.size as usize;

        let input = Tensor::from_array(([1usize, 3, size, size], pixels))
            .map_err(|e| ScoringError::Inference(e.to_string()))?;

        let logits: Vec<f32> = {
            let mut session = self
                .session
                .lock()
                .map_err(|_| ScoringError::Inference("session lock poisoned".to_string()))?;
            let outputs = session
                .run(ort::inputs![input])
                .map_err(|e| ScoringError::Inference(e.to_string()))?;
            let (_, logits) = outputs[0]
                .try_extract_tensor::<f32>()
                .map_err(|e| ScoringError::Inference(e.to_string()))?;
            logits.to_vec()
        };

        let score = fake_probability(&logits, self.labels)?;
        debug!(
            "scored {:?} in {}ms: fake={:.4}",
            image,
            start.elapsed().as_millis(),
            score
        );
        Ok(score)
    }
}

impl ScoringExpert for OnnxExpert {
    fn name(&self) -> &str {
        "onnx"
    }

    fn predict_one(&self, image: &Path) -> f64 {
        fail_safe(image, self.try_predict(image))
    }
}

/// Decode, resize and normalize an image into a CHW float buffer
fn preprocess_image(path: &Path, config: &PreprocessConfig) -> Result<Vec<f32>, ScoringError> {
    let decode_err = |message: String| ScoringError::ImageDecode {
        path: path.to_path_buf(),
        message,
    };

    let img = image::ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| decode_err(e.to_string()))?;

    let size = config.size;
    let rgb = img.resize_exact(size, size, FilterType::Triangle).to_rgb8();

    let plane = (size * size) as usize;
    let mut pixels = vec![0.0f32; 3 * plane];
    for (i, px) in rgb.pixels().enumerate() {
        for c in 0..3 {
            let value = px[c] as f32 / 255.0;
            pixels[c * plane + i] = (value - config.mean[c]) / config.std[c];
        }
    }

    Ok(pixels)
}

/// Softmax the logits and pick the fake class
fn fake_probability(logits: &[f32], labels: LabelMap) -> Result<f64, ScoringError> {
    if labels.fake_idx >= logits.len() {
        return Err(ScoringError::Inference(format!(
            "model produced {} logits, fake class index is {}",
            logits.len(),
            labels.fake_idx
        )));
    }

    let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f64> = logits.iter().map(|&l| ((l - max) as f64).exp()).collect();
    let sum: f64 = exps.iter().sum();

    Ok(exps[labels.fake_idx] / sum)
}
