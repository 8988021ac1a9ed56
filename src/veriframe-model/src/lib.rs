//! veriframe-model - Model-backed scoring for Veriframe
//!
//! Runs an image classifier exported to ONNX through ONNX Runtime and
//! reports the probability of the "fake" class for each image.

mod download;
mod engine;
mod labels;

pub use download::{ModelDownloader, DEFAULT_MODEL_URL};
pub use engine::{OnnxConfig, OnnxExpert, MODEL_FILE};
pub use labels::{LabelMap, PreprocessConfig};

use std::path::{Path, PathBuf};
use tracing::info;

/// File name of the ONNX Runtime shared library for this platform
#[cfg(target_os = "windows")]
pub const ORT_LIBRARY_NAME: &str = "onnxruntime.dll";
#[cfg(target_os = "macos")]
pub const ORT_LIBRARY_NAME: &str = "libonnxruntime.dylib";
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
pub const ORT_LIBRARY_NAME: &str = "libonnxruntime.so";

/// Get the default model directory
pub fn default_model_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Veriframe")
        .join("models")
}

/// Point ONNX Runtime at a runtime library shipped next to the model
///
/// Returns false when the directory holds no runtime library, in which case
/// the system library is loaded.
pub fn configure_onnx_runtime(model_dir: &Path) -> bool {
    let library = model_dir.join(ORT_LIBRARY_NAME);
    if !library.is_file() {
        return false;
    }

    info!("using ONNX Runtime at {:?}", library);
    std::env::set_var("ORT_DYLIB_PATH", &library);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_model_dir() {
        let dir = default_model_dir();
        assert!(dir.ends_with("Veriframe/models"));
    }

    #[test]
    fn test_configure_without_library() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(!configure_onnx_runtime(dir.path()));
    }
}
