use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("could not decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("model file not found: {0}")]
    ModelNotFound(PathBuf),

    #[error("failed to read label file {path}: {source}")]
    LabelRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed label file {path}: {source}")]
    LabelParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("unexpected input shape: model expects {expected:?}, got {actual:?}")]
    Shape {
        expected: Vec<i64>,
        actual: Vec<i64>,
    },

    #[error("model produced an empty output")]
    EmptyOutput,

    #[error("model output has no finite score")]
    NoFiniteScore,

    #[error("failed to load model: {0}")]
    ModelLoad(String),

    #[error("inference failed: {0}")]
    Inference(String),
}
