//! Inference layer: image preprocessing, label tables, and top-1 classification.
//!
//! The model itself sits behind [`ScoreModel`]; the ONNX Runtime backend is
//! gated behind the `onnx` feature.

mod classifier;
mod error;
pub mod labels;
pub mod preprocess;

#[cfg(feature = "onnx")]
mod onnx;

pub use classifier::{Classifier, ScoreModel, top_class};
pub use error::ClassifyError;
pub use labels::LabelTable;
pub use preprocess::{ImageTensor, INPUT_SIZE, TensorLayout};

#[cfg(feature = "onnx")]
pub use onnx::OnnxModel;
