//! ONNX Runtime backend for image classifiers.
//!
//! Loads a single-input, single-output classifier (e.g. a plant disease CNN
//! exported from Keras or PyTorch). Input layout and output width are read
//! from the model's declared tensor shapes.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Tensor;
use tracing::info;

use crate::preprocess::{ImageTensor, TensorLayout};
use crate::{ClassifyError, ScoreModel};

/// Image classifier backed by an ONNX Runtime session.
///
/// Running a session needs exclusive access, so the session sits behind a
/// mutex; concurrent requests take turns.
pub struct OnnxModel {
    session: Mutex<Session>,
    input_shape: Vec<i64>,
    layout: TensorLayout,
    num_classes: Option<usize>,
}

impl OnnxModel {
    /// Load a classifier from a `.onnx` file.
    pub fn load(model_path: &Path) -> Result<Self, ClassifyError> {
        if !model_path.exists() {
            return Err(ClassifyError::ModelNotFound(model_path.to_path_buf()));
        }

        let session = Session::builder()
            .map_err(|e| load_error(model_path, e))?
            .commit_from_file(model_path)
            .map_err(|e| load_error(model_path, e))?;

        let input_shape = session
            .inputs()
            .first()
            .and_then(|i| tensor_shape(i.dtype()))
            .unwrap_or_default();
        let layout = TensorLayout::from_shape(&input_shape);

        // Last output dimension is the class count.
        let num_classes = session
            .outputs()
            .first()
            .and_then(|o| tensor_shape(o.dtype()))
            .and_then(|shape| shape.last().copied())
            .and_then(|d| if d > 0 { Some(d as usize) } else { None });

        info!(
            model = %model_path.display(),
            input = ?input_shape,
            ?layout,
            classes = ?num_classes,
            "loaded classification model"
        );
        Ok(Self {
            session: Mutex::new(session),
            input_shape,
            layout,
            num_classes,
        })
    }

    /// Reject tensors whose fixed dimensions disagree with the declared input.
    fn check_shape(&self, input: &ImageTensor) -> Result<(), ClassifyError> {
        if self.input_shape.is_empty() {
            return Ok(());
        }
        let matches = self.input_shape.len() == input.shape.len()
            && self
                .input_shape
                .iter()
                .zip(input.shape.iter())
                .all(|(&declared, &actual)| declared <= 0 || declared == actual);
        if matches {
            Ok(())
        } else {
            Err(ClassifyError::Shape {
                expected: self.input_shape.clone(),
                actual: input.shape.to_vec(),
            })
        }
    }
}

impl ScoreModel for OnnxModel {
    fn layout(&self) -> TensorLayout {
        self.layout
    }

    fn num_classes(&self) -> Option<usize> {
        self.num_classes
    }

    fn scores(&self, input: &ImageTensor) -> Result<Vec<f32>, ClassifyError> {
        self.check_shape(input)?;

        let tensor = Tensor::from_array((input.shape, input.data.clone().into_boxed_slice()))
            .map_err(|e| ClassifyError::Inference(format!("build input tensor: {e}")))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| ClassifyError::Inference("session lock poisoned".into()))?;
        let outputs = session
            .run(ort::inputs![tensor])
            .map_err(|e| ClassifyError::Inference(e.to_string()))?;

        let (_, scores) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifyError::Inference(format!("extract output: {e}")))?;
        Ok(scores.to_vec())
    }
}

fn load_error(path: &Path, e: impl std::fmt::Display) -> ClassifyError {
    ClassifyError::ModelLoad(format!("{}: {e}", path.display()))
}

/// Declared shape of a tensor-typed model input or output.
fn tensor_shape(value_type: &ort::value::ValueType) -> Option<Vec<i64>> {
    match value_type {
        ort::value::ValueType::Tensor { shape, .. } => Some(shape.iter().copied().collect()),
        _ => None,
    }
}
