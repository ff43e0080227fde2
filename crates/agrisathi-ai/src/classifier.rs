//! Top-1 image classification over a pluggable scoring model.
//!
//! A [`Classifier`] pairs a loaded [`ScoreModel`] with its [`LabelTable`].
//! One call runs exactly one forward pass: preprocess, score, argmax, resolve
//! the label. No batching, caching or retries.

use agrisathi_core::Classification;
use tracing::debug;

use crate::preprocess::{self, ImageTensor, TensorLayout};
use crate::{ClassifyError, LabelTable};

/// A model that maps one preprocessed image to a score per class.
pub trait ScoreModel: Send + Sync {
    /// Input layout the model was exported with.
    fn layout(&self) -> TensorLayout {
        TensorLayout::Nhwc
    }

    /// Declared output width, if the model exposes it.
    fn num_classes(&self) -> Option<usize>;

    /// Run a single forward pass, returning the flattened output vector.
    fn scores(&self, input: &ImageTensor) -> Result<Vec<f32>, ClassifyError>;
}

/// Loaded model plus its label table.
pub struct Classifier {
    model: Box<dyn ScoreModel>,
    labels: LabelTable,
}

impl Classifier {
    pub fn new(model: Box<dyn ScoreModel>, labels: LabelTable) -> Self {
        Self { model, labels }
    }

    /// Load an ONNX model and the label sidecar next to it.
    #[cfg(feature = "onnx")]
    pub fn load_onnx(model_path: &std::path::Path) -> Result<Self, ClassifyError> {
        let model = crate::OnnxModel::load(model_path)?;
        let labels = LabelTable::load_for_model(model_path, model.num_classes())?;
        Ok(Self::new(Box::new(model), labels))
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    /// Classify raw image bytes (JPEG, PNG, ...).
    pub fn classify_bytes(&self, bytes: &[u8]) -> Result<Classification, ClassifyError> {
        let input = preprocess::prepare(bytes, self.model.layout())?;
        self.classify_tensor(&input)
    }

    /// Classify an already-prepared tensor.
    pub fn classify_tensor(&self, input: &ImageTensor) -> Result<Classification, ClassifyError> {
        let scores = self.model.scores(input)?;
        if scores.is_empty() {
            return Err(ClassifyError::EmptyOutput);
        }
        let (index, confidence) = top_class(&scores).ok_or(ClassifyError::NoFiniteScore)?;
        let label = self.labels.resolve(index);
        debug!(index, confidence, label = %label, "classified image");
        Ok(Classification { label, confidence })
    }
}

/// Index and value of the maximum score; the first wins on ties. `None` for an empty vector.
///
/// NaN scores never win.
pub fn top_class(scores: &[f32]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &s) in scores.iter().enumerate() {
        if s.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if s <= b => {}
            _ => best = Some((i, s)),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    /// Returns a fixed score vector and checks the tensor it is handed.
    struct FixedScores(Vec<f32>);

    impl ScoreModel for FixedScores {
        fn num_classes(&self) -> Option<usize> {
            Some(self.0.len())
        }

        fn scores(&self, input: &ImageTensor) -> Result<Vec<f32>, ClassifyError> {
            if input.shape != [1, 224, 224, 3] {
                return Err(ClassifyError::Shape {
                    expected: vec![1, 224, 224, 3],
                    actual: input.shape.to_vec(),
                });
            }
            Ok(self.0.clone())
        }
    }

    fn leaf_png() -> Vec<u8> {
        let img = RgbImage::from_fn(300, 200, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 90]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    fn labels(names: &[&str]) -> LabelTable {
        LabelTable::new(names.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn confidence_is_max_of_output() {
        let scores = vec![0.05, 0.7, 0.15, 0.1];
        let classifier = Classifier::new(
            Box::new(FixedScores(scores.clone())),
            labels(&["healthy", "early_blight", "late_blight", "leaf_mold"]),
        );
        let result = classifier.classify_bytes(&leaf_png()).unwrap();
        assert_eq!(result.label, "early_blight");
        let max = scores.iter().cloned().fold(f32::MIN, f32::max);
        assert_eq!(result.confidence, max);
        assert!((0.0..=1.0).contains(&result.confidence));
    }

    #[test]
    fn index_beyond_labels_gets_placeholder() {
        let classifier = Classifier::new(
            Box::new(FixedScores(vec![0.1, 0.1, 0.1, 0.6, 0.1])),
            labels(&["healthy", "scab"]),
        );
        let result = classifier.classify_bytes(&leaf_png()).unwrap();
        assert_eq!(result.label, "label_3");
        assert_eq!(result.confidence, 0.6);
    }

    #[test]
    fn empty_output_is_an_error() {
        let classifier = Classifier::new(Box::new(FixedScores(vec![])), LabelTable::default());
        let err = classifier.classify_bytes(&leaf_png()).unwrap_err();
        assert!(matches!(err, ClassifyError::EmptyOutput));
    }

    #[test]
    fn all_nan_output_has_no_finite_score() {
        let classifier = Classifier::new(
            Box::new(FixedScores(vec![f32::NAN, f32::NAN])),
            labels(&["a", "b"]),
        );
        let err = classifier.classify_bytes(&leaf_png()).unwrap_err();
        assert!(matches!(err, ClassifyError::NoFiniteScore));
        assert!(!err.to_string().contains("empty"));
    }

    #[cfg(feature = "onnx")]
    #[test]
    fn load_onnx_reports_missing_model() {
        let err = Classifier::load_onnx(std::path::Path::new("/nonexistent/leaf.onnx"))
            .err()
            .unwrap();
        assert!(matches!(err, ClassifyError::ModelNotFound(_)));
    }

    #[test]
    fn undecodable_bytes_are_an_error() {
        let classifier = Classifier::new(Box::new(FixedScores(vec![1.0])), labels(&["only"]));
        let err = classifier.classify_bytes(&[0x89, b'P', b'N', b'G', 0, 1, 2]).unwrap_err();
        assert!(matches!(err, ClassifyError::Decode(_)));
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn top_class_first_max_wins() {
        assert_eq!(top_class(&[0.2, 0.4, 0.4]), Some((1, 0.4)));
        assert_eq!(top_class(&[]), None);
    }

    #[test]
    fn top_class_skips_nan() {
        assert_eq!(top_class(&[f32::NAN, 0.3, 0.1]), Some((1, 0.3)));
        assert_eq!(top_class(&[f32::NAN]), None);
    }
}
