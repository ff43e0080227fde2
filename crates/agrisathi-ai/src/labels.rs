//! Class label table, index-aligned with the model's output vector.
//!
//! Labels live in a sidecar JSON file next to the model artifact: same base
//! name, `.json` extension, containing an array of strings. Without a sidecar
//! the table is synthesised as `class_0`, `class_1`, ... for every output
//! position the model declares.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::ClassifyError;

/// Ordered class names for a classifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelTable {
    names: Vec<String>,
}

impl LabelTable {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Positional placeholder names `class_0 .. class_{n-1}`.
    pub fn placeholders(n: usize) -> Self {
        Self {
            names: (0..n).map(|i| format!("class_{i}")).collect(),
        }
    }

    /// Sidecar path for a model artifact: `plant.onnx` → `plant.json`.
    pub fn sidecar_path(model_path: &Path) -> PathBuf {
        model_path.with_extension("json")
    }

    /// Load the sidecar for `model_path`, or synthesise placeholders when it is absent.
    ///
    /// `num_classes` is the model's declared output width, if known. A sidecar
    /// that exists but cannot be read or parsed is an error.
    pub fn load_for_model(
        model_path: &Path,
        num_classes: Option<usize>,
    ) -> Result<Self, ClassifyError> {
        let path = Self::sidecar_path(model_path);
        if !path.exists() {
            let n = num_classes.unwrap_or(0);
            info!(
                sidecar = %path.display(),
                classes = n,
                "no label sidecar, using placeholder labels"
            );
            return Ok(Self::placeholders(n));
        }

        let text = std::fs::read_to_string(&path).map_err(|source| ClassifyError::LabelRead {
            path: path.clone(),
            source,
        })?;
        let names: Vec<String> =
            serde_json::from_str(&text).map_err(|source| ClassifyError::LabelParse {
                path: path.clone(),
                source,
            })?;

        if let Some(n) = num_classes
            && n != names.len()
        {
            warn!(
                labels = names.len(),
                outputs = n,
                "label count does not match model output width"
            );
        }
        info!(sidecar = %path.display(), labels = names.len(), "loaded class labels");
        Ok(Self { names })
    }

    /// Label for an output index; `label_<index>` when out of range.
    pub fn resolve(&self, index: usize) -> String {
        self.names
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("label_{index}"))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}
