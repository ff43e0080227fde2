//! Image classification result shared by the inference service and the CLI.

use serde::{Deserialize, Serialize};

/// Top-1 prediction for a single uploaded image.
///
/// Serialised as `{"label": ..., "confidence": ...}` on the `/predict` wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: String,
    /// Maximum value of the model's output vector, in `[0, 1]` for softmax models.
    pub confidence: f32,
}
