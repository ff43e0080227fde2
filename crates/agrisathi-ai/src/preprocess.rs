//! Image decoding and tensor preparation.
//!
//! Decodes arbitrary JPEG/PNG bytes to RGB, resizes exactly to
//! [`INPUT_SIZE`]×[`INPUT_SIZE`], scales pixels to `[0, 1]` and adds a batch
//! dimension of one.

use image::imageops::FilterType;

use crate::ClassifyError;

/// Square input resolution expected by the classifier.
pub const INPUT_SIZE: u32 = 224;

/// Memory layout of the model's image input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TensorLayout {
    /// `[batch, height, width, channels]` (Keras exports).
    #[default]
    Nhwc,
    /// `[batch, channels, height, width]` (PyTorch exports).
    Nchw,
}

impl TensorLayout {
    /// Infer the layout from a declared 4-d input shape; channels-first when dim 1 is 3.
    pub fn from_shape(shape: &[i64]) -> Self {
        match shape {
            [_, 3, _, _] => Self::Nchw,
            _ => Self::Nhwc,
        }
    }
}

/// A single preprocessed image with a leading batch dimension of one.
#[derive(Debug, Clone)]
pub struct ImageTensor {
    pub layout: TensorLayout,
    pub shape: [i64; 4],
    pub data: Vec<f32>,
}

/// Decode and normalise image bytes into a model input tensor.
pub fn prepare(bytes: &[u8], layout: TensorLayout) -> Result<ImageTensor, ClassifyError> {
    let image = image::load_from_memory(bytes)?;
    let rgb = image
        .resize_exact(INPUT_SIZE, INPUT_SIZE, FilterType::CatmullRom)
        .to_rgb8();

    let side = INPUT_SIZE as usize;
    let plane = side * side;
    let mut data = vec![0.0f32; 3 * plane];

    for (i, pixel) in rgb.pixels().enumerate() {
        for c in 0..3 {
            let v = pixel[c] as f32 / 255.0;
            match layout {
                TensorLayout::Nhwc => data[i * 3 + c] = v,
                TensorLayout::Nchw => data[c * plane + i] = v,
            }
        }
    }

    let s = side as i64;
    let shape = match layout {
        TensorLayout::Nhwc => [1, s, s, 3],
        TensorLayout::Nchw => [1, 3, s, s],
    };

    Ok(ImageTensor {
        layout,
        shape,
        data,
    })
}
