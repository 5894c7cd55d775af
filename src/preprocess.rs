use image::{imageops::FilterType, DynamicImage};

use crate::error::PredictError;

/// Height and width the model was trained on.
pub const IMAGE_SIZE: u32 = 128;
pub const CHANNELS: usize = 3;

/// A single image laid out as `(1, height, width, channels)`, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    data: Vec<f32>,
}

impl ImageTensor {
    pub const SHAPE: [u64; 4] = [1, IMAGE_SIZE as u64, IMAGE_SIZE as u64, CHANNELS as u64];

    pub fn shape(&self) -> [u64; 4] {
        Self::SHAPE
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

/// Decodes an uploaded image and turns it into the model's input tensor.
pub fn preprocess_image(image_data: &[u8]) -> Result<ImageTensor, PredictError> {
    let img = image::load_from_memory(image_data).map_err(|err| {
        tracing::warn!("Error processing image: {}", err);
        PredictError::InvalidImage
    })?;

    let img = DynamicImage::ImageRgb8(img.to_rgb8());

    // Bicubic, stretching to the exact size; aspect ratio is not preserved.
    let rgb = img
        .resize_exact(IMAGE_SIZE, IMAGE_SIZE, FilterType::CatmullRom)
        .to_rgb8();

    let data = rgb
        .pixels()
        .flat_map(|pixel| pixel.0)
        .map(|channel| channel as f32 / 255.0)
        .collect();

    Ok(ImageTensor { data })
}
