use crate::error::DecodeError;
use image::{imageops::FilterType, DynamicImage};
use ndarray::Array4;

/// Edge length the model was trained on.
pub const INPUT_SIZE: u32 = 224;

/// Parses client bytes as an image, guessing the format from the content.
/// Truncated, mistyped, or empty payloads all come back as `InvalidImage`.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
    Ok(image::load_from_memory(bytes)?)
}

/// Converts a decoded image into the tensor the model consumes.
///
/// The image is resized (not cropped) to 224x224, converted to RGB8, and
/// every channel value is scaled from 0-255 down to [0.0, 1.0]. The leading
/// axis is the batch dimension, so the output shape is always
/// [1, 224, 224, 3] regardless of the source resolution.
pub fn preprocess(img: &DynamicImage) -> Array4<f32> {
    let resized = img.resize_exact(INPUT_SIZE, INPUT_SIZE, FilterType::Triangle);
    let rgb = resized.to_rgb8();

    let size = INPUT_SIZE as usize;
    Array4::from_shape_fn((1, size, size, 3), |(_, y, x, c)| {
        rgb.get_pixel(x as u32, y as u32)[c] as f32 / 255.0
    })
}
