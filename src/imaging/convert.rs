//! Bridging between ordinary image files and raw frames.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, PGM/PNM, TIFF) | `image::ImageReader` |
//! | Grayscale | `DynamicImage::to_luma8` |
//! | Resize to W×H | `image::imageops::resize` with `Lanczos3` |
//!
//! `grayflow import` uses this to produce input frames from test pictures.

use crate::frame::{Dimensions, Frame, FrameError};
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path}: {message}")]
    Decode { path: String, message: String },
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),
}

/// Load an image file as a frame of exactly `dims`.
///
/// The image is converted to 8-bit luma and resized when its size differs.
pub fn load_frame(path: &Path, dims: Dimensions) -> Result<Frame, ImportError> {
    let decoded = ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| ImportError::Decode {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
    frame_from_image(&decoded, dims)
}

/// Convert a decoded image to a frame of `dims`.
pub fn frame_from_image(image: &DynamicImage, dims: Dimensions) -> Result<Frame, ImportError> {
    let gray = image.to_luma8();
    let (w, h) = (dims.width as u32, dims.height as u32);
    let gray = if gray.dimensions() == (w, h) {
        gray
    } else {
        image::imageops::resize(&gray, w, h, FilterType::Lanczos3)
    };
    Ok(Frame::from_vec(dims, gray.into_raw())?)
}
