//! The frame type shared by every pipeline stage.
//!
//! A [`Frame`] is a fixed-size, row-major grid of 8-bit grayscale samples.
//! Stages never mutate their input: each one borrows a `&Frame` and returns a
//! freshly allocated output frame of the same [`Dimensions`].

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame dimensions must be non-zero (got {width}x{height})")]
    EmptyDimensions { width: usize, height: usize },
    #[error("expected {expected} samples for a {width}x{height} frame, got {actual}")]
    LengthMismatch {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },
}

/// Width and height of a frame, in samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    pub width: usize,
    pub height: usize,
}

impl Dimensions {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Number of samples in one frame (`W·H`).
    pub fn sample_count(self) -> usize {
        self.width * self.height
    }

    /// The shorter of the two edges.
    pub fn short_edge(self) -> usize {
        self.width.min(self.height)
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A W×H grid of unsigned 8-bit samples, addressed as `(row, col)`.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    dims: Dimensions,
    data: Vec<u8>,
}

impl Frame {
    /// An all-black frame.
    pub fn new(dims: Dimensions) -> Self {
        Self {
            dims,
            data: vec![0; dims.sample_count()],
        }
    }

    /// Wrap row-major samples. The buffer must hold exactly `W·H` bytes.
    pub fn from_vec(dims: Dimensions, data: Vec<u8>) -> Result<Self, FrameError> {
        if dims.width == 0 || dims.height == 0 {
            return Err(FrameError::EmptyDimensions {
                width: dims.width,
                height: dims.height,
            });
        }
        if data.len() != dims.sample_count() {
            return Err(FrameError::LengthMismatch {
                width: dims.width,
                height: dims.height,
                expected: dims.sample_count(),
                actual: data.len(),
            });
        }
        Ok(Self { dims, data })
    }

    /// Build a frame by evaluating `f(row, col)` for every sample.
    pub fn from_fn(dims: Dimensions, mut f: impl FnMut(usize, usize) -> u8) -> Self {
        let mut data = Vec::with_capacity(dims.sample_count());
        for row in 0..dims.height {
            for col in 0..dims.width {
                data.push(f(row, col));
            }
        }
        Self { dims, data }
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    pub fn width(&self) -> usize {
        self.dims.width
    }

    pub fn height(&self) -> usize {
        self.dims.height
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.data[row * self.dims.width + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: u8) {
        self.data[row * self.dims.width + col] = value;
    }

    /// One row of samples.
    #[inline]
    pub fn row(&self, row: usize) -> &[u8] {
        let start = row * self.dims.width;
        &self.data[start..start + self.dims.width]
    }

    #[inline]
    pub fn row_mut(&mut self, row: usize) -> &mut [u8] {
        let start = row * self.dims.width;
        &mut self.data[start..start + self.dims.width]
    }

    pub fn rows(&self) -> std::slice::Chunks<'_, u8> {
        self.data.chunks(self.dims.width)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

// Frames can be a megapixel; print the shape and a short prefix only.
impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let preview = &self.data[..self.data.len().min(8)];
        f.debug_struct("Frame")
            .field("dims", &self.dims)
            .field("head", &preview)
            .finish()
    }
}
