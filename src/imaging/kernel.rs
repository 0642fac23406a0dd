//! Convolution kernel definitions.
//!
//! A [`Kernel`] describes *what* the FIR stage computes: a K×K coefficient
//! matrix, an integer scale divisor and an offset. The named presets in
//! [`KernelPreset`] are the filters the pipeline ships with; a custom kernel
//! can be described in `grayflow.toml` instead (see
//! [`config::FilterConfig`](crate::config::FilterConfig)).
//!
//! | Preset | K | Scale | Offset | Effect |
//! |---|---|---|---|---|
//! | `identity` | 3 | 1 | 0 | copies the frame |
//! | `lowpass` | 5 | 256 | 0 | binomial blur |
//! | `highpass` | 5 | 1 | 128 | edge boost around mid-gray |
//! | `boxcar` | 3 | 9 | 0 | mean blur |
//! | `scharr` | 3 | 1 | 128 | vertical gradient |

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum KernelError {
    #[error("kernel must not be empty")]
    Empty,
    #[error("kernel size must be odd so the window has a center (got {0})")]
    EvenSize(usize),
    #[error("kernel row {row} has {len} coefficients, expected {size}")]
    NotSquare { row: usize, len: usize, size: usize },
    #[error("kernel scale must be non-zero")]
    ZeroScale,
}

/// Named kernels selectable from the run configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KernelPreset {
    Identity,
    Lowpass,
    Highpass,
    Boxcar,
    Scharr,
}

impl KernelPreset {
    pub const ALL: [KernelPreset; 5] = [
        KernelPreset::Identity,
        KernelPreset::Lowpass,
        KernelPreset::Highpass,
        KernelPreset::Boxcar,
        KernelPreset::Scharr,
    ];

    pub fn name(self) -> &'static str {
        match self {
            KernelPreset::Identity => "identity",
            KernelPreset::Lowpass => "lowpass",
            KernelPreset::Highpass => "highpass",
            KernelPreset::Boxcar => "boxcar",
            KernelPreset::Scharr => "scharr",
        }
    }

    pub fn kernel(self) -> Kernel {
        let (rows, scale, offset): (&[&[i32]], i32, i32) = match self {
            KernelPreset::Identity => (&[&[0, 0, 0], &[0, 1, 0], &[0, 0, 0]], 1, 0),
            KernelPreset::Lowpass => (
                &[
                    &[1, 4, 6, 4, 1],
                    &[4, 16, 24, 16, 4],
                    &[6, 24, 36, 24, 6],
                    &[4, 16, 24, 16, 4],
                    &[1, 4, 6, 4, 1],
                ],
                256,
                0,
            ),
            KernelPreset::Highpass => (
                &[
                    &[0, 0, -1, 0, 0],
                    &[0, -1, -2, -1, 0],
                    &[-1, -2, 16, -2, -1],
                    &[0, -1, -2, -1, 0],
                    &[0, 0, -1, 0, 0],
                ],
                1,
                128,
            ),
            KernelPreset::Boxcar => (&[&[1, 1, 1], &[1, 1, 1], &[1, 1, 1]], 9, 0),
            KernelPreset::Scharr => (&[&[3, 10, 3], &[0, 0, 0], &[-3, -10, -3]], 1, 128),
        };
        Kernel {
            size: rows.len(),
            coefficients: rows.iter().flat_map(|r| r.iter().copied()).collect(),
            scale,
            offset,
        }
    }
}

impl std::fmt::Display for KernelPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// An immutable K×K convolution kernel with scale and offset.
///
/// Construction validates that K is odd and the scale is non-zero, so the FIR
/// stage never has to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kernel {
    size: usize,
    coefficients: Vec<i32>,
    scale: i32,
    offset: i32,
}

impl Kernel {
    /// Build a kernel from a square matrix of coefficients.
    pub fn new(rows: &[Vec<i32>], scale: i32, offset: i32) -> Result<Self, KernelError> {
        let size = rows.len();
        if size == 0 {
            return Err(KernelError::Empty);
        }
        if size % 2 == 0 {
            return Err(KernelError::EvenSize(size));
        }
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != size) {
            return Err(KernelError::NotSquare {
                row,
                len: r.len(),
                size,
            });
        }
        if scale == 0 {
            return Err(KernelError::ZeroScale);
        }
        Ok(Self {
            size,
            coefficients: rows.iter().flatten().copied().collect(),
            scale,
            offset,
        })
    }

    /// Window edge length K.
    pub fn size(&self) -> usize {
        self.size
    }

    /// `⌊K/2⌋`, the width of the border the FIR stage cannot compute.
    pub fn radius(&self) -> usize {
        self.size / 2
    }

    pub fn scale(&self) -> i32 {
        self.scale
    }

    pub fn offset(&self) -> i32 {
        self.offset
    }

    #[inline]
    pub fn coefficient(&self, k: usize, l: usize) -> i32 {
        self.coefficients[k * self.size + l]
    }

    /// Coefficient row `k`.
    pub fn row(&self, k: usize) -> &[i32] {
        &self.coefficients[k * self.size..(k + 1) * self.size]
    }
}

impl Default for Kernel {
    fn default() -> Self {
        KernelPreset::Identity.kernel()
    }
}
