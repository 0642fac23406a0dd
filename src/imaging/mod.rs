//! Frame transforms: pure Rust, one function per pipeline stage.
//!
//! | Stage | Function | Border |
//! |---|---|---|
//! | **FIR filter** | [`fir_filter`] | `⌊K/2⌋` border copied through |
//! | **Median** | [`median_filter`] | 1-pixel border copied through |
//! | **Zoom** | [`zoom`] | uncovered area black |
//! | **Brightness** | [`adjust_brightness`] | full frame |
//! | **Flip** | [`flip_horizontal`] | full frame |
//! | **Rotation** | [`rotate`] | out-of-frame sources black |
//!
//! Every stage borrows its input and returns a new [`Frame`](crate::frame::Frame)
//! of the same dimensions.
//!
//! The module is split into:
//! - **Kernel**: [`Kernel`] and the [`KernelPreset`] registry
//! - **Calculations**: pure coordinate math for zoom and rotation
//! - **Stages**: convolve, median, geometry, brightness
//! - **Convert**: decoding ordinary image files into frames

mod brightness;
mod calculations;
pub mod convert;
mod convolve;
mod geometry;
pub mod kernel;
mod median;

pub use brightness::adjust_brightness;
pub use calculations::{Rotation, ZoomWindow, zoom_window};
pub use convert::{ImportError, load_frame};
pub use convolve::fir_filter;
pub use geometry::{flip_horizontal, rotate, zoom};
pub use kernel::{Kernel, KernelError, KernelPreset};
pub use median::median_filter;
