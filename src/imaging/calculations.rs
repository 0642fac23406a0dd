//! Pure coordinate math for the geometric stages.
//!
//! All functions here are pure and testable without frames.

use crate::frame::Dimensions;

/// The source window and block size a zoom by factor `F` samples from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoomWindow {
    /// Replication factor `F` (each source sample becomes an F×F block).
    pub factor: usize,
    /// `H / F`: number of source rows sampled.
    pub rows: usize,
    /// `W / F`: number of source columns sampled.
    pub cols: usize,
    /// First source row of the window.
    pub row0: usize,
    /// First source column of the window.
    pub col0: usize,
}

impl ZoomWindow {
    /// Output rows covered by replicated blocks (`F·(H/F)`).
    pub fn covered_rows(&self) -> usize {
        self.factor * self.rows
    }

    /// Output columns covered by replicated blocks (`F·(W/F)`).
    pub fn covered_cols(&self) -> usize {
        self.factor * self.cols
    }
}

/// Calculate the crop window for an integer zoom.
///
/// The window is `W/F × H/F` samples starting at
/// `((F-1)·((H/F) >> 1), (F-1)·((W/F) >> 1))`, which always lies inside the
/// frame for `1 ≤ F`.
///
/// # Arguments
/// * `dims` - Frame dimensions
/// * `factor` - Zoom factor `F`, must be at least 1
///
/// # Returns
/// * `None` when `factor` is 0
///
/// # Examples
/// ```
/// # use grayflow::imaging::{zoom_window, ZoomWindow};
/// # use grayflow::frame::Dimensions;
/// let w = zoom_window(Dimensions::new(4, 4), 2).unwrap();
/// assert_eq!((w.rows, w.cols, w.row0, w.col0), (2, 2, 1, 1));
/// ```
pub fn zoom_window(dims: Dimensions, factor: usize) -> Option<ZoomWindow> {
    if factor == 0 {
        return None;
    }
    let rows = dims.height / factor;
    let cols = dims.width / factor;
    Some(ZoomWindow {
        factor,
        rows,
        cols,
        row0: (factor - 1) * (rows >> 1),
        col0: (factor - 1) * (cols >> 1),
    })
}

/// Inverse mapping from output to source coordinates for a rotation about the
/// frame center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    sin: f64,
    cos: f64,
    cx: f64,
    cy: f64,
    dims: Dimensions,
}

impl Rotation {
    /// Prepare the mapping for `degrees` on a frame of `dims`.
    ///
    /// Quarter turns use exact trigonometric values so that 0°, 90°, 180° and
    /// 270° (and any angle congruent to them) carry no floating-point noise.
    pub fn new(dims: Dimensions, degrees: i32) -> Self {
        let (sin, cos) = quarter_turn_sin_cos(degrees).unwrap_or_else(|| {
            let rad = f64::from(degrees).to_radians();
            (rad.sin(), rad.cos())
        });
        Self {
            sin,
            cos,
            cx: dims.width as f64 / 2.0,
            cy: dims.height as f64 / 2.0,
            dims,
        }
    }

    /// Real-valued source position `(row, col)` for an output pixel.
    pub fn source_position(&self, row: usize, col: usize) -> (f64, f64) {
        let dy = row as f64 - self.cy;
        let dx = col as f64 - self.cx;
        let src_col = self.cx + dy * self.sin + dx * self.cos;
        let src_row = self.cy + dy * self.cos - dx * self.sin;
        (src_row, src_col)
    }

    /// Source sample `(row, col)` for an output pixel, or `None` when the
    /// truncated position falls outside the frame.
    ///
    /// Truncation is toward zero, and the upper bound is strict: an index
    /// equal to the width or height is outside.
    pub fn source_index(&self, row: usize, col: usize) -> Option<(usize, usize)> {
        let (src_row, src_col) = self.source_position(row, col);
        let (r, c) = (src_row.trunc(), src_col.trunc());
        let inside = r >= 0.0
            && c >= 0.0
            && r < self.dims.height as f64
            && c < self.dims.width as f64;
        inside.then(|| (r as usize, c as usize))
    }
}

/// Exact `(sin, cos)` for multiples of 90°.
fn quarter_turn_sin_cos(degrees: i32) -> Option<(f64, f64)> {
    match degrees.rem_euclid(360) {
        0 => Some((0.0, 1.0)),
        90 => Some((1.0, 0.0)),
        180 => Some((0.0, -1.0)),
        270 => Some((-1.0, 0.0)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // zoom_window tests
    // =========================================================================

    #[test]
    fn zoom_factor_zero_is_disabled() {
        assert_eq!(zoom_window(Dimensions::new(4, 4), 0), None);
    }

    #[test]
    fn zoom_factor_one_is_whole_frame() {
        let w = zoom_window(Dimensions::new(320, 240), 1).unwrap();
        assert_eq!((w.rows, w.cols, w.row0, w.col0), (240, 320, 0, 0));
    }

    #[test]
    fn zoom_factor_two_on_4x4() {
        let w = zoom_window(Dimensions::new(4, 4), 2).unwrap();
        assert_eq!(
            w,
            ZoomWindow {
                factor: 2,
                rows: 2,
                cols: 2,
                row0: 1,
                col0: 1
            }
        );
        assert_eq!((w.covered_rows(), w.covered_cols()), (4, 4));
    }

    #[test]
    fn zoom_non_dividing_factor_leaves_uncovered_edge() {
        // 1280x960 / 3 → 426x320 window, 1278 columns covered.
        let w = zoom_window(Dimensions::new(1280, 960), 3).unwrap();
        assert_eq!((w.rows, w.cols), (320, 426));
        assert_eq!((w.row0, w.col0), (2 * 160, 2 * 213));
        assert_eq!((w.covered_rows(), w.covered_cols()), (960, 1278));
    }

    #[test]
    fn zoom_window_stays_inside_frame() {
        for (width, height) in [(4, 4), (5, 3), (1280, 960), (7, 11)] {
            let dims = Dimensions::new(width, height);
            for factor in 1..=dims.short_edge() {
                let w = zoom_window(dims, factor).unwrap();
                assert!(w.row0 + w.rows <= height, "{dims} F={factor}");
                assert!(w.col0 + w.cols <= width, "{dims} F={factor}");
            }
        }
    }

    // =========================================================================
    // Rotation tests
    // =========================================================================

    #[test]
    fn rotation_zero_is_identity_mapping() {
        let rot = Rotation::new(Dimensions::new(5, 4), 0);
        for row in 0..4 {
            for col in 0..5 {
                assert_eq!(rot.source_index(row, col), Some((row, col)));
            }
        }
    }

    #[test]
    fn quarter_turns_are_exact() {
        assert_eq!(quarter_turn_sin_cos(90), Some((1.0, 0.0)));
        assert_eq!(quarter_turn_sin_cos(-90), Some((-1.0, 0.0)));
        assert_eq!(quarter_turn_sin_cos(450), Some((1.0, 0.0)));
        assert_eq!(quarter_turn_sin_cos(720), Some((0.0, 1.0)));
        assert_eq!(quarter_turn_sin_cos(45), None);
    }

    #[test]
    fn rotation_90_on_4x4() {
        // cx = cy = 2: src_col = row, src_row = 4 - col.
        let rot = Rotation::new(Dimensions::new(4, 4), 90);
        assert_eq!(rot.source_position(0, 1), (3.0, 0.0));
        assert_eq!(rot.source_index(0, 1), Some((3, 0)));
        assert_eq!(rot.source_index(3, 3), Some((1, 3)));
    }

    #[test]
    fn rotation_rejects_index_equal_to_height() {
        // Column 0 maps to src_row = 4 == H.
        let rot = Rotation::new(Dimensions::new(4, 4), 90);
        assert_eq!(rot.source_position(2, 0), (4.0, 2.0));
        assert_eq!(rot.source_index(2, 0), None);
    }

    #[test]
    fn rotation_rejects_index_equal_to_width() {
        // 270°: src_col = 4 - row, so row 0 maps to src_col = 4 == W.
        let rot = Rotation::new(Dimensions::new(4, 4), 270);
        assert_eq!(rot.source_position(0, 2), (2.0, 4.0));
        assert_eq!(rot.source_index(0, 2), None);
    }

    #[test]
    fn rotation_truncates_small_negatives_to_zero() {
        let rot = Rotation::new(Dimensions::new(10, 10), 30);
        // Every accepted index must be inside the frame.
        for row in 0..10 {
            for col in 0..10 {
                if let Some((r, c)) = rot.source_index(row, col) {
                    assert!(r < 10 && c < 10);
                }
            }
        }
        // The center is a fixed point.
        assert_eq!(rot.source_index(5, 5), Some((5, 5)));
    }
}
