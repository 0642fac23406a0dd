//! Geometric stages: horizontal flip, rotation and integer zoom.

use super::calculations::{Rotation, zoom_window};
use crate::frame::Frame;

/// Mirror the frame about its vertical axis.
pub fn flip_horizontal(input: &Frame) -> Frame {
    let mut out = Frame::new(input.dimensions());
    for row in 0..input.height() {
        let dst = out.row_mut(row);
        dst.copy_from_slice(input.row(row));
        dst.reverse();
    }
    out
}

/// Rotate by `degrees` about the frame center.
///
/// Each output pixel takes the source sample at the truncated inverse-rotated
/// position; positions outside the frame become black.
pub fn rotate(input: &Frame, degrees: i32) -> Frame {
    let dims = input.dimensions();
    let rotation = Rotation::new(dims, degrees);
    Frame::from_fn(dims, |row, col| {
        rotation
            .source_index(row, col)
            .map_or(0, |(r, c)| input.get(r, c))
    })
}

/// Zoom into the frame by an integer `factor`.
///
/// A `W/F × H/F` window (see [`zoom_window`](super::zoom_window)) is
/// block-replicated so each sample fills an F×F block. Output pixels outside
/// the replicated area (when `F` does not divide the dimensions) are black.
/// A factor of 0 returns an unchanged copy; callers treat 0 as "disabled".
pub fn zoom(input: &Frame, factor: usize) -> Frame {
    let Some(window) = zoom_window(input.dimensions(), factor) else {
        return input.clone();
    };
    let mut out = Frame::new(input.dimensions());
    for y in 0..window.rows {
        let src = &input.row(window.row0 + y)[window.col0..window.col0 + window.cols];
        for dy in 0..window.factor {
            let dst = &mut out.row_mut(window.factor * y + dy)[..window.covered_cols()];
            for (block, &px) in dst.chunks_exact_mut(window.factor).zip(src) {
                block.fill(px);
            }
        }
    }
    out
}
