//! 3×3 median (rank) filter.

use crate::frame::Frame;

/// Replace every interior pixel with the median of its 3×3 neighborhood.
///
/// The one-pixel border is copied through from `input`, the same policy the
/// FIR stage uses.
pub fn median_filter(input: &Frame) -> Frame {
    let mut out = input.clone();
    let (w, h) = (input.width(), input.height());
    if w < 3 || h < 3 {
        return out;
    }

    let mut window = [0u8; 9];
    for row in 1..h - 1 {
        let above = input.row(row - 1);
        let here = input.row(row);
        let below = input.row(row + 1);
        for col in 1..w - 1 {
            window[..3].copy_from_slice(&above[col - 1..=col + 1]);
            window[3..6].copy_from_slice(&here[col - 1..=col + 1]);
            window[6..].copy_from_slice(&below[col - 1..=col + 1]);
            out.set(row, col, median_of_nine(&mut window));
        }
    }
    out
}

/// Rank 4 of 9. Reorders `window` in place.
#[inline]
fn median_of_nine(window: &mut [u8; 9]) -> u8 {
    *window.select_nth_unstable(4).1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Dimensions;
    use crate::test_helpers::{constant_frame, gradient_frame};

    #[test]
    fn single_dark_pixel_is_removed() {
        let mut input = constant_frame(Dimensions::new(5, 5), 100);
        input.set(2, 2, 0);
        let out = median_filter(&input);

        assert_eq!(out.get(2, 2), 100);
        for row in 1..4 {
            for col in 1..4 {
                assert_eq!(out.get(row, col), 100);
            }
        }
    }

    #[test]
    fn border_is_copied_through() {
        // Border samples that differ from their neighbors stay as they were.
        let mut input = constant_frame(Dimensions::new(5, 5), 100);
        input.set(0, 0, 3);
        input.set(0, 2, 7);
        input.set(4, 4, 250);
        input.set(2, 0, 1);
        let out = median_filter(&input);

        assert_eq!(out.get(0, 0), 3);
        assert_eq!(out.get(0, 2), 7);
        assert_eq!(out.get(4, 4), 250);
        assert_eq!(out.get(2, 0), 1);
        assert_eq!(out.row(0), input.row(0));
        assert_eq!(out.row(4), input.row(4));
    }

    #[test]
    fn median_handles_duplicates() {
        let mut w = [5, 5, 5, 1, 1, 9, 9, 9, 5];
        assert_eq!(median_of_nine(&mut w), 5);
        let mut w = [0, 0, 0, 0, 255, 255, 255, 255, 255];
        assert_eq!(median_of_nine(&mut w), 255);
    }

    #[test]
    fn impulse_noise_line_is_suppressed() {
        // A one-pixel bright vertical line is thinner than the window.
        let input = Frame::from_fn(Dimensions::new(6, 6), |_, c| if c == 3 { 255 } else { 10 });
        let out = median_filter(&input);
        for row in 1..5 {
            assert_eq!(out.get(row, 3), 10);
        }
    }

    #[test]
    fn tiny_frame_is_copied() {
        let input = gradient_frame(Dimensions::new(2, 8));
        assert_eq!(median_filter(&input), input);
    }

    #[test]
    fn preserves_dimensions() {
        let input = gradient_frame(Dimensions::new(13, 7));
        assert_eq!(median_filter(&input).dimensions(), input.dimensions());
    }
}
