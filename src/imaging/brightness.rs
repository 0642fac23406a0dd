//! Additive brightness stage.

use crate::frame::Frame;

/// Add `delta` to every sample, saturating at 0 and 255.
pub fn adjust_brightness(input: &Frame, delta: i32) -> Frame {
    let mut out = input.clone();
    if delta == 0 {
        return out;
    }
    for row in 0..out.height() {
        for px in out.row_mut(row) {
            *px = (i64::from(*px) + i64::from(delta)).clamp(0, 255) as u8;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Dimensions;
    use crate::test_helpers::gradient_frame;

    #[test]
    fn clamps_instead_of_wrapping() {
        let input = Frame::from_vec(Dimensions::new(2, 1), vec![250, 5]).unwrap();
        assert_eq!(adjust_brightness(&input, 20).as_bytes(), &[255, 25]);
        assert_eq!(adjust_brightness(&input, -20).as_bytes(), &[230, 0]);
    }

    #[test]
    fn zero_delta_is_identity() {
        let input = gradient_frame(Dimensions::new(8, 8));
        assert_eq!(adjust_brightness(&input, 0), input);
    }

    #[test]
    fn huge_deltas_saturate() {
        let input = gradient_frame(Dimensions::new(4, 4));
        assert!(adjust_brightness(&input, i32::MAX).as_bytes().iter().all(|&v| v == 255));
        assert!(adjust_brightness(&input, i32::MIN).as_bytes().iter().all(|&v| v == 0));
    }
}
