//! FIR (convolution) stage.

use super::kernel::Kernel;
use crate::frame::Frame;

/// Convolve `input` with `kernel`.
///
/// Every pixel whose K×K window fits inside the frame becomes
/// `clamp(sum / scale + offset, 0, 255)`, where `/` truncates toward zero.
/// The `⌊K/2⌋`-wide border is copied through from `input` unchanged; a frame
/// narrower or shorter than the kernel comes back as an exact copy.
pub fn fir_filter(input: &Frame, kernel: &Kernel) -> Frame {
    let mut out = input.clone();
    let (w, h) = (input.width(), input.height());
    let k = kernel.size();
    let r = kernel.radius();
    if w < k || h < k {
        return out;
    }

    for row in r..h - r {
        for col in r..w - r {
            let mut sum: i64 = 0;
            for kr in 0..k {
                let src = &input.row(row - r + kr)[col - r..col - r + k];
                for (&c, &px) in kernel.row(kr).iter().zip(src) {
                    sum += i64::from(c) * i64::from(px);
                }
            }
            let value = sum / i64::from(kernel.scale()) + i64::from(kernel.offset());
            out.set(row, col, value.clamp(0, 255) as u8);
        }
    }
    out
}
