//! The fixed six-stage transform chain.
//!
//! ```text
//! input ─▶ FIR ─▶ median ─▶ zoom ─▶ brightness ─▶ flip ─▶ rotation ─▶ output
//!          (flag)  (flag)   (F>0)    (always)     (flag)   (always)
//! ```
//!
//! A bypassed stage passes its input through unchanged. The settings snapshot
//! is taken once per frame by the caller, so every stage of one frame sees the
//! same values.

use crate::frame::Frame;
use crate::imaging::{
    Kernel, adjust_brightness, fir_filter, flip_horizontal, median_filter, rotate, zoom,
};
use crate::settings::Settings;
use std::borrow::Cow;

/// One pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fir,
    Median,
    Zoom,
    Brightness,
    Flip,
    Rotation,
}

impl Stage {
    pub const ORDER: [Stage; 6] = [
        Stage::Fir,
        Stage::Median,
        Stage::Zoom,
        Stage::Brightness,
        Stage::Flip,
        Stage::Rotation,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Fir => "fir",
            Stage::Median => "median",
            Stage::Zoom => "zoom",
            Stage::Brightness => "brightness",
            Stage::Flip => "flip",
            Stage::Rotation => "rotation",
        }
    }

    /// Whether this stage runs under `settings`.
    pub fn is_enabled(self, settings: &Settings) -> bool {
        match self {
            Stage::Fir => settings.fir,
            Stage::Median => settings.median,
            Stage::Zoom => settings.zoom > 0,
            Stage::Brightness | Stage::Rotation => true,
            Stage::Flip => settings.flip,
        }
    }

    fn apply(self, kernel: &Kernel, input: &Frame, settings: &Settings) -> Frame {
        match self {
            Stage::Fir => fir_filter(input, kernel),
            Stage::Median => median_filter(input),
            Stage::Zoom => zoom(input, settings.zoom as usize),
            Stage::Brightness => adjust_brightness(input, settings.brightness),
            Stage::Flip => flip_horizontal(input),
            Stage::Rotation => rotate(input, settings.rotation),
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The configured transform chain for one stream.
#[derive(Debug, Clone)]
pub struct Pipeline {
    kernel: Kernel,
}

impl Pipeline {
    /// A pipeline whose FIR stage convolves with `kernel`.
    pub fn new(kernel: Kernel) -> Self {
        Self { kernel }
    }

    /// Stages that will run under `settings`, in order.
    pub fn active_stages(settings: &Settings) -> impl Iterator<Item = Stage> + '_ {
        Stage::ORDER.into_iter().filter(|s| s.is_enabled(settings))
    }

    /// Run every enabled stage over `input`.
    pub fn process(&self, input: &Frame, settings: &Settings) -> Frame {
        let mut current = Cow::Borrowed(input);
        for stage in Self::active_stages(settings) {
            current = Cow::Owned(stage.apply(&self.kernel, &current, settings));
        }
        current.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Dimensions;
    use crate::imaging::KernelPreset;
    use crate::test_helpers::{constant_frame, gradient_frame};

    fn pipeline() -> Pipeline {
        Pipeline::new(KernelPreset::Lowpass.kernel())
    }

    #[test]
    fn default_settings_are_identity() {
        let dims = Dimensions::new(9, 7);
        let input = gradient_frame(dims);
        assert_eq!(pipeline().process(&input, &Settings::default()), input);
    }

    #[test]
    fn brightness_and_rotation_always_run() {
        let active: Vec<Stage> = Pipeline::active_stages(&Settings::default()).collect();
        assert_eq!(active, vec![Stage::Brightness, Stage::Rotation]);

        let all = Settings {
            fir: true,
            median: true,
            zoom: 2,
            flip: true,
            ..Settings::default()
        };
        let active: Vec<Stage> = Pipeline::active_stages(&all).collect();
        assert_eq!(active, Stage::ORDER.to_vec());
    }

    #[test]
    fn brightness_applies_after_zoom() {
        let dims = Dimensions::new(4, 4);
        let input = Frame::from_fn(dims, |r, c| (r * 4 + c) as u8);
        let settings = Settings {
            zoom: 2,
            brightness: 100,
            ..Settings::default()
        };
        let out = pipeline().process(&input, &settings);
        assert_eq!(out.row(0), &[105, 105, 106, 106]);
        assert_eq!(out.row(3), &[109, 109, 110, 110]);
    }

    #[test]
    fn flip_applies_before_rotation() {
        let dims = Dimensions::new(4, 4);
        let input = Frame::from_fn(dims, |r, c| (r * 4 + c + 1) as u8);
        let settings = Settings {
            flip: true,
            rotation: 180,
            ..Settings::default()
        };
        let out = pipeline().process(&input, &settings);
        assert_eq!(out, rotate(&flip_horizontal(&input), 180));
        assert_ne!(out, flip_horizontal(&rotate(&input, 180)));
        assert_eq!(out.get(1, 1), input.get(3, 0));
    }

    #[test]
    fn median_runs_after_fir() {
        // A lone spike: the lowpass spreads it, so median sees no outlier left
        // to remove at the centre. Median alone would erase it.
        let dims = Dimensions::new(9, 9);
        let mut input = constant_frame(dims, 0);
        input.set(4, 4, 255);

        let median_only = Settings {
            median: true,
            ..Settings::default()
        };
        assert_eq!(pipeline().process(&input, &median_only).get(4, 4), 0);

        let both = Settings {
            fir: true,
            median: true,
            ..Settings::default()
        };
        assert!(pipeline().process(&input, &both).get(4, 4) > 0);
    }

    #[test]
    fn every_combination_preserves_dimensions() {
        let dims = Dimensions::new(12, 8);
        let input = gradient_frame(dims);
        let p = pipeline();
        for bits in 0..8u8 {
            let settings = Settings {
                fir: bits & 1 != 0,
                median: bits & 2 != 0,
                flip: bits & 4 != 0,
                zoom: u32::from(bits % 3),
                brightness: -10,
                rotation: 33,
            };
            assert_eq!(p.process(&input, &settings).dimensions(), dims);
        }
    }

    #[test]
    fn stage_names() {
        let names: Vec<&str> = Stage::ORDER.iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            ["fir", "median", "zoom", "brightness", "flip", "rotation"]
        );
    }
}
