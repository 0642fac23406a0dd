//! Run configuration module.
//!
//! Handles loading and validating `grayflow.toml`. The run configuration holds
//! everything fixed for the lifetime of a stream: frame size, FIR kernel,
//! where the settings file lives and how bad settings lines are treated.
//! What changes while the stream runs lives in the settings file instead (see
//! [`settings`](crate::settings)).
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [frame]
//! width = 1280
//! height = 960
//!
//! [filter]
//! kernel = "identity"          # identity | lowpass | highpass | boxcar | scharr
//!
//! [settings]
//! path = "settings.txt"
//! policy = "retain-previous"   # retain-previous | reject-update | use-default
//!
//! [diagnostics]
//! repeat = 1
//! ```
//!
//! ## Custom Kernels
//!
//! Instead of a preset name, `kernel` can be an inline table:
//!
//! ```toml
//! [filter.kernel]
//! coefficients = [[0, -1, 0], [-1, 5, -1], [0, -1, 0]]
//! scale = 1
//! offset = 0
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::frame::Dimensions;
use crate::imaging::{Kernel, KernelError, KernelPreset};
use crate::settings::ReloadPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Invalid filter.kernel: {0}")]
    Kernel(#[from] KernelError),
}

/// Run configuration loaded from `grayflow.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Size of every frame in the stream.
    pub frame: FrameConfig,
    /// FIR kernel selection.
    pub filter: FilterConfig,
    /// Settings file location and reload policy.
    pub settings: SettingsConfig,
    /// Timing and real-time estimation.
    pub diagnostics: DiagnosticsConfig,
}

impl RunConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame.width == 0 || self.frame.height == 0 {
            return Err(ConfigError::Validation(format!(
                "frame dimensions must be non-zero (got {}x{})",
                self.frame.width, self.frame.height
            )));
        }
        let kernel = self.kernel()?;
        if kernel.size() > self.dims().short_edge() {
            return Err(ConfigError::Validation(format!(
                "filter.kernel is {k}x{k}, larger than the {} frame",
                self.dims(),
                k = kernel.size()
            )));
        }
        if self.diagnostics.repeat == 0 {
            return Err(ConfigError::Validation(
                "diagnostics.repeat must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn dims(&self) -> Dimensions {
        Dimensions::new(self.frame.width, self.frame.height)
    }

    /// Build the configured FIR kernel.
    pub fn kernel(&self) -> Result<Kernel, ConfigError> {
        Ok(self.filter.kernel.build()?)
    }
}

/// Frame geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrameConfig {
    pub width: usize,
    pub height: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 960,
        }
    }
}

/// FIR kernel selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    pub kernel: KernelSpec,
}

/// A preset name or an inline kernel table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KernelSpec {
    Preset(KernelPreset),
    Custom(CustomKernel),
}

impl Default for KernelSpec {
    fn default() -> Self {
        KernelSpec::Preset(KernelPreset::Identity)
    }
}

impl KernelSpec {
    pub fn build(&self) -> Result<Kernel, KernelError> {
        match self {
            KernelSpec::Preset(preset) => Ok(preset.kernel()),
            KernelSpec::Custom(custom) => {
                Kernel::new(&custom.coefficients, custom.scale, custom.offset)
            }
        }
    }
}

/// A user-defined K×K kernel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomKernel {
    /// Row-major coefficient rows, K rows of K values, K odd.
    pub coefficients: Vec<Vec<i32>>,
    /// Divisor applied to the weighted sum.
    #[serde(default = "default_scale")]
    pub scale: i32,
    /// Added after dividing.
    #[serde(default)]
    pub offset: i32,
}

fn default_scale() -> i32 {
    1
}

/// Settings file location and reload policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsConfig {
    /// Path of the six-line settings file. Relative paths resolve against the
    /// working directory.
    pub path: PathBuf,
    /// What happens to a field that fails validation.
    pub policy: ReloadPolicy,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("settings.txt"),
            policy: ReloadPolicy::default(),
        }
    }
}

/// Timing diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiagnosticsConfig {
    /// Process each frame this many times before writing it.
    pub repeat: u32,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self { repeat: 1 }
    }
}

// =============================================================================
// Config loading and validation
// =============================================================================

/// Load and validate the run configuration at `path`.
///
/// Returns the defaults when no file exists. Returns `Err` if the file exists
/// but is not valid TOML, has unknown keys, or fails validation.
pub fn load_config(path: &Path) -> Result<RunConfig, ConfigError> {
    if !path.exists() {
        let config = RunConfig::default();
        config.validate()?;
        return Ok(config);
    }
    let content = fs::read_to_string(path)?;
    let config: RunConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `grayflow.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# grayflow run configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# These values are fixed for the lifetime of a stream. The six runtime
# parameters (filters, zoom, brightness, flip, rotation) live in the
# settings file and are picked up while the stream runs.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Frame geometry
# ---------------------------------------------------------------------------
[frame]
# Every input frame is exactly width * height bytes, 8-bit grayscale.
width = 1280
height = 960

# ---------------------------------------------------------------------------
# FIR filter
# ---------------------------------------------------------------------------
[filter]
# One of: identity, lowpass, highpass, boxcar, scharr.
# `grayflow kernels` prints their coefficients.
kernel = "identity"

# Or a custom odd-sized square kernel:
# [filter.kernel]
# coefficients = [[0, -1, 0], [-1, 5, -1], [0, -1, 0]]
# scale = 1     # the weighted sum is divided by this (truncating)
# offset = 0    # then this is added, and the result clamped to 0-255

# ---------------------------------------------------------------------------
# Settings file
# ---------------------------------------------------------------------------
[settings]
# Six lines: fir (0/1), median (0/1), zoom (>= 0), brightness, flip (0/1),
# rotation in degrees. Polled by modification time once per frame.
path = "settings.txt"

# What to do with a line that is missing or invalid:
#   retain-previous  keep that field's previous value
#   reject-update    ignore the whole file until it is written again
#   use-default      reset that field to its startup value
policy = "retain-previous"

# ---------------------------------------------------------------------------
# Diagnostics
# ---------------------------------------------------------------------------
[diagnostics]
# Process every frame this many times before writing it once. Per-frame
# timings (RUST_LOG=debug) then show whether the pipeline keeps up.
repeat = 1
"##
}
