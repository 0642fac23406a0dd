//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Inspect
//!
//! ```text
//! Settings (settings.txt)
//!     fir          on
//!     median       off
//!     zoom         2
//!     brightness   -15
//!     flip         off
//!     rotation     30°
//!     Stages: fir → zoom → brightness → rotation
//! Problems
//!     line 3 (zoom) is not a number: "big"
//! ```
//!
//! ## Kernels
//!
//! ```text
//! identity  3x3  scale 1  offset 0
//!      0   0   0
//!      0   1   0
//!      0   0   0
//! ```
//!
//! ## Run
//!
//! ```text
//! Processed 240 frames, 3 settings loads, 4.12 ms/frame, 1.53 s total
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes it out. Format functions are pure:
//! no I/O, no side effects.

use crate::imaging::{Kernel, KernelPreset};
use crate::pipeline::{Pipeline, Stage};
use crate::process::RunSummary;
use crate::settings::{Field, Reload, Settings};
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

/// Human rendering of one field's value.
fn field_value(settings: &Settings, field: Field) -> String {
    match field {
        Field::Fir => on_off(settings.fir).to_string(),
        Field::Median => on_off(settings.median).to_string(),
        Field::Flip => on_off(settings.flip).to_string(),
        Field::Zoom if settings.zoom == 0 => "off".to_string(),
        Field::Zoom => settings.zoom.to_string(),
        Field::Brightness => format!("{:+}", settings.brightness),
        Field::Rotation => format!("{}°", settings.rotation),
    }
}

// ============================================================================
// Settings
// ============================================================================

/// Format a settings snapshot: one line per field, then the active stages.
pub fn format_settings(settings: &Settings) -> Vec<String> {
    let mut lines: Vec<String> = Field::ALL
        .iter()
        .map(|&f| format!("{}{:<12} {}", indent(1), f.name(), field_value(settings, f)))
        .collect();
    let stages: Vec<&str> = Pipeline::active_stages(settings).map(Stage::name).collect();
    lines.push(format!("{}Stages: {}", indent(1), stages.join(" → ")));
    lines
}

/// Format the result of parsing a settings file, including any field errors.
pub fn format_reload(path: &Path, reload: &Reload) -> Vec<String> {
    let mut lines = vec![format!("Settings ({})", path.display())];
    lines.extend(format_settings(&reload.settings));
    if !reload.errors.is_empty() {
        lines.push("Problems".to_string());
        lines.extend(
            reload
                .errors
                .iter()
                .map(|e| format!("{}{}", indent(1), e)),
        );
        if reload.rejected {
            lines.push(format!("{}update rejected, values above are the defaults", indent(1)));
        }
    }
    lines
}

/// Print a parsed settings file to stdout.
pub fn print_reload(path: &Path, reload: &Reload) {
    for line in format_reload(path, reload) {
        println!("{}", line);
    }
}

// ============================================================================
// Kernels
// ============================================================================

fn format_kernel(name: &str, kernel: &Kernel) -> Vec<String> {
    let k = kernel.size();
    let mut lines = vec![format!(
        "{:<9} {k}x{k}  scale {}  offset {}",
        name,
        kernel.scale(),
        kernel.offset()
    )];
    for row in 0..k {
        let cells: String = kernel.row(row).iter().map(|c| format!("{:>4}", c)).collect();
        lines.push(cells);
    }
    lines
}

/// Format every preset kernel with its coefficients.
pub fn format_kernels() -> Vec<String> {
    let mut lines = Vec::new();
    for (i, preset) in KernelPreset::ALL.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        lines.extend(format_kernel(preset.name(), &preset.kernel()));
    }
    lines
}

/// Print the kernel registry to stdout.
pub fn print_kernels() {
    for line in format_kernels() {
        println!("{}", line);
    }
}

// ============================================================================
// Run
// ============================================================================

/// Format the end-of-run summary line.
pub fn format_run_summary(summary: &RunSummary) -> Vec<String> {
    let per_frame = match summary.mean_frame_time() {
        Some(d) => format!("{:.2} ms/frame", d.as_secs_f64() * 1000.0),
        None => "no frames".to_string(),
    };
    vec![format!(
        "Processed {} frame{}, {} settings load{}, {}, {:.2} s total",
        summary.frames,
        if summary.frames == 1 { "" } else { "s" },
        summary.reloads,
        if summary.reloads == 1 { "" } else { "s" },
        per_frame,
        summary.elapsed.as_secs_f64()
    )]
}

/// Print the run summary to stderr, keeping stdout free for frame data.
pub fn print_run_summary(summary: &RunSummary) {
    for line in format_run_summary(summary) {
        eprintln!("{}", line);
    }
}
