//! Runtime settings: the six parameters a control process can change while a
//! stream is running.
//!
//! ## File Format
//!
//! Six lines, one decimal integer each, in fixed order:
//!
//! ```text
//! 1      # FIR filter enabled (0/1)
//! 0      # median filter enabled (0/1)
//! 2      # zoom factor (0 = off)
//! -15    # brightness delta
//! 0      # horizontal flip enabled (0/1)
//! 30     # rotation in degrees
//! ```
//!
//! Each line is read the way C's `%d` reads it: leading whitespace and a sign
//! are accepted, anything after the digits is ignored. The comments above are
//! therefore legal.
//!
//! ## Validation
//!
//! A line that is missing, not a number, or out of range for its field yields
//! a [`FieldError`]. What happens to that field is decided by the
//! [`ReloadPolicy`]; the other fields are unaffected unless the policy rejects
//! the whole update.

use crate::frame::Dimensions;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One immutable set of pipeline parameters.
///
/// The default is the startup state: every optional stage disabled,
/// brightness and rotation at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub fir: bool,
    pub median: bool,
    /// Zoom factor, 0 = disabled.
    pub zoom: u32,
    pub brightness: i32,
    pub flip: bool,
    pub rotation: i32,
}

/// The six settings fields, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Fir,
    Median,
    Zoom,
    Brightness,
    Flip,
    Rotation,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Fir,
        Field::Median,
        Field::Zoom,
        Field::Brightness,
        Field::Flip,
        Field::Rotation,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Fir => "fir",
            Field::Median => "median",
            Field::Zoom => "zoom",
            Field::Brightness => "brightness",
            Field::Flip => "flip",
            Field::Rotation => "rotation",
        }
    }

    /// 1-based line number in the settings file.
    pub fn line(self) -> usize {
        self as usize + 1
    }

    fn is_flag(self) -> bool {
        matches!(self, Field::Fir | Field::Median | Field::Flip)
    }

    /// Parse and range-check one line for this field.
    pub fn parse(self, line: &str) -> Result<i32, FieldError> {
        let raw = parse_leading_int(line).ok_or_else(|| FieldError::NotANumber {
            field: self,
            text: line.trim().to_string(),
        })?;
        let out_of_range = |expected| FieldError::OutOfRange {
            field: self,
            value: raw,
            expected,
        };
        let value = i32::try_from(raw).map_err(|_| out_of_range("a 32-bit integer"))?;
        if self.is_flag() && !(0..=1).contains(&value) {
            return Err(out_of_range("0 or 1"));
        }
        if self == Field::Zoom && value < 0 {
            return Err(out_of_range("a factor >= 0"));
        }
        Ok(value)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("line {} ({field}) is missing", .field.line())]
    Missing { field: Field },
    #[error("line {} ({field}) is not a number: {text:?}", .field.line())]
    NotANumber { field: Field, text: String },
    #[error("line {} ({field}) is {value}, expected {expected}", .field.line())]
    OutOfRange {
        field: Field,
        value: i64,
        expected: &'static str,
    },
}

impl FieldError {
    pub fn field(&self) -> Field {
        match self {
            FieldError::Missing { field }
            | FieldError::NotANumber { field, .. }
            | FieldError::OutOfRange { field, .. } => *field,
        }
    }
}

/// What to do with fields that fail validation during a reload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReloadPolicy {
    /// The failing field keeps its previous value; the others update.
    #[default]
    RetainPrevious,
    /// Any failing field discards the whole reload.
    RejectUpdate,
    /// The failing field falls back to its startup default.
    UseDefault,
}

/// Outcome of parsing a settings file against the previous snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reload {
    /// The snapshot the pipeline should use from now on.
    pub settings: Settings,
    /// Every field that failed validation, in file order.
    pub errors: Vec<FieldError>,
    /// True when the policy discarded the update.
    pub rejected: bool,
}

impl Settings {
    /// Value of one field as the integer written in the file.
    pub fn get(&self, field: Field) -> i32 {
        match field {
            Field::Fir => i32::from(self.fir),
            Field::Median => i32::from(self.median),
            Field::Zoom => i32::try_from(self.zoom).unwrap_or(i32::MAX),
            Field::Brightness => self.brightness,
            Field::Flip => i32::from(self.flip),
            Field::Rotation => self.rotation,
        }
    }

    /// Set one field from an already validated value.
    fn set(&mut self, field: Field, value: i32) {
        match field {
            Field::Fir => self.fir = value == 1,
            Field::Median => self.median = value == 1,
            Field::Zoom => self.zoom = value.max(0) as u32,
            Field::Brightness => self.brightness = value,
            Field::Flip => self.flip = value == 1,
            Field::Rotation => self.rotation = value,
        }
    }

    /// Parse a settings file body on top of `self`.
    pub fn reload(&self, text: &str, policy: ReloadPolicy) -> Reload {
        let defaults = Settings::default();
        let mut next = *self;
        let mut errors = Vec::new();
        let mut lines = text.lines();

        for field in Field::ALL {
            let parsed = lines
                .next()
                .ok_or(FieldError::Missing { field })
                .and_then(|line| field.parse(line));
            match parsed {
                Ok(value) => next.set(field, value),
                Err(err) => {
                    if policy == ReloadPolicy::UseDefault {
                        next.set(field, defaults.get(field));
                    }
                    errors.push(err);
                }
            }
        }

        let rejected = policy == ReloadPolicy::RejectUpdate && !errors.is_empty();
        Reload {
            settings: if rejected { *self } else { next },
            errors,
            rejected,
        }
    }

    /// Clamp values the pipeline cannot honor for frames of `dims`.
    ///
    /// Returns the adjusted snapshot and whether anything changed. A zoom
    /// factor above the short edge would sample an empty window and is
    /// clamped to the short edge.
    pub fn constrain(self, dims: Dimensions) -> (Settings, bool) {
        let max_zoom = u32::try_from(dims.short_edge()).unwrap_or(u32::MAX);
        if self.zoom > max_zoom {
            (
                Settings {
                    zoom: max_zoom,
                    ..self
                },
                true,
            )
        } else {
            (self, false)
        }
    }

    /// Render in the six-line file format.
    pub fn to_file_contents(&self) -> String {
        Field::ALL
            .iter()
            .map(|&f| format!("{}\n", self.get(f)))
            .collect()
    }
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("cannot read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("cannot write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// Parse the settings file at `path` on top of the startup defaults.
///
/// Field errors are reported in the returned [`Reload`], not as an `Err`.
pub fn read_settings(path: &Path, policy: ReloadPolicy) -> Result<Reload, SettingsError> {
    let bytes = std::fs::read(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Settings::default().reload(&String::from_utf8_lossy(&bytes), policy))
}

/// Write `settings` to `path`.
///
/// The file is written next to its destination and renamed into place, so a
/// pipeline polling `path` never reads a half-written file.
pub fn write_settings(path: &Path, settings: &Settings) -> Result<(), SettingsError> {
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, settings.to_file_contents())
        .and_then(|()| std::fs::rename(&tmp, path))
        .map_err(|source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        })
}

/// Parse the leading decimal integer of `text` like C's `%d`.
///
/// Skips leading whitespace, accepts an optional sign, then reads digits up
/// to the first non-digit. Returns `None` when no digit follows, or when the
/// number does not fit an `i64`.
fn parse_leading_int(text: &str) -> Option<i64> {
    let s = text.trim_start();
    let (negative, digits) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let magnitude: i64 = digits[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = "1\n1\n2\n-15\n1\n30\n";

    // =========================================================================
    // parse_leading_int
    // =========================================================================

    #[test]
    fn leading_int_accepts_c_style_input() {
        assert_eq!(parse_leading_int("42"), Some(42));
        assert_eq!(parse_leading_int("  -7\n"), Some(-7));
        assert_eq!(parse_leading_int("+3"), Some(3));
        assert_eq!(parse_leading_int("12abc"), Some(12));
        assert_eq!(parse_leading_int("5 # zoom"), Some(5));
    }

    #[test]
    fn leading_int_rejects_non_numbers() {
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("   "), None);
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int("-"), None);
        assert_eq!(parse_leading_int("- 4"), None);
        assert_eq!(parse_leading_int("99999999999999999999"), None);
    }

    // =========================================================================
    // Field validation
    // =========================================================================

    #[test]
    fn flags_must_be_zero_or_one() {
        assert_eq!(Field::Fir.parse("1"), Ok(1));
        assert_eq!(
            Field::Flip.parse("2"),
            Err(FieldError::OutOfRange {
                field: Field::Flip,
                value: 2,
                expected: "0 or 1"
            })
        );
    }

    #[test]
    fn zoom_must_not_be_negative() {
        assert!(matches!(
            Field::Zoom.parse("-1"),
            Err(FieldError::OutOfRange { field: Field::Zoom, .. })
        ));
        assert_eq!(Field::Zoom.parse("0"), Ok(0));
    }

    #[test]
    fn brightness_and_rotation_accept_any_i32() {
        assert_eq!(Field::Brightness.parse("-300"), Ok(-300));
        assert_eq!(Field::Rotation.parse("7200"), Ok(7200));
        assert!(matches!(
            Field::Rotation.parse("4294967296"),
            Err(FieldError::OutOfRange { .. })
        ));
    }

    #[test]
    fn field_error_messages_name_the_line() {
        let err = Field::Zoom.parse("fast").unwrap_err();
        assert_eq!(err.to_string(), "line 3 (zoom) is not a number: \"fast\"");
        assert_eq!(err.field(), Field::Zoom);
    }

    // =========================================================================
    // Reload
    // =========================================================================

    #[test]
    fn reload_parses_all_six_fields() {
        let reload = Settings::default().reload(FULL, ReloadPolicy::default());
        assert!(reload.errors.is_empty());
        assert!(!reload.rejected);
        assert_eq!(
            reload.settings,
            Settings {
                fir: true,
                median: true,
                zoom: 2,
                brightness: -15,
                flip: true,
                rotation: 30,
            }
        );
    }

    #[test]
    fn non_numeric_zoom_retains_previous_zoom() {
        let previous = Settings {
            zoom: 4,
            ..Settings::default()
        };
        let reload = previous.reload("1\n1\nbig\n10\n1\n90\n", ReloadPolicy::RetainPrevious);

        assert_eq!(reload.settings.zoom, 4);
        assert!(reload.settings.fir);
        assert!(reload.settings.median);
        assert_eq!(reload.settings.brightness, 10);
        assert!(reload.settings.flip);
        assert_eq!(reload.settings.rotation, 90);
        assert_eq!(reload.errors.len(), 1);
        assert_eq!(reload.errors[0].field(), Field::Zoom);
    }

    #[test]
    fn reject_policy_discards_whole_update() {
        let previous = Settings {
            brightness: 3,
            ..Settings::default()
        };
        let reload = previous.reload("1\n1\nbig\n10\n1\n90\n", ReloadPolicy::RejectUpdate);
        assert!(reload.rejected);
        assert_eq!(reload.settings, previous);
    }

    #[test]
    fn default_policy_resets_failing_field() {
        let previous = Settings {
            zoom: 4,
            rotation: 45,
            ..Settings::default()
        };
        let reload = previous.reload("0\n0\nbig\n0\n0\n", ReloadPolicy::UseDefault);
        assert_eq!(reload.settings.zoom, 0);
        // Line 6 is missing and also falls back.
        assert_eq!(reload.settings.rotation, 0);
        assert_eq!(reload.errors.len(), 2);
        assert_eq!(reload.errors[1], FieldError::Missing { field: Field::Rotation });
    }

    #[test]
    fn short_file_retains_missing_fields() {
        let previous = Settings {
            flip: true,
            rotation: 12,
            ..Settings::default()
        };
        let reload = previous.reload("1\n0\n0\n5\n", ReloadPolicy::RetainPrevious);
        assert!(reload.settings.fir);
        assert_eq!(reload.settings.brightness, 5);
        assert!(reload.settings.flip);
        assert_eq!(reload.settings.rotation, 12);
        assert_eq!(reload.errors.len(), 2);
    }

    #[test]
    fn extra_lines_are_ignored() {
        let text = "0\n0\n0\n0\n0\n0\n99\nnoise\n";
        let reload = Settings::default().reload(text, ReloadPolicy::RejectUpdate);
        assert!(reload.errors.is_empty());
        assert_eq!(reload.settings, Settings::default());
    }

    #[test]
    fn crlf_line_endings_are_accepted() {
        let text = "1\r\n0\r\n3\r\n0\r\n0\r\n-90\r\n";
        let reload = Settings::default().reload(text, ReloadPolicy::default());
        assert!(reload.errors.is_empty());
        assert_eq!(reload.settings.zoom, 3);
        assert_eq!(reload.settings.rotation, -90);
    }

    // =========================================================================
    // constrain / file contents
    // =========================================================================

    #[test]
    fn constrain_clamps_zoom_to_short_edge() {
        let settings = Settings {
            zoom: 1000,
            ..Settings::default()
        };
        let (clamped, changed) = settings.constrain(Dimensions::new(320, 240));
        assert!(changed);
        assert_eq!(clamped.zoom, 240);

        let (same, changed) = clamped.constrain(Dimensions::new(320, 240));
        assert!(!changed);
        assert_eq!(same, clamped);
    }

    #[test]
    fn file_contents_parse_back() {
        let settings = Settings {
            fir: true,
            median: false,
            zoom: 3,
            brightness: -40,
            flip: true,
            rotation: 270,
        };
        let text = settings.to_file_contents();
        assert_eq!(text, "1\n0\n3\n-40\n1\n270\n");
        let reload = Settings::default().reload(&text, ReloadPolicy::RejectUpdate);
        assert_eq!(reload.settings, settings);
    }

    #[test]
    fn write_settings_replaces_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("settings.txt");
        std::fs::write(&path, "garbage").unwrap();

        let settings = Settings {
            zoom: 2,
            ..Settings::default()
        };
        write_settings(&path, &settings).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "0\n0\n2\n0\n0\n0\n");
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn read_settings_reports_field_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("settings.txt");
        std::fs::write(&path, "1\n0\nx\n0\n0\n").unwrap();

        let reload = read_settings(&path, ReloadPolicy::RetainPrevious).unwrap();
        assert!(reload.settings.fir);
        assert_eq!(reload.errors.len(), 2);
    }

    #[test]
    fn read_settings_tolerates_non_utf8_bytes() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("settings.txt");
        std::fs::write(&path, b"0\n0\n0\n-15 \xe4\n1\n\xe4\n").unwrap();

        let reload = read_settings(&path, ReloadPolicy::RetainPrevious).unwrap();
        assert_eq!(reload.settings.brightness, -15);
        assert!(reload.settings.flip);
        assert_eq!(reload.errors.len(), 1);
        assert_eq!(reload.errors[0].field(), Field::Rotation);
    }

    #[test]
    fn read_settings_missing_file_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = read_settings(&tmp.path().join("nope.txt"), ReloadPolicy::default()).unwrap_err();
        assert!(matches!(err, SettingsError::Read { .. }));
    }

    #[test]
    fn write_settings_into_missing_directory_fails() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("no/such/dir/settings.txt");
        let err = write_settings(&path, &Settings::default()).unwrap_err();
        assert!(err.to_string().contains("settings.txt"));
    }
}
