//! Shared test utilities for the grayflow test suite.
//!
//! Frame builders for stage tests and settings-file fixtures for the watcher.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let input = gradient_frame(Dimensions::new(8, 6));
//!
//! let tmp = TempDir::new().unwrap();
//! let path = write_settings_file(tmp.path(), "1\n0\n0\n0\n0\n0\n", 1_000);
//! set_mtime(&path, 2_000);
//! ```

use crate::frame::{Dimensions, Frame};
use std::path::{Path, PathBuf};
use std::time::{Duration, UNIX_EPOCH};

// =========================================================================
// Frames
// =========================================================================

/// A frame with every sample set to `value`.
pub fn constant_frame(dims: Dimensions, value: u8) -> Frame {
    Frame::from_fn(dims, |_, _| value)
}

/// A frame whose samples differ from their neighbours in both directions.
///
/// Wraps every 256 samples, so large frames repeat the pattern.
pub fn gradient_frame(dims: Dimensions) -> Frame {
    Frame::from_fn(dims, |r, c| ((r * dims.width + c) * 7 % 256) as u8)
}

// =========================================================================
// Settings files
// =========================================================================

/// Write `dir/settings.txt` with `text` and a fixed modification time.
pub fn write_settings_file(dir: &Path, text: &str, mtime_secs: u64) -> PathBuf {
    let path = dir.join("settings.txt");
    std::fs::write(&path, text).unwrap();
    set_mtime(&path, mtime_secs);
    path
}

/// Pin a file's modification time to `secs` after the Unix epoch.
///
/// Tests control mtimes explicitly so that two writes within the same
/// filesystem timestamp tick are still told apart.
pub fn set_mtime(path: &Path, secs: u64) {
    std::fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(UNIX_EPOCH + Duration::from_secs(secs))
        .unwrap();
}
