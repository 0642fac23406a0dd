//! # grayflow
//!
//! A transform pipeline for streams of 8-bit grayscale frames, reconfigurable
//! while it runs. Raw frames come in, pass through six fixed stages, and go
//! out as a stream of binary PGM images. A small settings file switches stages
//! on and off and tunes them; edits are picked up on the next frame.
//!
//! # Architecture: One Frame at a Time
//!
//! ```text
//!                     settings.txt ──(mtime poll)──┐
//!                                                  ▼
//! raw frames ─▶ FrameReader ─▶ Pipeline::process(frame, snapshot) ─▶ FrameWriter ─▶ PGM
//!                               FIR → median → zoom → brightness → flip → rotation
//! ```
//!
//! Reading, processing and writing are strictly sequential on one thread. The
//! settings snapshot is read once at the start of each frame and replaced
//! wholesale when the file changes, so a frame never sees half an update.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`frame`] | The `Frame` type: a W×H row-major grid of `u8` samples |
//! | [`imaging`] | Pure per-stage transforms, kernel registry, image import |
//! | [`pipeline`] | Fixed stage order and per-stage bypass rules |
//! | [`settings`] | The six runtime parameters, their file format and validation |
//! | [`watcher`] | `SettingsProvider` trait and the mtime-polling file watcher |
//! | [`stream`] | Raw frame reader, PGM/raw frame writer |
//! | [`process`] | The frame loop, timing and run summary |
//! | [`config`] | `grayflow.toml` loading and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Borrow In, Allocate Out
//!
//! Every stage takes `&Frame` and returns a new `Frame` of the same size.
//! Stages never alias their input, which is what lets the FIR and median
//! filters read unfiltered neighbours while writing the output, and lets the
//! pipeline skip a bypassed stage without copying.
//!
//! ## Polling, Not Notification
//!
//! The settings file is checked by modification time once per frame. At
//! typical frame rates this is a few dozen `stat` calls a second, needs no
//! platform-specific watcher, and ties the reload point to a frame boundary
//! for free. [`watcher::SettingsProvider`] keeps the loop independent of where
//! settings come from.
//!
//! ## Bad Lines Degrade, Not Abort
//!
//! A settings line that fails to parse never stops the stream. What happens to
//! that field is chosen by [`settings::ReloadPolicy`]; the default keeps its
//! previous value and updates the rest.
//!
//! ## Copy-Through Borders
//!
//! Window filters cannot compute pixels whose window leaves the frame. Those
//! pixels are copied from the stage input rather than left black, so enabling
//! a filter never draws a frame around the picture.

pub mod config;
pub mod frame;
pub mod imaging;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod settings;
pub mod stream;
pub mod watcher;

#[cfg(test)]
pub(crate) mod test_helpers;
