//! Hot reload of runtime settings.
//!
//! The pipeline pulls settings through the [`SettingsProvider`] trait once per
//! frame. The production provider is [`FileWatcher`], which polls the settings
//! file's modification time and reparses only when it changes:
//!
//! ```text
//!            mtime unchanged
//!           ┌──────────────┐
//!           ▼              │
//!       ┌────────┐  poll   │        ┌───────────┐
//!  ────▶│ Stable │─────────┴───────▶│ Reloading │
//!       └────────┘  mtime changed   └─────┬─────┘
//!           ▲                             │ parse six lines,
//!           └─────────────────────────────┘ record new mtime
//! ```
//!
//! The new mtime is recorded even when some fields fail validation, so a bad
//! file is parsed once, not on every frame, until it is written again.

use crate::frame::Dimensions;
use crate::settings::{ReloadPolicy, Settings};
use std::path::PathBuf;
use std::time::SystemTime;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("cannot stat settings file {path}: {source}")]
    Stat {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Source of runtime settings, polled once per frame.
pub trait SettingsProvider {
    /// Returns a new snapshot when the backing store changed since the last
    /// poll, `None` when it did not.
    fn poll(&mut self) -> Result<Option<Settings>, WatchError>;
}

/// Where the watcher is in its poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Stable,
    Reloading,
}

/// Polls a settings file by modification time.
#[derive(Debug)]
pub struct FileWatcher {
    path: PathBuf,
    policy: ReloadPolicy,
    dims: Dimensions,
    current: Settings,
    last_modified: Option<SystemTime>,
    state: WatchState,
    reloads: u64,
}

impl FileWatcher {
    /// Watch `path`, starting from the default (all-disabled) snapshot.
    ///
    /// `dims` are the frame dimensions, used to clamp values the pipeline
    /// cannot honor.
    pub fn new(path: impl Into<PathBuf>, policy: ReloadPolicy, dims: Dimensions) -> Self {
        Self {
            path: path.into(),
            policy,
            dims,
            current: Settings::default(),
            last_modified: None,
            state: WatchState::Stable,
            reloads: 0,
        }
    }

    /// The snapshot most recently handed out.
    pub fn current(&self) -> Settings {
        self.current
    }

    pub fn state(&self) -> WatchState {
        self.state
    }

    /// Number of times the file has been reparsed.
    pub fn reloads(&self) -> u64 {
        self.reloads
    }

    /// Modification time of the settings file; fails when it cannot be stat'ed.
    pub fn modified(&self) -> Result<SystemTime, WatchError> {
        std::fs::metadata(&self.path)
            .and_then(|m| m.modified())
            .map_err(|source| WatchError::Stat {
                path: self.path.clone(),
                source,
            })
    }

    fn reload(&mut self, modified: SystemTime) -> Result<Settings, WatchError> {
        let bytes = std::fs::read(&self.path).map_err(|source| WatchError::Read {
            path: self.path.clone(),
            source,
        })?;
        self.state = WatchState::Reloading;

        // Stray non-UTF-8 bytes only spoil the line they sit on.
        let text = String::from_utf8_lossy(&bytes);
        let reload = self.current.reload(&text, self.policy);
        for err in &reload.errors {
            warn!(path = %self.path.display(), field = %err.field(), "settings: {err}");
        }
        if reload.rejected {
            warn!(
                path = %self.path.display(),
                errors = reload.errors.len(),
                "settings update rejected, keeping previous values"
            );
        }

        let (settings, clamped) = reload.settings.constrain(self.dims);
        if clamped {
            warn!(
                requested = reload.settings.zoom,
                applied = settings.zoom,
                "zoom factor exceeds frame size, clamped"
            );
        }

        self.current = settings;
        self.last_modified = Some(modified);
        self.reloads += 1;
        self.state = WatchState::Stable;

        info!(
            fir = settings.fir,
            median = settings.median,
            zoom = settings.zoom,
            brightness = settings.brightness,
            flip = settings.flip,
            rotation = settings.rotation,
            "settings loaded"
        );
        Ok(settings)
    }
}

impl SettingsProvider for FileWatcher {
    fn poll(&mut self) -> Result<Option<Settings>, WatchError> {
        let modified = self.modified()?;
        if self.last_modified == Some(modified) {
            return Ok(None);
        }
        debug!(path = %self.path.display(), "settings file changed");
        self.reload(modified).map(Some)
    }
}

/// A provider that never changes, for runs without a settings file.
#[derive(Debug, Clone, Default)]
pub struct FixedSettings {
    settings: Settings,
    delivered: bool,
}

impl FixedSettings {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            delivered: false,
        }
    }
}

impl SettingsProvider for FixedSettings {
    fn poll(&mut self) -> Result<Option<Settings>, WatchError> {
        if self.delivered {
            return Ok(None);
        }
        self.delivered = true;
        Ok(Some(self.settings))
    }
}
