//! The frame loop.
//!
//! Reads raw frames, runs them through the [`Pipeline`] under the current
//! settings snapshot, and writes the results. Fully sequential: one frame is
//! read, processed and written before the next is read.
//!
//! ## Per-frame Cycle
//!
//! ```text
//! read frame ──▶ poll settings ──▶ process ×repeat ──▶ write frame
//!   │ short read         │ changed mtime → reparse, log snapshot
//!   ▼                    ▼
//!  end of stream      snapshot replaced wholesale
//! ```
//!
//! The settings are also polled once before the first frame, so a missing
//! settings file fails the run immediately rather than at the first frame.

use crate::config::{ConfigError, RunConfig};
use crate::pipeline::Pipeline;
use crate::settings::Settings;
use crate::stream::{FrameReader, FrameWriter, OutputFormat, StreamError};
use crate::watcher::{FileWatcher, SettingsProvider, WatchError};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Settings error: {0}")]
    Watch(#[from] WatchError),
    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),
    #[error("cannot open input {path}: {source}")]
    OpenInput { path: PathBuf, source: io::Error },
    #[error("cannot open output {path}: {source}")]
    OpenOutput { path: PathBuf, source: io::Error },
}

/// What a finished run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Frames written.
    pub frames: u64,
    /// Settings snapshots taken, including the initial load.
    pub reloads: u64,
    /// Time spent in the pipeline, over all frames and repeats.
    pub processing: Duration,
    /// Wall-clock time of the whole run.
    pub elapsed: Duration,
}

impl RunSummary {
    /// Mean pipeline time per written frame.
    pub fn mean_frame_time(&self) -> Option<Duration> {
        u32::try_from(self.frames)
            .ok()
            .filter(|&n| n > 0)
            .map(|n| self.processing / n)
    }
}

/// Run a stream with the settings file named in `config`.
///
/// `input` and `output` are file paths, or `-` for stdin and stdout.
pub fn run(
    config: &RunConfig,
    input: &Path,
    output: &Path,
    format: OutputFormat,
) -> Result<RunSummary, ProcessError> {
    config.validate()?;
    let dims = config.dims();
    let pipeline = Pipeline::new(config.kernel()?);
    let mut watcher = FileWatcher::new(&config.settings.path, config.settings.policy, dims);

    info!(
        frame = %dims,
        input = %input.display(),
        output = %output.display(),
        settings = %config.settings.path.display(),
        ?format,
        "starting stream"
    );

    let reader = FrameReader::new(open_input(input)?, dims);
    // Opening the sink truncates it; fail on a missing settings file first.
    watcher.modified()?;
    let writer = FrameWriter::new(open_output(output)?, dims, format);
    run_with_provider(
        &pipeline,
        &mut watcher,
        reader,
        writer,
        config.diagnostics.repeat,
    )
}

/// Run a stream with an arbitrary settings source (allows testing without a
/// settings file).
pub fn run_with_provider<R: Read, W: Write>(
    pipeline: &Pipeline,
    provider: &mut impl SettingsProvider,
    mut reader: FrameReader<R>,
    mut writer: FrameWriter<W>,
    repeat: u32,
) -> Result<RunSummary, ProcessError> {
    let started = Instant::now();
    let mut summary = RunSummary::default();
    let mut settings = Settings::default();

    if let Some(initial) = provider.poll()? {
        settings = initial;
        summary.reloads += 1;
    }

    while let Some(frame) = reader.read_frame()? {
        if let Some(next) = provider.poll()? {
            settings = next;
            summary.reloads += 1;
        }

        let t = Instant::now();
        let mut out = pipeline.process(&frame, &settings);
        for _ in 1..repeat {
            out = pipeline.process(&frame, &settings);
        }
        let took = t.elapsed();
        summary.processing += took;
        debug!(
            frame = summary.frames,
            repeat,
            ms = took.as_secs_f64() * 1000.0,
            "frame processed"
        );

        writer.write_frame(&out)?;
        summary.frames += 1;
    }

    writer.finish()?;
    summary.elapsed = started.elapsed();
    info!(
        frames = summary.frames,
        reloads = summary.reloads,
        mean_ms = summary
            .mean_frame_time()
            .map(|d| d.as_secs_f64() * 1000.0)
            .unwrap_or(0.0),
        "stream finished"
    );
    Ok(summary)
}

fn is_stdio(path: &Path) -> bool {
    path == Path::new("-")
}

fn open_input(path: &Path) -> Result<Box<dyn Read>, ProcessError> {
    if is_stdio(path) {
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(path).map_err(|source| ProcessError::OpenInput {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Box::new(BufReader::new(file)))
}

fn open_output(path: &Path) -> Result<Box<dyn Write>, ProcessError> {
    if is_stdio(path) {
        return Ok(Box::new(BufWriter::new(io::stdout().lock())));
    }
    let file = File::create(path).map_err(|source| ProcessError::OpenOutput {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Box::new(BufWriter::new(file)))
}
