//! Frame input and output streams.
//!
//! ## Input
//!
//! Headerless raw frames, `W·H` bytes each, back to back. A short or empty
//! read marks the end of the stream; a partial trailing frame is dropped.
//!
//! ## Output
//!
//! | Format | Per frame |
//! |---|---|
//! | `pgm` | `P5\n<W> <H>\n255\n` followed by `W·H` bytes |
//! | `raw` | `W·H` bytes, for raw-video players |
//!
//! A `pgm` stream is a concatenation of minimal binary PGM images; consumers
//! split it on the headers.

use crate::frame::{Dimensions, Frame, FrameError};
use serde::{Deserialize, Serialize};
use std::io::{self, ErrorKind, Read, Write};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum StreamError {
    #[error("failed to read frame {index}: {source}")]
    Read { index: u64, source: io::Error },
    #[error("failed to write frame {index}: {source}")]
    Write { index: u64, source: io::Error },
    #[error("frame is {actual}, stream is {expected}")]
    DimensionMismatch {
        expected: Dimensions,
        actual: Dimensions,
    },
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),
}

/// Output framing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// One binary PGM image per frame.
    #[default]
    Pgm,
    /// Bare samples, no header.
    Raw,
}

/// Reads fixed-size raw frames.
pub struct FrameReader<R> {
    inner: R,
    dims: Dimensions,
    frames_read: u64,
}

impl<R: Read> FrameReader<R> {
    pub fn new(inner: R, dims: Dimensions) -> Self {
        Self {
            inner,
            dims,
            frames_read: 0,
        }
    }

    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// Read the next frame, or `None` at end of stream.
    pub fn read_frame(&mut self) -> Result<Option<Frame>, StreamError> {
        let mut buf = vec![0u8; self.dims.sample_count()];
        let filled = read_full(&mut self.inner, &mut buf).map_err(|source| StreamError::Read {
            index: self.frames_read,
            source,
        })?;
        if filled < buf.len() {
            debug!(
                frames = self.frames_read,
                trailing_bytes = filled,
                "no more data in input stream"
            );
            return Ok(None);
        }
        self.frames_read += 1;
        Ok(Some(Frame::from_vec(self.dims, buf)?))
    }
}

impl<R: Read> Iterator for FrameReader<R> {
    type Item = Result<Frame, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_frame().transpose()
    }
}

/// Fill `buf` as far as the reader allows; returns the number of bytes read.
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Writes processed frames in the configured [`OutputFormat`].
pub struct FrameWriter<W: Write> {
    inner: W,
    dims: Dimensions,
    format: OutputFormat,
    header: Vec<u8>,
    frames_written: u64,
}

impl<W: Write> FrameWriter<W> {
    pub fn new(inner: W, dims: Dimensions, format: OutputFormat) -> Self {
        Self {
            inner,
            dims,
            format,
            header: pgm_header(dims).into_bytes(),
            frames_written: 0,
        }
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    pub fn write_frame(&mut self, frame: &Frame) -> Result<(), StreamError> {
        if frame.dimensions() != self.dims {
            return Err(StreamError::DimensionMismatch {
                expected: self.dims,
                actual: frame.dimensions(),
            });
        }
        let index = self.frames_written;
        let wrap = |source| StreamError::Write { index, source };
        if self.format == OutputFormat::Pgm {
            self.inner.write_all(&self.header).map_err(wrap)?;
        }
        self.inner.write_all(frame.as_bytes()).map_err(wrap)?;
        self.frames_written += 1;
        Ok(())
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(mut self) -> Result<W, StreamError> {
        self.inner.flush().map_err(|source| StreamError::Write {
            index: self.frames_written,
            source,
        })?;
        Ok(self.inner)
    }
}

/// The binary PGM header for one frame.
pub fn pgm_header(dims: Dimensions) -> String {
    format!("P5\n{} {}\n255\n", dims.width, dims.height)
}
