//! Byte-stream status transport.
//!
//! Writes each status line to any [`Write`] (serial device file, stdout,
//! a buffer in tests) and flushes it so the line leaves immediately.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use crate::app::ports::StatusTransport;
use crate::error::TransportError;

pub struct StreamTransport<W> {
    writer: W,
}

impl<W: Write> StreamTransport<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl StreamTransport<Box<dyn Write + Send>> {
    /// Open `path` for appending, or use stdout when `None`.
    pub fn open(path: Option<&Path>) -> io::Result<Self> {
        let writer: Box<dyn Write + Send> = match path {
            Some(p) => Box::new(OpenOptions::new().append(true).create(true).open(p)?),
            None => Box::new(io::stdout()),
        };
        Ok(Self::new(writer))
    }
}

impl<W: Write> StatusTransport for StreamTransport<W> {
    fn send(&mut self, line: &str) -> Result<(), TransportError> {
        self.writer
            .write_all(line.as_bytes())
            .map_err(|_| TransportError::WriteFailed)?;
        self.writer.flush().map_err(|_| TransportError::FlushFailed)
    }
}
