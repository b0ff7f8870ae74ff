//! Destinations for serialized frames.
//!
//! Every sender is line-oriented: each `send` writes one frame followed by a
//! newline.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::info;
use thiserror::Error;

use crate::serializer::SerializationError;

/// Error types that can occur during data transport (sending).
#[derive(Error, Debug)]
pub enum TransportError {
    /// An I/O error occurred (e.g., writing to a file).
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    /// An error occurred during serialization before sending.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] SerializationError),
    /// An error occurred due to invalid transport configuration.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// Base trait for sending serialized data.
pub trait Sender: Send {
    /// Sends the provided byte slice to the destination.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the send operation fails.
    fn send(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Flushes any internal buffers to ensure data is written.
    fn flush(&mut self) -> Result<(), TransportError>;
}

/// Sends data to standard output, one frame per line
pub struct StdioSender {
    stdout: io::Stdout,
}

impl StdioSender {
    pub fn new() -> Self {
        StdioSender { stdout: io::stdout() }
    }
}

impl Default for StdioSender {
    fn default() -> Self {
        Self::new()
    }
}

impl Sender for StdioSender {
    fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        let mut out = self.stdout.lock();
        out.write_all(data)?;
        out.write_all(b"\n")?;
        out.flush()?; // Keep consumers of the pipe in step with the simulation
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        self.stdout.flush()?;
        Ok(())
    }
}

/// Sender implementation that writes data to a file.
///
/// The file is created (or truncated) on construction and each frame is
/// appended followed by a newline.
pub struct FileSender {
    writer: BufWriter<File>,
}

impl FileSender {
    /// # Errors
    ///
    /// Returns `TransportError::IoError` if the file cannot be created.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, TransportError> {
        let path = path.as_ref();
        let file = File::create(path)?;
        info!("Initialized FileSender for path: {}", path.display());
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl Sender for FileSender {
    fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.writer.write_all(data)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Discards everything; used when no output is configured
#[derive(Debug, Default)]
pub struct NullSender;

impl Sender for NullSender {
    fn send(&mut self, _data: &[u8]) -> Result<(), TransportError> {
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}
