//! Encoding frame snapshots for the wire.
//!
//! Every encoding produces exactly one line per frame so senders can stay
//! line-oriented.

use thiserror::Error;

use crate::snapshot::FrameSnapshot;

/// Error types for serialization operations
#[derive(Error, Debug)]
pub enum SerializationError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Binary serialization error: {0}")]
    BinaryError(#[from] bincode::Error),
}

/// Encodes a [`FrameSnapshot`] as a single frame of output
pub trait Serializer: Send + Sync {
    fn encode(&self, snapshot: &FrameSnapshot) -> Result<Vec<u8>, SerializationError>;
}

/// Compact JSON, one object per frame
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn encode(&self, snapshot: &FrameSnapshot) -> Result<Vec<u8>, SerializationError> {
        Ok(serde_json::to_vec(snapshot)?)
    }
}

/// bincode, base64-encoded so a frame never contains a newline
pub struct BinarySerializer;

impl Serializer for BinarySerializer {
    fn encode(&self, snapshot: &FrameSnapshot) -> Result<Vec<u8>, SerializationError> {
        let raw = bincode::serialize(snapshot)?;
        Ok(base64::encode(raw).into_bytes())
    }
}
