//! Shipping frame snapshots out of the simulation.
//!
//! A [`TransportController`] pairs a [`Serializer`] with a [`Sender`] and
//! decides which frames are due by the configured output frequency.

mod sender;
mod serializer;
mod snapshot;

use lifepool_config::{SenderType, SerializerType, TransportConfig};
use log::info;

// Re-export types
pub use self::sender::{FileSender, NullSender, Sender, StdioSender, TransportError};
pub use self::serializer::{BinarySerializer, JsonSerializer, SerializationError, Serializer};
pub use self::snapshot::{AgentState, EnergyPointState, FrameSnapshot};

/// Controller for handling serialization and transport of simulation data
pub struct TransportController {
    serializer: Box<dyn Serializer>,
    sender: Box<dyn Sender>,
    update_frequency: u32,
    current_frame: u64,
    frames_sent: u64,
}

impl TransportController {
    /// Create a new transport controller that sends every frame
    pub fn new(serializer: Box<dyn Serializer>, sender: Box<dyn Sender>) -> Self {
        Self {
            serializer,
            sender,
            update_frequency: 1,
            current_frame: 0,
            frames_sent: 0,
        }
    }

    /// Send only every `frequency`th frame
    pub fn with_update_frequency(mut self, frequency: u32) -> Self {
        self.update_frequency = frequency.max(1);
        self
    }

    /// Create a transport controller from configuration
    pub fn from_config(config: &TransportConfig) -> Result<Self, TransportError> {
        let serializer: Box<dyn Serializer> = match config.serializer {
            SerializerType::Json => Box::new(JsonSerializer),
            SerializerType::Binary => Box::new(BinarySerializer),
        };

        let sender: Box<dyn Sender> = match config.sender {
            SenderType::Stdio => Box::new(StdioSender::new()),
            SenderType::File => match &config.output_path {
                Some(path) => Box::new(FileSender::new(path)?),
                None => {
                    return Err(TransportError::ConfigurationError(
                        "File sender requires an output path".to_string(),
                    ))
                }
            },
            SenderType::Null => Box::new(NullSender),
        };

        info!(
            "Transport: {:?} frames to {:?} every {} frame(s)",
            config.serializer, config.sender, config.output_frequency
        );
        Ok(Self::new(serializer, sender).with_update_frequency(config.output_frequency))
    }

    /// Count one simulation frame. Returns whether this frame should be sent.
    pub fn advance_frame(&mut self) -> bool {
        self.current_frame += 1;
        self.current_frame % self.update_frequency as u64 == 0
    }

    /// Encode and send a snapshot immediately
    pub fn send_frame(&mut self, snapshot: &FrameSnapshot) -> Result<(), TransportError> {
        let frame = self.serializer.encode(snapshot)?;
        self.sender.send(&frame)?;
        self.frames_sent += 1;
        Ok(())
    }

    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }

    /// Flush the sender to ensure data is written
    pub fn flush(&mut self) -> Result<(), TransportError> {
        self.sender.flush()
    }
}
