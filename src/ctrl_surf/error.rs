use std::sync::Arc;

use super::Lifecycle;
use crate::midi;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Control surface can't be opened: it is {}", .0)]
    Lifecycle(Lifecycle),

    #[error("Control surface {port} not found ({direction}): {cause}")]
    DeviceNotFound {
        port: Arc<str>,
        direction: midi::Direction,
        #[source]
        cause: midi::Error,
    },

    #[error("Track id {} out of range [0, {}]", .0, super::TRACK_COUNT - 1)]
    TrackOutOfRange(i64),

    #[error("{name} value {value} out of range [0.0, 1.0]")]
    ValueOutOfRange { name: &'static str, value: f64 },

    #[error("MIDI transport error: {}", .0)]
    Transport(#[from] midi::Error),

    #[error("Couldn't install interrupt handler")]
    Interrupt(#[from] ctrlc::Error),
}

impl Error {
    /// Whether the device is present but already claimed by another client.
    pub fn is_in_use(&self) -> bool {
        matches!(self, Error::DeviceNotFound { cause, .. } if cause.is_in_use())
    }

    pub(crate) fn from_open(port: Arc<str>, cause: midi::Error) -> Self {
        match cause.direction() {
            Some(direction) => Error::DeviceNotFound {
                port,
                direction,
                cause,
            },
            None => Error::Transport(cause),
        }
    }
}
