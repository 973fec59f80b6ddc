use std::sync::Arc;

use super::Direction;
use crate::bytes;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("MIDI initialization failed")]
    Init(#[from] midir::InitError),

    #[error("Couldn't retrieve a MIDI port name")]
    PortInfoError(#[from] midir::PortInfoError),

    #[error("No MIDI {direction} named {name}")]
    PortNotFound { name: Arc<str>, direction: Direction },

    #[error("Couldn't connect MIDI {direction} {name}, is it in use by another client?")]
    PortConnection { name: Arc<str>, direction: Direction },

    #[error("MIDI port not connected")]
    NotConnected,

    #[error("Invalid normalized float: {}", .0)]
    InvalidNormalizedFloat(f64),

    #[error("Couldn't send MIDI msg {msg}: {source}")]
    Send {
        msg: bytes::Displayable<'static>,
        source: midir::SendError,
    },
}

impl Error {
    pub fn direction(&self) -> Option<Direction> {
        match self {
            Error::PortNotFound { direction, .. } | Error::PortConnection { direction, .. } => {
                Some(*direction)
            }
            _ => None,
        }
    }

    pub fn is_in_use(&self) -> bool {
        matches!(self, Error::PortConnection { .. })
    }
}
