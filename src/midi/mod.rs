mod error;
pub use error::Error;

mod io;

#[cfg(test)]
pub(crate) mod mock;

pub mod msg;
pub use msg::Msg;

pub mod port;
pub use port::{Direction, InOutPorts};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Tag(u8);

impl Tag {
    pub const fn from(byte: u8) -> Self {
        Self(byte & 0xf0)
    }

    /// Extracts the tag from a status byte.
    ///
    /// System messages (`0xf0..=0xff`) keep their full status byte
    /// since their low nibble is not a channel.
    pub const fn from_status(byte: u8) -> Self {
        if byte >= 0xf0 {
            Self(byte)
        } else {
            Self(byte & 0xf0)
        }
    }
}

impl From<Tag> for u8 {
    fn from(tag: Tag) -> u8 {
        tag.0
    }
}

impl PartialEq<u8> for Tag {
    fn eq(&self, byte: &u8) -> bool {
        self.0 == *byte
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Channel(u8);

impl Channel {
    pub const fn from(byte: u8) -> Self {
        Self(byte & 0x0f)
    }
}

impl From<Channel> for u8 {
    fn from(chan: Channel) -> u8 {
        chan.0
    }
}

impl std::ops::BitOr<Channel> for Tag {
    type Output = u8;

    fn bitor(self, chan: Channel) -> Self::Output {
        self.0 | chan.0
    }
}

pub mod note_off {
    use super::Tag;
    pub const TAG: Tag = Tag::from(0x80);
}

pub mod note_on {
    use super::Tag;
    pub const TAG: Tag = Tag::from(0x90);
}

pub mod control_change {
    use super::Tag;
    pub const TAG: Tag = Tag::from(0xb0);
}

pub mod sysex {
    use super::Tag;
    pub const TAG: Tag = Tag::from_status(0xf0);
    pub const END_TAG: Tag = Tag::from_status(0xf7);
}

/// 7-bit data bytes.
pub mod u7 {
    pub const MAX: u8 = 0x7f;
}

/// Normalized `f64` values carried by a single 7-bit data byte.
pub mod normalized_f64 {
    use super::{u7, Error};

    pub const QUANTUM: f64 = 1f64 / u7::MAX as f64;

    #[inline]
    pub fn from_u7(val: u8) -> f64 {
        (val & u7::MAX) as f64 * QUANTUM
    }

    #[inline]
    pub fn to_u7(val: f64) -> Result<u8, Error> {
        if !(0f64..=1f64).contains(&val) {
            return Err(Error::InvalidNormalizedFloat(val));
        }

        Ok((val * u7::MAX as f64).round() as u8)
    }
}

/// Raw inbound messages handler.
///
/// Called from the transport's listening thread for each message received.
pub type InboundHandler = Box<dyn FnMut(&[u8]) + Send + 'static>;

/// A bidirectional MIDI link to a device identified by its port name.
pub trait Transport: Send + Sync + 'static {
    /// Resolves both the in & out ports named `port_name`,
    /// then starts listening before preparing for sending.
    ///
    /// Fails with [`Error::PortNotFound`] if either port is absent
    /// and with [`Error::PortConnection`] if a port couldn't be claimed.
    fn open(&self, port_name: &str, handler: InboundHandler) -> Result<(), Error>;

    fn send(&self, msg: &Msg) -> Result<(), Error>;

    /// Detaches the inbound handler and releases both ports.
    fn close(&self);
}
