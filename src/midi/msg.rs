use super::{control_change, note_off, note_on, sysex, Channel, Tag};
use crate::bytes;

/// A complete raw MIDI message.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Msg(Box<[u8]>);

impl Msg {
    pub fn inner(&self) -> &[u8] {
        self.0.as_ref()
    }

    pub fn display(&self) -> bytes::Displayable<'_> {
        bytes::Displayable::from(self.0.as_ref())
    }

    pub fn note_on(chan: Channel, note: u8, velocity: u8) -> Self {
        [note_on::TAG | chan, note & 0x7f, velocity & 0x7f].into()
    }

    pub fn control_change(chan: Channel, control: u8, value: u8) -> Self {
        [control_change::TAG | chan, control & 0x7f, value & 0x7f].into()
    }

    /// Frames `data` between the SysEx start & end tags.
    pub fn new_sysex(data: &[u8]) -> Self {
        let mut buf = Vec::with_capacity(data.len() + 2);

        buf.push(sysex::TAG.into());
        buf.extend(data);
        buf.push(sysex::END_TAG.into());

        Self(buf.into())
    }
}

impl<const S: usize> From<[u8; S]> for Msg {
    fn from(buf: [u8; S]) -> Self {
        Self(buf.into())
    }
}

impl std::ops::Deref for Msg {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

/// Channel voice messages handled by control surfaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelVoice {
    NoteOn { chan: Channel, note: u8, velocity: u8 },
    NoteOff { chan: Channel, note: u8, velocity: u8 },
    ControlChange { chan: Channel, control: u8, value: u8 },
}

impl ChannelVoice {
    /// Parses the channel voice messages of interest.
    ///
    /// Returns `None` for other kinds of messages, including SysEx,
    /// and for truncated buffers.
    pub fn parse(buf: &[u8]) -> Option<Self> {
        let (&status, data) = buf.split_first()?;
        let (first, second) = match data {
            [first, second, ..] => (*first, *second),
            _ => return None,
        };

        let chan = Channel::from(status);
        let msg = match Tag::from_status(status) {
            note_on::TAG => ChannelVoice::NoteOn {
                chan,
                note: first,
                velocity: second,
            },
            note_off::TAG => ChannelVoice::NoteOff {
                chan,
                note: first,
                velocity: second,
            },
            control_change::TAG => ChannelVoice::ControlChange {
                chan,
                control: first,
                value: second,
            },
            _ => return None,
        };

        Some(msg)
    }
}
