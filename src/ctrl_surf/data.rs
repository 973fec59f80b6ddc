use std::fmt;

use super::Error;

pub const TRACK_COUNT: usize = 8;

/// Index of a track on the device, in `[0, TRACK_COUNT)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TrackId(pub(super) u8);

impl TrackId {
    pub fn new(idx: usize) -> Result<Self, Error> {
        if idx < TRACK_COUNT {
            Ok(Self(idx as u8))
        } else {
            Err(Error::TrackOutOfRange(idx as i64))
        }
    }

    pub fn idx(self) -> usize {
        self.0 as usize
    }

    pub fn all() -> impl Iterator<Item = TrackId> {
        (0..TRACK_COUNT as u8).map(TrackId)
    }

    /// Offset of the track in an address block of `TRACK_COUNT` identifiers.
    pub(crate) fn offset(self) -> u8 {
        self.0
    }
}

impl TryFrom<usize> for TrackId {
    type Error = Error;

    fn try_from(idx: usize) -> Result<Self, Error> {
        TrackId::new(idx)
    }
}

impl TryFrom<i64> for TrackId {
    type Error = Error;

    fn try_from(idx: i64) -> Result<Self, Error> {
        usize::try_from(idx)
            .ok()
            .and_then(|idx| TrackId::new(idx).ok())
            .ok_or(Error::TrackOutOfRange(idx))
    }
}

impl TryFrom<i32> for TrackId {
    type Error = Error;

    fn try_from(idx: i32) -> Result<Self, Error> {
        TrackId::try_from(idx as i64)
    }
}

/// A value addressing a track, checked when the track is looked up.
pub trait TrackIndex {
    fn track_id(self) -> Result<TrackId, Error>;
}

impl TrackIndex for TrackId {
    fn track_id(self) -> Result<TrackId, Error> {
        Ok(self)
    }
}

impl TrackIndex for usize {
    fn track_id(self) -> Result<TrackId, Error> {
        TrackId::new(self)
    }
}

impl TrackIndex for i64 {
    fn track_id(self) -> Result<TrackId, Error> {
        TrackId::try_from(self)
    }
}

impl TrackIndex for i32 {
    fn track_id(self) -> Result<TrackId, Error> {
        TrackId::try_from(self)
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Track {}", self.0 + 1)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ButtonKind {
    Record,
    Solo,
    Mute,
    Select,
}

impl ButtonKind {
    pub const ALL: [ButtonKind; 4] = [
        ButtonKind::Record,
        ButtonKind::Solo,
        ButtonKind::Mute,
        ButtonKind::Select,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ButtonKind::Record => "Record",
            ButtonKind::Solo => "Solo",
            ButtonKind::Mute => "Mute",
            ButtonKind::Select => "Select",
        }
    }
}

impl fmt::Display for ButtonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum IlluminationState {
    #[default]
    Off,
    On,
    Blinking,
}

/// Direction of a relative rotary encoder detent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Clockwise,
    Counterclockwise,
}

impl Direction {
    pub fn is_clockwise(self) -> bool {
        matches!(self, Direction::Clockwise)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextColor {
    #[default]
    Light,
    Dark,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BackgroundColor {
    #[default]
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_id_bounds() {
        assert_eq!(TrackId::new(0).unwrap().idx(), 0);
        assert_eq!(TrackId::new(7).unwrap().idx(), 7);
        assert!(matches!(TrackId::new(8), Err(Error::TrackOutOfRange(8))));

        assert!(matches!(
            TrackId::try_from(-1i32),
            Err(Error::TrackOutOfRange(-1))
        ));
        assert!(matches!(
            TrackId::try_from(8i64),
            Err(Error::TrackOutOfRange(8))
        ));
        assert_eq!(TrackId::try_from(3i32).unwrap().idx(), 3);

        assert_eq!(TrackId::all().count(), TRACK_COUNT);
    }
}
