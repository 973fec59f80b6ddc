use super::data::ButtonKind;

/// Controls reporting press & release.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pressable {
    RotaryEncoder,
    Button(ButtonKind),
    FaderTouch,
}

/// An event decoded from a device message.
///
/// `track` is the offset of the message identifier in its address block.
/// It is validated when the event is dispatched to the tracks.
/// `R` is the rotation as decoded by the active encoder mode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DeviceEvent<R> {
    Pressed {
        control: Pressable,
        track: u8,
        is_pressed: bool,
    },
    FaderMoved {
        track: u8,
        position: f64,
    },
    Rotated {
        track: u8,
        rotation: R,
    },
}

impl<R> DeviceEvent<R> {
    pub fn track(&self) -> u8 {
        match self {
            DeviceEvent::Pressed { track, .. }
            | DeviceEvent::FaderMoved { track, .. }
            | DeviceEvent::Rotated { track, .. } => *track,
        }
    }
}
