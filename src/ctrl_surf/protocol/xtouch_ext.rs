//! Wire protocol of the X-Touch Extender in MIDI Controller modes
//! (`Ctrl` & `CtrlRel`).
//!
//! Each class of control uses a block of `TRACK_COUNT` consecutive
//! identifiers, the offset in the block being the track.

use crate::{
    ctrl_surf::{
        data::{
            BackgroundColor, ButtonKind, Direction, IlluminationState, TextColor, TrackId,
            TRACK_COUNT,
        },
        event::{DeviceEvent, Pressable},
    },
    midi::{self, msg::ChannelVoice, normalized_f64, Channel, Msg},
};

/// SysEx device id of the X-Touch Extender.
///
/// Not `0x42` as documented by the manufacturer.
pub const DEVICE_ID: u8 = 0x15;

pub const ENCODER_LIGHT_COUNT: usize = 13;
pub const VU_METER_LIGHT_COUNT: usize = 8;

/// Outbound channel voice messages use the first MIDI channel.
const CHAN: Channel = Channel::from(0);

mod note {
    pub const ENCODER_PRESS: u8 = 0x00;
    pub const RECORD: u8 = 0x08;
    pub const SOLO: u8 = 0x10;
    pub const MUTE: u8 = 0x18;
    pub const SELECT: u8 = 0x20;
    pub const FADER_TOUCH: u8 = 0x6e;

    pub const PRESSED: u8 = 127;
    pub const RELEASED: u8 = 0;

    pub const OFF: u8 = 0;
    pub const ON: u8 = 127;
    pub const BLINKING: u8 = 64;
}

mod control {
    pub const FADER: u8 = 70;
    pub const ENCODER: u8 = 80;
    pub const VU_METER: u8 = 90;
}

mod relative {
    pub const COUNTERCLOCKWISE: u8 = 1;
    pub const CLOCKWISE: u8 = 65;
}

mod scribble_strip {
    pub const MANUFACTURER_ID: [u8; 3] = [0x00, 0x20, 0x32];
    pub const SET_STRIP: u8 = 0x4c;
    pub const TEXT_LEN: usize = 7;
}

bitflags::bitflags! {
    struct TextFlags: u8 {
        const TOP_DARK    = 0b0001_0000;
        const BOTTOM_DARK = 0b0010_0000;
    }
}

const PRESSABLE_BLOCKS: [(u8, Pressable); 6] = [
    (note::ENCODER_PRESS, Pressable::RotaryEncoder),
    (note::RECORD, Pressable::Button(ButtonKind::Record)),
    (note::SOLO, Pressable::Button(ButtonKind::Solo)),
    (note::MUTE, Pressable::Button(ButtonKind::Mute)),
    (note::SELECT, Pressable::Button(ButtonKind::Select)),
    (note::FADER_TOUCH, Pressable::FaderTouch),
];

fn block_offset(id: u8, base: u8) -> Option<u8> {
    id.checked_sub(base)
        .filter(|offset| (*offset as usize) < TRACK_COUNT)
}

/// Decodes a device message.
///
/// Returns `None` for messages which are not part of the modeled controls.
/// Note-on velocities other than pressed & released are ignored.
pub fn decode<R>(buf: &[u8], decode_rotation: impl Fn(u8) -> Option<R>) -> Option<DeviceEvent<R>> {
    match ChannelVoice::parse(buf)? {
        ChannelVoice::NoteOn { note, velocity, .. } => {
            let is_pressed = match velocity {
                note::PRESSED => true,
                note::RELEASED => false,
                _ => return None,
            };
            decode_press(note, is_pressed)
        }
        ChannelVoice::NoteOff { note, .. } => decode_press(note, false),
        ChannelVoice::ControlChange { control, value, .. } => {
            if let Some(track) = block_offset(control, control::FADER) {
                Some(DeviceEvent::FaderMoved {
                    track,
                    position: normalized_f64::from_u7(value),
                })
            } else if let Some(track) = block_offset(control, control::ENCODER) {
                Some(DeviceEvent::Rotated {
                    track,
                    rotation: decode_rotation(value)?,
                })
            } else {
                None
            }
        }
    }
}

fn decode_press<R>(note: u8, is_pressed: bool) -> Option<DeviceEvent<R>> {
    PRESSABLE_BLOCKS.iter().find_map(|(base, control)| {
        block_offset(note, *base).map(|track| DeviceEvent::Pressed {
            control: *control,
            track,
            is_pressed,
        })
    })
}

/// Rotation in `CtrlRel` mode: one message per detent.
pub fn decode_relative(value: u8) -> Option<Direction> {
    match value {
        relative::CLOCKWISE => Some(Direction::Clockwise),
        relative::COUNTERCLOCKWISE => Some(Direction::Counterclockwise),
        _ => None,
    }
}

/// Rotation in `Ctrl` mode: the knob position in `[0, 1]`.
pub fn decode_absolute(value: u8) -> Option<f64> {
    Some(normalized_f64::from_u7(value))
}

pub fn illumination(kind: ButtonKind, track: TrackId, state: IlluminationState) -> Msg {
    let base = match kind {
        ButtonKind::Record => note::RECORD,
        ButtonKind::Solo => note::SOLO,
        ButtonKind::Mute => note::MUTE,
        ButtonKind::Select => note::SELECT,
    };

    let velocity = match state {
        IlluminationState::Off => note::OFF,
        IlluminationState::On => note::ON,
        IlluminationState::Blinking => note::BLINKING,
    };

    Msg::note_on(CHAN, base + track.offset(), velocity)
}

pub fn fader_position(track: TrackId, position: f64) -> Result<Msg, midi::Error> {
    let value = normalized_f64::to_u7(position)?;
    let msg = Msg::control_change(CHAN, control::FADER + track.offset(), value);

    Ok(msg)
}

pub fn encoder_lights(track: TrackId, light_position: usize) -> Msg {
    let value = light_value(light_position, ENCODER_LIGHT_COUNT - 1);
    Msg::control_change(CHAN, control::ENCODER + track.offset(), value)
}

pub fn vu_meter(track: TrackId, light_position: usize) -> Msg {
    let value = light_value(light_position, VU_METER_LIGHT_COUNT);
    Msg::control_change(CHAN, control::VU_METER + track.offset(), value)
}

/// Scales a light index clamped to `[0, max]` to a 7-bit value.
fn light_value(light_position: usize, max: usize) -> u8 {
    let light_position = light_position.min(max);
    (light_position as f64 * midi::u7::MAX as f64 / max as f64).round() as u8
}

/// Content of a scribble strip.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StripContent<'a> {
    pub top_text: &'a str,
    pub bottom_text: &'a str,
    pub top_text_color: TextColor,
    pub bottom_text_color: TextColor,
    pub background_color: BackgroundColor,
}

pub fn scribble_strip(track: TrackId, content: &StripContent<'_>) -> Msg {
    use scribble_strip::*;

    let mut payload = [0u8; 3 + 4 + 2 * TEXT_LEN];

    payload[..3].copy_from_slice(&MANUFACTURER_ID);
    payload[3] = DEVICE_ID;
    payload[4] = SET_STRIP;
    payload[5] = track.offset();
    payload[6] = color_byte(content);
    payload[7..7 + TEXT_LEN].copy_from_slice(&text_field(content.top_text));
    payload[7 + TEXT_LEN..].copy_from_slice(&text_field(content.bottom_text));

    Msg::new_sysex(&payload)
}

fn color_byte(content: &StripContent<'_>) -> u8 {
    let background = match content.background_color {
        BackgroundColor::Black => 0,
        BackgroundColor::Red => 1,
        BackgroundColor::Green => 2,
        BackgroundColor::Yellow => 3,
        BackgroundColor::Blue => 4,
        BackgroundColor::Magenta => 5,
        BackgroundColor::Cyan => 6,
        BackgroundColor::White => 7,
    };

    let top_dark = content.top_text_color == TextColor::Dark;
    let bottom_dark = content.bottom_text_color == TextColor::Dark;

    let mut flags = TextFlags::empty();
    flags.set(TextFlags::TOP_DARK, top_dark);
    flags.set(TextFlags::BOTTOM_DARK, bottom_dark);

    background | flags.bits()
}

/// Truncates or space-pads `text` to exactly `TEXT_LEN` ASCII bytes.
///
/// Non-ASCII chars are replaced with `?`.
pub fn text_field(text: &str) -> [u8; scribble_strip::TEXT_LEN] {
    let mut field = [b' '; scribble_strip::TEXT_LEN];

    for (byte, c) in field.iter_mut().zip(text.chars()) {
        *byte = if c.is_ascii() { c as u8 } else { b'?' };
    }

    field
}
