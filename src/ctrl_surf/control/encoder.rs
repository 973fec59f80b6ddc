use parking_lot::Mutex;
use std::sync::Arc;

use super::{sealed::DeviceInput, Output, RotaryEncoder};
use crate::ctrl_surf::{
    data::{Direction, TrackId},
    protocol::{xtouch_ext as protocol, ENCODER_LIGHT_COUNT},
    Error, Observable,
};

/// Knob state shared by both encoder modes.
struct Knob {
    track: TrackId,
    is_pressed: Observable<bool>,
    light_position: Observable<usize>,
    output: Arc<Output>,
    write_lock: Mutex<()>,
}

impl Knob {
    fn new(track: TrackId, output: Arc<Output>) -> Self {
        Self {
            track,
            is_pressed: Observable::new(false),
            light_position: Observable::new(0),
            output,
            write_lock: Mutex::new(()),
        }
    }

    fn set_light_position(&self, light_position: usize) -> Result<(), Error> {
        self.light_position.publish(light_position);
        self.write_state_to_device()
    }

    fn write_state_to_device(&self) -> Result<(), Error> {
        let _guard = self.write_lock.lock();
        let msg = protocol::encoder_lights(self.track, self.light_position.get());

        self.output.send(msg)
    }

    fn on_pressed(&self, is_pressed: bool) {
        log::trace!("{} encoder pressed: {is_pressed}", self.track);
        self.is_pressed.publish(is_pressed);
    }
}

/// Encoder in `CtrlRel` mode: the device reports each detent's direction.
///
/// The light ring doesn't follow the knob: the application decides
/// what the rotation means and sets the light position accordingly.
pub struct RelativeRotaryEncoder {
    knob: Knob,
    rotation: Observable<Option<Direction>>,
}

impl RelativeRotaryEncoder {
    pub const LIGHT_COUNT: usize = ENCODER_LIGHT_COUNT;

    /// Direction of the last detent, `None` until the knob is turned.
    pub fn rotation(&self) -> &Observable<Option<Direction>> {
        &self.rotation
    }

    /// Moves the lit light one step in `direction`, stopping at the ring's ends.
    pub fn step_light_position(&self, direction: Direction) -> Result<(), Error> {
        let cur = self.knob.light_position.get().min(Self::LIGHT_COUNT - 1);
        let next = match direction {
            Direction::Clockwise => (cur + 1).min(Self::LIGHT_COUNT - 1),
            Direction::Counterclockwise => cur.saturating_sub(1),
        };

        self.knob.set_light_position(next)
    }
}

impl DeviceInput for RelativeRotaryEncoder {
    type Rotation = Direction;

    fn new(track: TrackId, output: Arc<Output>) -> Self {
        Self {
            knob: Knob::new(track, output),
            rotation: Observable::new(None),
        }
    }

    fn decode_rotation(value: u8) -> Option<Direction> {
        protocol::decode_relative(value)
    }

    fn on_pressed(&self, is_pressed: bool) {
        self.knob.on_pressed(is_pressed);
    }

    fn on_rotated(&self, direction: Direction) {
        log::trace!("{} encoder rotated {direction:?}", self.knob.track);
        self.rotation.publish(Some(direction));
    }
}

impl RotaryEncoder for RelativeRotaryEncoder {
    fn track(&self) -> TrackId {
        self.knob.track
    }

    fn is_pressed(&self) -> &Observable<bool> {
        &self.knob.is_pressed
    }

    fn light_position(&self) -> &Observable<usize> {
        &self.knob.light_position
    }

    fn set_light_position(&self, light_position: usize) -> Result<(), Error> {
        self.knob.set_light_position(light_position)
    }

    fn write_state_to_device(&self) -> Result<(), Error> {
        self.knob.write_state_to_device()
    }
}

/// Encoder in `Ctrl` mode: the device reports the knob's position.
///
/// The device moves the light ring along with the knob,
/// `light_position` follows the reported position.
pub struct AbsoluteRotaryEncoder {
    knob: Knob,
    rotation_position: Observable<f64>,
}

impl AbsoluteRotaryEncoder {
    pub const LIGHT_COUNT: usize = ENCODER_LIGHT_COUNT;

    /// Knob position in `[0, 1]`, `0` being the farthest counterclockwise.
    pub fn rotation_position(&self) -> &Observable<f64> {
        &self.rotation_position
    }

    fn light_position_for(rotation_position: f64) -> usize {
        (rotation_position.clamp(0f64, 1f64) * (Self::LIGHT_COUNT - 1) as f64).round() as usize
    }
}

impl DeviceInput for AbsoluteRotaryEncoder {
    type Rotation = f64;

    fn new(track: TrackId, output: Arc<Output>) -> Self {
        Self {
            knob: Knob::new(track, output),
            rotation_position: Observable::new(0f64),
        }
    }

    fn decode_rotation(value: u8) -> Option<f64> {
        protocol::decode_absolute(value)
    }

    fn on_pressed(&self, is_pressed: bool) {
        self.knob.on_pressed(is_pressed);
    }

    fn on_rotated(&self, rotation_position: f64) {
        log::trace!(
            "{} encoder rotated to {rotation_position:.3}",
            self.knob.track
        );

        // The device already lit the ring.
        self.knob
            .light_position
            .publish(Self::light_position_for(rotation_position));
        self.rotation_position.publish(rotation_position);
    }
}

impl RotaryEncoder for AbsoluteRotaryEncoder {
    fn track(&self) -> TrackId {
        self.knob.track
    }

    fn is_pressed(&self) -> &Observable<bool> {
        &self.knob.is_pressed
    }

    fn light_position(&self) -> &Observable<usize> {
        &self.knob.light_position
    }

    fn set_light_position(&self, light_position: usize) -> Result<(), Error> {
        self.knob.set_light_position(light_position)
    }

    fn write_state_to_device(&self) -> Result<(), Error> {
        self.knob.write_state_to_device()
    }
}
