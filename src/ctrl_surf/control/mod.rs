//! Models of the physical controls of one track.
//!
//! Application-owned attributes are changed with setters, which store the value,
//! notify its observers & write the state to the device. Hardware-owned
//! attributes are read-only [`Observable`]s updated on each device event.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use super::{data::TrackId, Error, Observable};
use crate::midi::{self, Msg};

mod button;
pub use button::Button;

mod encoder;
pub use encoder::{AbsoluteRotaryEncoder, RelativeRotaryEncoder};

mod fader;
pub use fader::Fader;

mod scribble_strip;
pub use scribble_strip::ScribbleStrip;

mod vu_meter;
pub use vu_meter::VuMeter;

/// The outbound side of the device link, shared by the controls of a session.
///
/// Messages are only sent while the session is open.
pub struct Output {
    transport: Arc<dyn midi::Transport>,
    is_open: AtomicBool,
}

impl Output {
    pub(crate) fn new(transport: Arc<dyn midi::Transport>) -> Self {
        Self {
            transport,
            is_open: AtomicBool::new(false),
        }
    }

    pub(crate) fn set_open(&self, is_open: bool) {
        self.is_open.store(is_open, Ordering::SeqCst);
    }

    pub fn is_open(&self) -> bool {
        self.is_open.load(Ordering::SeqCst)
    }

    pub(crate) fn send(&self, msg: Msg) -> Result<(), Error> {
        if !self.is_open() {
            log::trace!("Device not open, not sending {}", msg.display());
            return Ok(());
        }

        log::trace!("Sending {}", msg.display());
        self.transport.send(&msg)?;

        Ok(())
    }
}

/// Rotary encoder knob, surrounded by a ring of lights.
///
/// Implemented by the encoder of each control [`Mode`](super::Mode).
pub trait RotaryEncoder: sealed::DeviceInput + Send + Sync + 'static {
    fn track(&self) -> TrackId;

    /// Whether the knob is pushed.
    fn is_pressed(&self) -> &Observable<bool>;

    /// Index of the lit light in the ring, in `[0, ENCODER_LIGHT_COUNT)`.
    fn light_position(&self) -> &Observable<usize>;

    fn set_light_position(&self, light_position: usize) -> Result<(), Error>;

    fn write_state_to_device(&self) -> Result<(), Error>;
}

pub(crate) mod sealed {
    use super::{Output, TrackId};
    use std::sync::Arc;

    /// Device side of a rotary encoder.
    pub trait DeviceInput: Sized {
        type Rotation: Copy + std::fmt::Debug + Send + 'static;

        fn new(track: TrackId, output: Arc<Output>) -> Self;

        fn decode_rotation(value: u8) -> Option<Self::Rotation>;

        fn on_pressed(&self, is_pressed: bool);

        fn on_rotated(&self, rotation: Self::Rotation);
    }
}
