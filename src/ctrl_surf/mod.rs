//! Typed model of a Behringer X-Touch Extender.
//!
//! A [`ControlSurface`] exposes the controls of the 8 tracks of the device.
//! Hardware-driven attributes (presses, fader moves, rotations) are
//! [`Observable`]s updated from the device. Application-driven attributes
//! (lights, motor positions, texts) are changed with setters and
//! written to the device.

pub mod control;
pub use control::{
    AbsoluteRotaryEncoder, Button, Fader, RelativeRotaryEncoder, RotaryEncoder, ScribbleStrip,
    VuMeter,
};

pub mod data;
pub use data::{
    BackgroundColor, ButtonKind, Direction, IlluminationState, TextColor, TrackId, TrackIndex,
    TRACK_COUNT,
};

pub mod device;

pub mod error;
pub use error::Error;

pub mod event;

mod mode;
pub use mode::{Absolute, Mode, Relative};

pub mod property;
pub use property::{Observable, ObserverId};

pub mod protocol;

mod session;
pub use session::{AbsoluteControlSurface, ControlSurface, Lifecycle, RelativeControlSurface};

mod tracks;
pub use tracks::Track;
