use super::control::{AbsoluteRotaryEncoder, RelativeRotaryEncoder, RotaryEncoder};

/// Rotary encoder mode the device is configured with.
///
/// The mode is selected on the device at power-up
/// (`Ctrl` or `CtrlRel`) and must match the session's.
pub trait Mode: Send + Sync + 'static {
    const NAME: &'static str;

    type Encoder: RotaryEncoder;
}

/// `CtrlRel` mode: encoders report rotation direction.
#[derive(Debug)]
pub struct Relative;

impl Mode for Relative {
    const NAME: &'static str = "relative";

    type Encoder = RelativeRotaryEncoder;
}

/// `Ctrl` mode: encoders report their position.
#[derive(Debug)]
pub struct Absolute;

impl Mode for Absolute {
    const NAME: &'static str = "absolute";

    type Encoder = AbsoluteRotaryEncoder;
}
