//! Addressing of the Behringer X-Touch Extender.
//!
//! The device must be set to one of the MIDI Controller modes at power-up:
//! hold the first track's Select button while switching it on, then turn
//! the first encoder to `Ctrl` (absolute encoders) or `CtrlRel` (relative
//! encoders) and confirm with its Select button. Use the
//! [`Absolute`](super::Absolute) or [`Relative`](super::Relative) session
//! mode accordingly.

pub use super::protocol::DEVICE_ID;

/// Name of the device's MIDI ports, as shown by the OS.
pub const PORT_NAME: &str = "X-Touch-Ext";

/// Name of the MIDI client under which this crate connects.
pub const CLIENT_NAME: &str = "xtouch-extender";

pub const NAME: &str = "X-Touch Extender";
