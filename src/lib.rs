pub mod bytes;

pub mod ctrl_surf;
pub use ctrl_surf::{AbsoluteControlSurface, ControlSurface, RelativeControlSurface};

pub mod midi;
