pub mod xtouch_ext;
pub use xtouch_ext::{StripContent, DEVICE_ID, ENCODER_LIGHT_COUNT, VU_METER_LIGHT_COUNT};
