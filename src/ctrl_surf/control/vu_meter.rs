use parking_lot::Mutex;
use std::sync::Arc;

use super::Output;
use crate::ctrl_surf::{
    data::TrackId,
    protocol::{xtouch_ext as protocol, VU_METER_LIGHT_COUNT},
    Error, Observable,
};

/// Signal level meter. The device never reports its state.
pub struct VuMeter {
    track: TrackId,
    light_position: Observable<usize>,
    output: Arc<Output>,
    write_lock: Mutex<()>,
}

impl VuMeter {
    pub const LIGHT_COUNT: usize = VU_METER_LIGHT_COUNT;

    pub(crate) fn new(track: TrackId, output: Arc<Output>) -> Self {
        Self {
            track,
            light_position: Observable::new(0),
            output,
            write_lock: Mutex::new(()),
        }
    }

    pub fn track(&self) -> TrackId {
        self.track
    }

    /// Number of lit lights, `0` meaning no signal.
    pub fn light_position(&self) -> &Observable<usize> {
        &self.light_position
    }

    /// Lights `light_position` lights.
    ///
    /// Values above [`Self::LIGHT_COUNT`] light the whole meter.
    pub fn set_light_position(&self, light_position: usize) -> Result<(), Error> {
        self.light_position.publish(light_position);
        self.write_state_to_device()
    }

    pub fn write_state_to_device(&self) -> Result<(), Error> {
        let _guard = self.write_lock.lock();
        let msg = protocol::vu_meter(self.track, self.light_position.get());

        self.output.send(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ctrl_surf::control::tests::{open_output, track};

    #[test]
    fn light_position() {
        let (transport, output) = open_output();
        let meter = VuMeter::new(track(6), output);

        meter.set_light_position(8).unwrap();
        meter.set_light_position(20).unwrap();
        // Stored as is, clamped on the wire
        assert_eq!(meter.light_position().get(), 20);
        meter.set_light_position(0).unwrap();

        let sent = transport.sent();
        assert_eq!(sent[0].inner(), &[0xb0, 96, 127]);
        assert_eq!(sent[1].inner(), &[0xb0, 96, 127]);
        assert_eq!(sent[2].inner(), &[0xb0, 96, 0]);
    }
}
