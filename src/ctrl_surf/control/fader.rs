use parking_lot::Mutex;
use std::sync::Arc;

use super::Output;
use crate::ctrl_surf::{data::TrackId, protocol::xtouch_ext as protocol, Error, Observable};

/// Motorized, touch sensitive fader.
pub struct Fader {
    track: TrackId,
    actual_position: Observable<f64>,
    desired_position: Observable<f64>,
    is_pressed: Observable<bool>,
    output: Arc<Output>,
    write_lock: Mutex<()>,
}

impl Fader {
    pub(crate) fn new(track: TrackId, output: Arc<Output>) -> Self {
        Self {
            track,
            actual_position: Observable::new(0f64),
            desired_position: Observable::new(0f64),
            is_pressed: Observable::new(false),
            output,
            write_lock: Mutex::new(()),
        }
    }

    pub fn track(&self) -> TrackId {
        self.track
    }

    /// Position the user moved the fader to, in `[0, 1]`.
    pub fn actual_position(&self) -> &Observable<f64> {
        &self.actual_position
    }

    /// Position the motor moves the fader to, in `[0, 1]`.
    pub fn desired_position(&self) -> &Observable<f64> {
        &self.desired_position
    }

    /// Whether the user is touching the fader.
    pub fn is_pressed(&self) -> &Observable<bool> {
        &self.is_pressed
    }

    /// Moves the fader to `position`.
    ///
    /// Fails with [`Error::ValueOutOfRange`] if `position` is not in `[0, 1]`.
    pub fn set_desired_position(&self, position: f64) -> Result<(), Error> {
        if !(0f64..=1f64).contains(&position) {
            return Err(Error::ValueOutOfRange {
                name: "Fader position",
                value: position,
            });
        }

        self.desired_position.publish(position);
        self.write_state_to_device()
    }

    pub fn write_state_to_device(&self) -> Result<(), Error> {
        let _guard = self.write_lock.lock();
        let msg = protocol::fader_position(self.track, self.desired_position.get())?;

        self.output.send(msg)
    }

    pub(crate) fn on_moved(&self, position: f64) {
        log::trace!("{} fader moved to {position:.3}", self.track);
        self.actual_position.publish(position);
    }

    pub(crate) fn on_touched(&self, is_pressed: bool) {
        log::trace!("{} fader touched: {is_pressed}", self.track);
        self.is_pressed.publish(is_pressed);
    }
}
