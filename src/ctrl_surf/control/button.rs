use parking_lot::Mutex;
use std::sync::Arc;

use super::Output;
use crate::ctrl_surf::{
    data::{ButtonKind, IlluminationState, TrackId},
    protocol::xtouch_ext as protocol,
    Error, Observable,
};

/// A lit push button: Record, Solo, Mute or Select.
///
/// The button doesn't change its light on its own when pressed:
/// it's up to the application to react to `is_pressed` notifications.
pub struct Button {
    kind: ButtonKind,
    track: TrackId,
    is_pressed: Observable<bool>,
    illumination: Observable<IlluminationState>,
    output: Arc<Output>,
    write_lock: Mutex<()>,
}

impl Button {
    pub(crate) fn new(kind: ButtonKind, track: TrackId, output: Arc<Output>) -> Self {
        Self {
            kind,
            track,
            is_pressed: Observable::new(false),
            illumination: Observable::default(),
            output,
            write_lock: Mutex::new(()),
        }
    }

    pub fn kind(&self) -> ButtonKind {
        self.kind
    }

    pub fn track(&self) -> TrackId {
        self.track
    }

    pub fn is_pressed(&self) -> &Observable<bool> {
        &self.is_pressed
    }

    pub fn illumination(&self) -> &Observable<IlluminationState> {
        &self.illumination
    }

    pub fn set_illumination(&self, state: IlluminationState) -> Result<(), Error> {
        self.illumination.publish(state);
        self.write_state_to_device()
    }

    pub fn write_state_to_device(&self) -> Result<(), Error> {
        let _guard = self.write_lock.lock();
        let msg = protocol::illumination(self.kind, self.track, self.illumination.get());

        self.output.send(msg)
    }

    pub(crate) fn on_pressed(&self, is_pressed: bool) {
        log::trace!("{} {} pressed: {is_pressed}", self.track, self.kind);
        self.is_pressed.publish(is_pressed);
    }
}
