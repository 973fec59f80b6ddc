use std::sync::Arc;

use super::{
    control::{Button, Fader, Output, RotaryEncoder, ScribbleStrip, VuMeter},
    data::{ButtonKind, TrackId, TRACK_COUNT},
    event::{DeviceEvent, Pressable},
    Error,
};

/// The controls of one vertical strip of the device.
pub struct Track<E> {
    pub record: Arc<Button>,
    pub solo: Arc<Button>,
    pub mute: Arc<Button>,
    pub select: Arc<Button>,
    pub fader: Arc<Fader>,
    pub vu_meter: Arc<VuMeter>,
    pub scribble_strip: Arc<ScribbleStrip>,
    pub rotary_encoder: Arc<E>,
}

impl<E: RotaryEncoder> Track<E> {
    fn new(track: TrackId, output: &Arc<Output>) -> Self {
        let button = |kind| Arc::new(Button::new(kind, track, output.clone()));

        Self {
            record: button(ButtonKind::Record),
            solo: button(ButtonKind::Solo),
            mute: button(ButtonKind::Mute),
            select: button(ButtonKind::Select),
            fader: Arc::new(Fader::new(track, output.clone())),
            vu_meter: Arc::new(VuMeter::new(track, output.clone())),
            scribble_strip: Arc::new(ScribbleStrip::new(track, output.clone())),
            rotary_encoder: Arc::new(E::new(track, output.clone())),
        }
    }

    pub fn button(&self, kind: ButtonKind) -> &Arc<Button> {
        match kind {
            ButtonKind::Record => &self.record,
            ButtonKind::Solo => &self.solo,
            ButtonKind::Mute => &self.mute,
            ButtonKind::Select => &self.select,
        }
    }

    fn write_state_to_device(&self) -> Result<(), Error> {
        for kind in ButtonKind::ALL {
            self.button(kind).write_state_to_device()?;
        }
        self.fader.write_state_to_device()?;
        self.vu_meter.write_state_to_device()?;
        self.scribble_strip.write_state_to_device()?;
        self.rotary_encoder.write_state_to_device()
    }
}

pub(crate) struct Tracks<E>([Track<E>; TRACK_COUNT]);

impl<E: RotaryEncoder> Tracks<E> {
    pub fn new(output: &Arc<Output>) -> Self {
        let tracks = std::array::from_fn(|idx| Track::new(TrackId(idx as u8), output));
        Tracks(tracks)
    }

    pub fn get(&self, track: TrackId) -> &Track<E> {
        &self.0[track.idx()]
    }

    /// Routes a device event to the control it originates from.
    pub fn dispatch(&self, event: DeviceEvent<E::Rotation>) {
        let Some(track) = self.0.get(event.track() as usize) else {
            log::warn!("Dropping event for out of range track: {event:?}");
            return;
        };

        match event {
            DeviceEvent::Pressed {
                control,
                is_pressed,
                ..
            } => match control {
                Pressable::Button(kind) => track.button(kind).on_pressed(is_pressed),
                Pressable::FaderTouch => track.fader.on_touched(is_pressed),
                Pressable::RotaryEncoder => track.rotary_encoder.on_pressed(is_pressed),
            },
            DeviceEvent::FaderMoved { position, .. } => track.fader.on_moved(position),
            DeviceEvent::Rotated { rotation, .. } => track.rotary_encoder.on_rotated(rotation),
        }
    }

    pub fn write_state_to_device(&self) -> Result<(), Error> {
        for track in self.0.iter() {
            track.write_state_to_device()?;
        }

        Ok(())
    }
}
