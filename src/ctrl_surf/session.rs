use crossbeam_channel as channel;
use parking_lot::Mutex;
use std::{
    fmt,
    marker::PhantomData,
    sync::{Arc, Weak},
};

use super::{
    control::{sealed::DeviceInput, Button, Fader, Output, ScribbleStrip, VuMeter},
    data::{ButtonKind, TrackIndex, TRACK_COUNT},
    device,
    mode::{Absolute, Mode, Relative},
    protocol::xtouch_ext as protocol,
    tracks::{Track, Tracks},
    Error,
};
use crate::{bytes::Displayable, midi};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Unopened,
    Open,
    Closed,
}

impl Lifecycle {
    pub fn as_str(self) -> &'static str {
        match self {
            Lifecycle::Unopened => "unopened",
            Lifecycle::Open => "open",
            Lifecycle::Closed => "closed",
        }
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type RelativeControlSurface = ControlSurface<Relative>;
pub type AbsoluteControlSurface = ControlSurface<Absolute>;

/// A session with an X-Touch Extender.
///
/// The controls are available as soon as the session is created.
/// Their state is pushed to the device on [`open`](Self::open)
/// & kept in sync until [`close`](Self::close).
///
/// Device events are handled on the transport's listening thread:
/// observers must return quickly and must not close the session.
pub struct ControlSurface<M: Mode> {
    port_name: Arc<str>,
    transport: Arc<dyn midi::Transport>,
    output: Arc<Output>,
    tracks: Arc<Tracks<M::Encoder>>,
    lifecycle: Mutex<Lifecycle>,
    mode: PhantomData<M>,
}

impl<M: Mode> ControlSurface<M> {
    /// Creates a session using the system MIDI ports named [`device::PORT_NAME`].
    pub fn new() -> Result<Self, Error> {
        let transport = midi::InOutPorts::try_new(device::CLIENT_NAME)?;

        Ok(Self::with_transport(Arc::new(transport), device::PORT_NAME))
    }

    /// Creates a session using `transport` to reach the ports named `port_name`.
    pub fn with_transport(
        transport: Arc<dyn midi::Transport>,
        port_name: impl Into<Arc<str>>,
    ) -> Self {
        let output = Arc::new(Output::new(transport.clone()));
        let tracks = Arc::new(Tracks::new(&output));

        Self {
            port_name: port_name.into(),
            transport,
            output,
            tracks,
            lifecycle: Mutex::new(Lifecycle::Unopened),
            mode: PhantomData,
        }
    }

    /// Connects to the device & pushes the state of all the controls.
    ///
    /// Only an unopened session can be opened. If the device can't be
    /// reached, the session stays unopened and opening can be retried.
    pub fn open(&self) -> Result<(), Error> {
        let mut lifecycle = self.lifecycle.lock();
        if *lifecycle != Lifecycle::Unopened {
            return Err(Error::Lifecycle(*lifecycle));
        }

        let tracks = self.tracks.clone();
        self.transport
            .open(
                &self.port_name,
                Box::new(move |buf: &[u8]| Self::handle_msg(&tracks, buf)),
            )
            .map_err(|err| {
                log::error!("Failed to open {}: {err}", self.port_name);
                Error::from_open(self.port_name.clone(), err)
            })?;

        *lifecycle = Lifecycle::Open;
        self.output.set_open(true);
        log::info!("Opened {} in {} mode", self.port_name, M::NAME);

        self.tracks.write_state_to_device()
    }

    /// Disconnects from the device.
    ///
    /// Can be called from any state & any number of times.
    /// Must not be called from a device event notification.
    pub fn close(&self) {
        let prev = {
            let mut lifecycle = self.lifecycle.lock();
            if *lifecycle == Lifecycle::Closed {
                return;
            }

            std::mem::replace(&mut *lifecycle, Lifecycle::Closed)
        };

        log::debug!("{} {prev} => {}", device::NAME, Lifecycle::Closed);

        // Closing the transport waits for the listening thread,
        // where observers may be querying the lifecycle.
        if prev == Lifecycle::Open {
            self.output.set_open(false);
            self.transport.close();
            log::info!("Closed {}", self.port_name);
        }
    }

    /// Closes `surface` on Ctrl-C or termination request.
    ///
    /// The returned channel receives a notification once the session is closed.
    /// A single handler can be installed per process.
    pub fn close_on_interrupt(surface: &Arc<Self>) -> Result<channel::Receiver<()>, Error> {
        let (tx, rx) = channel::bounded(1);
        let surface = Arc::downgrade(surface);

        ctrlc::set_handler(move || Self::on_interrupt(&surface, &tx))?;

        Ok(rx)
    }

    fn on_interrupt(surface: &Weak<Self>, tx: &channel::Sender<()>) {
        log::info!("Interrupted");
        if let Some(surface) = surface.upgrade() {
            surface.close();
        }
        let _ = tx.try_send(());
    }

    pub fn lifecycle(&self) -> Lifecycle {
        *self.lifecycle.lock()
    }

    pub fn is_open(&self) -> bool {
        self.lifecycle() == Lifecycle::Open
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn track_count(&self) -> usize {
        TRACK_COUNT
    }

    pub fn track(&self, track: impl TrackIndex) -> Result<&Track<M::Encoder>, Error> {
        Ok(self.tracks.get(track.track_id()?))
    }

    pub fn button(&self, kind: ButtonKind, track: impl TrackIndex) -> Result<&Arc<Button>, Error> {
        Ok(self.track(track)?.button(kind))
    }

    pub fn record_button(&self, track: impl TrackIndex) -> Result<&Arc<Button>, Error> {
        Ok(&self.track(track)?.record)
    }

    pub fn solo_button(&self, track: impl TrackIndex) -> Result<&Arc<Button>, Error> {
        Ok(&self.track(track)?.solo)
    }

    pub fn mute_button(&self, track: impl TrackIndex) -> Result<&Arc<Button>, Error> {
        Ok(&self.track(track)?.mute)
    }

    pub fn select_button(&self, track: impl TrackIndex) -> Result<&Arc<Button>, Error> {
        Ok(&self.track(track)?.select)
    }

    pub fn fader(&self, track: impl TrackIndex) -> Result<&Arc<Fader>, Error> {
        Ok(&self.track(track)?.fader)
    }

    pub fn vu_meter(&self, track: impl TrackIndex) -> Result<&Arc<VuMeter>, Error> {
        Ok(&self.track(track)?.vu_meter)
    }

    pub fn scribble_strip(&self, track: impl TrackIndex) -> Result<&Arc<ScribbleStrip>, Error> {
        Ok(&self.track(track)?.scribble_strip)
    }

    pub fn rotary_encoder(&self, track: impl TrackIndex) -> Result<&Arc<M::Encoder>, Error> {
        Ok(&self.track(track)?.rotary_encoder)
    }

    fn handle_msg(tracks: &Tracks<M::Encoder>, buf: &[u8]) {
        match protocol::decode(buf, <M::Encoder as DeviceInput>::decode_rotation) {
            Some(event) => {
                log::trace!("{} => {event:?}", Displayable::from(buf));
                tracks.dispatch(event);
            }
            None => log::trace!("Ignoring {}", Displayable::from(buf)),
        }
    }
}

impl<M: Mode> Drop for ControlSurface<M> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ctrl_surf::{
            control::RotaryEncoder,
            data::{BackgroundColor, Direction, IlluminationState, TextColor, TrackId},
        },
        midi::mock::{Availability, MockTransport},
    };
    use std::{thread, time::Duration};

    fn surface<M: Mode>() -> (Arc<MockTransport>, ControlSurface<M>) {
        let transport = MockTransport::new(device::PORT_NAME);
        let surface = ControlSurface::with_transport(transport.clone(), device::PORT_NAME);

        (transport, surface)
    }

    #[test]
    fn fresh_state() {
        let (transport, surface) = surface::<Absolute>();

        assert_eq!(surface.lifecycle(), Lifecycle::Unopened);
        assert_eq!(surface.track_count(), 8);

        for track in TrackId::all() {
            for kind in ButtonKind::ALL {
                let button = surface.button(kind, track).unwrap();
                assert_eq!(button.kind(), kind);
                assert_eq!(button.track(), track);
                assert_eq!(button.illumination().get(), IlluminationState::Off);
                assert!(!button.is_pressed().get());
            }

            let fader = surface.fader(track).unwrap();
            assert_eq!(fader.actual_position().get(), 0.0);
            assert_eq!(fader.desired_position().get(), 0.0);

            assert_eq!(surface.vu_meter(track).unwrap().light_position().get(), 0);
            let encoder = surface.rotary_encoder(track).unwrap();
            assert_eq!(encoder.light_position().get(), 0);

            let strip = surface.scribble_strip(track).unwrap();
            assert!(strip.top_text().get().is_empty());
            assert!(strip.bottom_text().get().is_empty());
            assert_eq!(strip.background_color().get(), BackgroundColor::Black);
            assert_eq!(strip.top_text_color().get(), TextColor::Light);
        }

        assert_eq!(transport.opens(), 0);
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn track_out_of_range() {
        let (transport, surface) = surface::<Relative>();

        assert!(matches!(surface.fader(8), Err(Error::TrackOutOfRange(8))));
        assert!(matches!(surface.fader(-1), Err(Error::TrackOutOfRange(-1))));
        assert!(matches!(
            surface.rotary_encoder(8usize),
            Err(Error::TrackOutOfRange(8))
        ));
        assert!(matches!(
            surface.scribble_strip(-1i64),
            Err(Error::TrackOutOfRange(-1))
        ));
        assert!(surface.select_button(7).is_ok());

        assert_eq!(transport.opens(), 0);
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn open_pushes_state() {
        let (transport, surface) = surface::<Absolute>();

        // Set before open: only stored
        surface
            .mute_button(2)
            .unwrap()
            .set_illumination(IlluminationState::Blinking)
            .unwrap();
        surface.scribble_strip(0).unwrap().set_top_text("Bass").unwrap();
        assert!(transport.sent().is_empty());

        surface.open().unwrap();
        assert!(surface.is_open());
        assert!(transport.is_listening());

        let sent = transport.take_sent();
        assert_eq!(sent.len(), 8 * TRACK_COUNT);
        assert!(sent.iter().any(|msg| msg.inner() == &[0x90, 0x1a, 64]));
        let is_bass_strip = |msg: &midi::Msg| msg.len() == 23 && &msg[8..15] == b"Bass   ";
        assert!(sent.iter().any(is_bass_strip));

        surface.fader(1).unwrap().set_desired_position(1.0).unwrap();
        assert_eq!(transport.sent()[0].inner(), &[0xb0, 71, 127]);
    }

    #[test]
    fn open_twice() {
        let (transport, surface) = surface::<Absolute>();

        surface.open().unwrap();
        transport.take_sent();

        assert!(matches!(
            surface.open(),
            Err(Error::Lifecycle(Lifecycle::Open))
        ));
        assert_eq!(surface.lifecycle(), Lifecycle::Open);
        assert_eq!(transport.opens(), 1);
        assert!(transport.sent().is_empty());

        surface.close();
        assert!(matches!(
            surface.open(),
            Err(Error::Lifecycle(Lifecycle::Closed))
        ));
        assert_eq!(transport.opens(), 1);
    }

    #[test]
    fn device_not_found() {
        let transport =
            MockTransport::with_availability(device::PORT_NAME, Availability::MissingOut);
        let surface =
            AbsoluteControlSurface::with_transport(transport.clone(), device::PORT_NAME);

        for _ in 0..2 {
            let err = surface.open().unwrap_err();
            assert!(matches!(
                err,
                Error::DeviceNotFound {
                    direction: midi::Direction::Out,
                    ..
                }
            ));
            assert!(!err.is_in_use());
            assert_eq!(surface.lifecycle(), Lifecycle::Unopened);
        }

        let transport = MockTransport::new("X-Touch");
        let surface = AbsoluteControlSurface::with_transport(transport, device::PORT_NAME);
        assert!(matches!(
            surface.open(),
            Err(Error::DeviceNotFound { .. })
        ));
    }

    #[test]
    fn device_in_use() {
        let transport = MockTransport::with_availability(device::PORT_NAME, Availability::InUse);
        let surface =
            RelativeControlSurface::with_transport(transport.clone(), device::PORT_NAME);

        let err = surface.open().unwrap_err();
        assert!(err.is_in_use());
        assert_eq!(surface.lifecycle(), Lifecycle::Unopened);
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn inbound_dispatch() {
        let (transport, surface) = surface::<Relative>();
        surface.open().unwrap();

        let rotations = surface.rotary_encoder(4).unwrap().rotation().watch();

        transport.inject(&[0x90, 0x08, 127]);
        transport.inject(&[0xb0, 84, 65]);
        transport.inject(&[0xb0, 84, 1]);
        // Absolute rotation value, ignored in relative mode
        transport.inject(&[0xb0, 84, 64]);
        transport.inject(&[0xb0, 73, 127]);
        transport.inject(&[0x90, 0x74, 127]);
        // Not a modeled control
        transport.inject(&[0x90, 0x5e, 127]);

        assert!(surface.record_button(0).unwrap().is_pressed().get());
        assert!(!surface.record_button(1).unwrap().is_pressed().get());
        assert_eq!(
            rotations.try_iter().collect::<Vec<_>>(),
            vec![Some(Direction::Clockwise), Some(Direction::Counterclockwise)],
        );
        assert_eq!(surface.fader(3).unwrap().actual_position().get(), 1.0);
        assert!(surface.fader(6).unwrap().is_pressed().get());

        transport.inject(&[0x80, 0x08, 0]);
        assert!(!surface.record_button(0).unwrap().is_pressed().get());
    }

    #[test]
    fn inbound_absolute_rotation() {
        let (transport, surface) = surface::<Absolute>();
        surface.open().unwrap();

        transport.inject(&[0xb0, 80, 127]);

        let encoder = surface.rotary_encoder(0).unwrap();
        assert_eq!(encoder.rotation_position().get(), 1.0);
        assert_eq!(encoder.light_position().get(), 12);
    }

    #[test]
    fn observer_can_write() {
        let (transport, surface) = surface::<Absolute>();
        let surface = Arc::new(surface);
        surface.open().unwrap();
        transport.take_sent();

        let weak = Arc::downgrade(&surface);
        surface
            .solo_button(5)
            .unwrap()
            .is_pressed()
            .subscribe(move |is_pressed| {
                if let Some(surface) = weak.upgrade() {
                    let state = if *is_pressed {
                        IlluminationState::On
                    } else {
                        IlluminationState::Off
                    };
                    surface.solo_button(5).unwrap().set_illumination(state).unwrap();
                }
            });

        transport.inject(&[0x90, 0x15, 127]);
        assert_eq!(
            surface.solo_button(5).unwrap().illumination().get(),
            IlluminationState::On,
        );
        assert_eq!(transport.sent()[0].inner(), &[0x90, 0x15, 127]);
    }

    #[test]
    fn close_idempotent() {
        let (transport, surface) = surface::<Absolute>();
        surface.open().unwrap();

        surface.close();
        surface.close();

        assert_eq!(surface.lifecycle(), Lifecycle::Closed);
        assert_eq!(transport.closes(), 1);
        assert!(!transport.is_listening());

        // Not sent anymore, but still stored
        transport.take_sent();
        surface.vu_meter(0).unwrap().set_light_position(4).unwrap();
        assert_eq!(surface.vu_meter(0).unwrap().light_position().get(), 4);
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn close_unopened() {
        let (transport, surface) = surface::<Relative>();

        surface.close();
        assert_eq!(surface.lifecycle(), Lifecycle::Closed);
        assert_eq!(transport.closes(), 0);
    }

    #[test]
    fn concurrent_close() {
        let (transport, surface) = surface::<Absolute>();
        let surface = Arc::new(surface);
        surface.open().unwrap();

        let handles = (0..8)
            .map(|_| {
                let surface = surface.clone();
                thread::spawn(move || surface.close())
            })
            .collect::<Vec<_>>();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(transport.closes(), 1);
        assert_eq!(surface.lifecycle(), Lifecycle::Closed);
    }

    #[test]
    fn close_while_observer_reads_lifecycle() {
        let (transport, surface) = surface::<Absolute>();
        let surface = Arc::new(surface);
        surface.open().unwrap();

        let (seen_tx, seen_rx) = channel::bounded(1);
        let weak = Arc::downgrade(&surface);
        surface
            .record_button(0)
            .unwrap()
            .is_pressed()
            .subscribe(move |_| {
                thread::sleep(Duration::from_millis(200));
                if let Some(surface) = weak.upgrade() {
                    let _ = seen_tx.try_send(surface.is_open());
                }
            });

        let injector = {
            let transport = transport.clone();
            thread::spawn(move || transport.inject(&[0x90, 0x08, 127]))
        };

        thread::sleep(Duration::from_millis(50));
        let (closed_tx, closed_rx) = channel::bounded(1);
        let closer = {
            let surface = surface.clone();
            thread::spawn(move || {
                surface.close();
                let _ = closed_tx.send(());
            })
        };

        assert!(closed_rx.recv_timeout(Duration::from_secs(3)).is_ok());
        assert_eq!(seen_rx.recv_timeout(Duration::from_secs(3)), Ok(false));

        injector.join().unwrap();
        closer.join().unwrap();
        assert_eq!(transport.closes(), 1);
    }

    #[test]
    fn drop_closes() {
        let (transport, surface) = surface::<Relative>();
        surface.open().unwrap();

        drop(surface);
        assert_eq!(transport.closes(), 1);
    }

    #[test]
    fn send_failure_reported() {
        let (transport, surface) = surface::<Absolute>();
        surface.open().unwrap();

        transport.fail_sending(true);
        assert!(matches!(
            surface.select_button(0).unwrap().set_illumination(IlluminationState::On),
            Err(Error::Transport(_))
        ));
        // The value is stored nonetheless
        assert_eq!(
            surface.select_button(0).unwrap().illumination().get(),
            IlluminationState::On,
        );
    }

    #[test]
    fn interrupt_handler() {
        let (_, surface) = surface::<Absolute>();
        let surface = Arc::new(surface);

        let rx = ControlSurface::close_on_interrupt(&surface).unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn interrupt_closes() {
        let (transport, surface) = surface::<Relative>();
        let surface = Arc::new(surface);
        surface.open().unwrap();

        let (tx, rx) = channel::bounded(1);
        let weak = Arc::downgrade(&surface);

        ControlSurface::on_interrupt(&weak, &tx);
        assert_eq!(surface.lifecycle(), Lifecycle::Closed);
        assert_eq!(transport.closes(), 1);
        assert!(rx.try_recv().is_ok());

        // Repeated interrupts don't close again & don't block
        ControlSurface::on_interrupt(&weak, &tx);
        ControlSurface::on_interrupt(&weak, &tx);
        assert_eq!(transport.closes(), 1);
        assert!(rx.try_recv().is_ok());

        // Still signaled once the surface is gone
        drop(surface);
        ControlSurface::<Relative>::on_interrupt(&weak, &tx);
        assert!(rx.try_recv().is_ok());
    }
}
