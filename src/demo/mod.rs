//! Interactive demonstration of the X-Touch Extender controls.
//!
//! Buttons cycle through their illumination states, the faders move to
//! positions depending on their track and the bottom line of the scribble
//! strips shows the last user action. The VU meters follow the faders.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::{path::PathBuf, sync::Arc};

use xtouch_extender::{
    ctrl_surf::{
        device, Absolute, ButtonKind, ControlSurface, Error, IlluminationState, Mode, Relative,
        RotaryEncoder, TrackId, VuMeter,
    },
    midi,
};

pub mod config;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum EncoderMode {
    /// `CtrlRel`: encoders report rotation direction
    Relative,
    /// `Ctrl`: encoders report their position
    Absolute,
}

#[derive(Parser, Debug)]
#[command(name = "xtouch-extender", version, about = "X-Touch Extender demo")]
pub struct Args {
    /// Encoder mode the device was set to at power-up
    #[arg(short, long, value_enum, default_value_t = EncoderMode::Absolute)]
    pub mode: EncoderMode,

    /// Scribble strips configuration
    #[arg(short, long, default_value = "scribble.config.json")]
    pub config: PathBuf,

    /// MIDI port name of the device
    #[arg(short, long)]
    pub port: Option<String>,

    /// VU meters refresh rate
    #[arg(long, default_value_t = 15, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub meter_fps: u32,
}

pub fn run(args: Args) -> anyhow::Result<()> {
    match args.mode {
        EncoderMode::Relative => run_with::<Relative>(&args),
        EncoderMode::Absolute => run_with::<Absolute>(&args),
    }
}

fn run_with<M: DemoMode>(args: &Args) -> anyhow::Result<()> {
    let surface = Arc::new(match args.port.as_deref() {
        None => ControlSurface::<M>::new()?,
        Some(port) => {
            let transport = midi::InOutPorts::try_new(device::CLIENT_NAME)?;
            ControlSurface::with_transport(Arc::new(transport), port)
        }
    });

    let interrupted = ControlSurface::close_on_interrupt(&surface)?;

    if let Some(strips) = config::load(&args.config)? {
        for strip in strips {
            strip.apply(&surface)?;
        }
    }

    for track in TrackId::all() {
        wire_track(&surface, track)?;
    }

    log::info!(
        "Connecting to {} in {} mode...",
        surface.port_name(),
        M::NAME
    );
    surface.open().map_err(|err| {
        if err.is_in_use() {
            anyhow::Error::new(err).context("The device is in use by another application")
        } else {
            anyhow::Error::new(err).context("Couldn't open the device")
        }
    })?;
    log::info!("Connected. Press Ctrl-C to exit.");

    let meters = {
        let timer = timer::Timer::new();
        let surface = Arc::downgrade(&surface);
        let period = chrono::Duration::microseconds(1_000_000 / args.meter_fps as i64);
        let guard = timer.schedule_repeating(period, move || {
            if let Some(surface) = surface.upgrade() {
                if let Err(err) = refresh_meters(&surface) {
                    log::error!("Couldn't refresh VU meters: {err}");
                }
            }
        });

        (timer, guard)
    };

    interrupted.recv().context("Interrupt handler vanished")?;

    drop(meters);
    surface.close();

    Ok(())
}

/// Encoder specific part of the demo.
trait DemoMode: Mode + Sized {
    fn wire_encoder(surface: &Arc<ControlSurface<Self>>, track: TrackId) -> Result<(), Error>;
}

impl DemoMode for Absolute {
    fn wire_encoder(surface: &Arc<ControlSurface<Self>>, track: TrackId) -> Result<(), Error> {
        let encoder = surface.rotary_encoder(track)?;
        encoder.set_light_position(track.idx())?;

        let weak = Arc::downgrade(surface);
        encoder.rotation_position().subscribe(move |position| {
            log::info!(
                "User moved rotary {} to {:.0}%",
                track.idx() + 1,
                position * 100.0
            );
            on_surface(&weak, |surface| {
                surface
                    .scribble_strip(track)?
                    .set_bottom_text(format!("RT:{:.0}%", position * 100.0))
            });
        });

        Ok(())
    }
}

impl DemoMode for Relative {
    fn wire_encoder(surface: &Arc<ControlSurface<Self>>, track: TrackId) -> Result<(), Error> {
        surface.rotary_encoder(track)?.set_light_position(track.idx())?;

        let weak = Arc::downgrade(surface);
        surface
            .rotary_encoder(track)?
            .rotation()
            .subscribe(move |direction| {
                let Some(direction) = *direction else { return };
                on_surface(&weak, |surface| {
                    let encoder = surface.rotary_encoder(track)?;
                    encoder.step_light_position(direction)?;

                    let label = if direction.is_clockwise() { "CW" } else { "CCW" };
                    surface
                        .scribble_strip(track)?
                        .set_bottom_text(format!("RT:{label} {}", encoder.light_position().get()))
                });
            });

        Ok(())
    }
}

fn wire_track<M: DemoMode>(surface: &Arc<ControlSurface<M>>, track: TrackId) -> Result<(), Error> {
    for kind in ButtonKind::ALL {
        let weak = Arc::downgrade(surface);
        surface.button(kind, track)?.is_pressed().subscribe(move |is_pressed| {
            if *is_pressed {
                on_surface(&weak, |surface| cycle_button(surface, kind, track));
            }
        });
    }

    let fader = surface.fader(track)?;

    let weak = Arc::downgrade(surface);
    fader.is_pressed().subscribe(move |is_pressed| {
        if *is_pressed {
            log::info!("User is touching fader {}", track.idx() + 1);
            on_surface(&weak, |surface| {
                surface.scribble_strip(track)?.set_bottom_text("FD:ON")
            });
        }
    });

    let weak = Arc::downgrade(surface);
    fader.actual_position().subscribe(move |position| {
        log::info!(
            "User moved fader {} to {:.0}%",
            track.idx() + 1,
            position * 100.0
        );
        on_surface(&weak, |surface| {
            surface
                .scribble_strip(track)?
                .set_bottom_text(format!("FD:{:.0}%", position * 100.0))
        });
    });

    let weak = Arc::downgrade(surface);
    surface
        .rotary_encoder(track)?
        .is_pressed()
        .subscribe(move |is_pressed| {
            let text = if *is_pressed { "RT:ON" } else { "RT:OFF" };
            on_surface(&weak, |surface| {
                surface.scribble_strip(track)?.set_bottom_text(text)
            });
        });

    M::wire_encoder(surface, track)?;

    fader.set_desired_position(track.idx() as f64 / (surface.track_count() - 1) as f64)
}

/// Runs `f` on the surface unless it is gone, logging errors.
fn on_surface<M: Mode>(
    surface: &std::sync::Weak<ControlSurface<M>>,
    f: impl FnOnce(&ControlSurface<M>) -> Result<(), Error>,
) {
    if let Some(surface) = surface.upgrade() {
        if let Err(err) = f(&surface) {
            log::error!("{err}");
        }
    }
}

fn next_illumination(state: IlluminationState) -> IlluminationState {
    match state {
        IlluminationState::Off => IlluminationState::On,
        IlluminationState::On => IlluminationState::Blinking,
        IlluminationState::Blinking => IlluminationState::Off,
    }
}

fn button_text(kind: ButtonKind, state: IlluminationState) -> String {
    let kind = match kind {
        ButtonKind::Record => "REC",
        ButtonKind::Solo => "SOLO",
        ButtonKind::Mute => "MUTE",
        ButtonKind::Select => "SEL",
    };
    let state = match state {
        IlluminationState::Off => "--",
        IlluminationState::On => "ON",
        IlluminationState::Blinking => "<>",
    };

    format!("{kind:<5}{state}")
}

fn cycle_button<M: Mode>(
    surface: &ControlSurface<M>,
    kind: ButtonKind,
    track: TrackId,
) -> Result<(), Error> {
    let button = surface.button(kind, track)?;
    let state = next_illumination(button.illumination().get());
    button.set_illumination(state)?;

    surface
        .scribble_strip(track)?
        .set_bottom_text(button_text(kind, state))
}

fn meter_level(fader_position: f64) -> usize {
    (fader_position.clamp(0.0, 1.0) * VuMeter::LIGHT_COUNT as f64).round() as usize
}

fn refresh_meters<M: Mode>(surface: &ControlSurface<M>) -> Result<(), Error> {
    for track in TrackId::all() {
        let level = meter_level(surface.fader(track)?.actual_position().get());
        surface.vu_meter(track)?.set_light_position(level)?;
    }

    Ok(())
}
