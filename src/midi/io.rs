use std::sync::Arc;

use super::{Direction, Error, InboundHandler};

pub type MidiIn = Connection<midir::MidiInput, midir::MidiInputConnection<()>>;
pub type MidiOut = Connection<midir::MidiOutput, midir::MidiOutputConnection>;

/// A midir client which is either connected to a port or ready to connect.
pub enum Connection<IO: midir::MidiIO, C> {
    Connected(C),
    Disconnected(IO),
    /// Transient state while the midir client changes hands.
    None,
}

impl<IO: midir::MidiIO, C> Default for Connection<IO, C> {
    fn default() -> Self {
        Self::None
    }
}

impl<IO: midir::MidiIO, C> Connection<IO, C> {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected(_))
    }
}

impl MidiIn {
    pub fn try_new(client_name: &str) -> Result<Self, Error> {
        Ok(Self::Disconnected(midir::MidiInput::new(client_name)?))
    }

    pub fn connect(
        &mut self,
        port_name: Arc<str>,
        port: &midir::MidiInputPort,
        client_port_name: &str,
        mut handler: InboundHandler,
    ) -> Result<(), Error> {
        self.disconnect();

        let Self::Disconnected(midi_input) = std::mem::take(self) else {
            unreachable!("MIDI In disconnected above");
        };

        let callback = move |_ts: u64, msg: &[u8], _: &mut ()| handler(msg);
        match midi_input.connect(port, client_port_name, callback, ()) {
            Ok(conn) => {
                *self = Self::Connected(conn);
                Ok(())
            }
            Err(err) => {
                *self = Self::Disconnected(err.into_inner());
                let err = Error::PortConnection {
                    name: port_name,
                    direction: Direction::In,
                };
                log::error!("{err}");
                Err(err)
            }
        }
    }

    /// Closes the connection, which stops the listening thread
    /// and drops the inbound handler.
    pub fn disconnect(&mut self) {
        if self.is_connected() {
            if let Self::Connected(conn) = std::mem::take(self) {
                let (io, ()) = conn.close();
                *self = Self::Disconnected(io);
            }
        }
    }
}

impl MidiOut {
    pub fn try_new(client_name: &str) -> Result<Self, Error> {
        Ok(Self::Disconnected(midir::MidiOutput::new(client_name)?))
    }

    pub fn connect(
        &mut self,
        port_name: Arc<str>,
        port: &midir::MidiOutputPort,
        client_port_name: &str,
    ) -> Result<(), Error> {
        self.disconnect();

        let Self::Disconnected(midi_output) = std::mem::take(self) else {
            unreachable!("MIDI Out disconnected above");
        };

        match midi_output.connect(port, client_port_name) {
            Ok(conn) => {
                *self = Self::Connected(conn);
                Ok(())
            }
            Err(err) => {
                *self = Self::Disconnected(err.into_inner());
                let err = Error::PortConnection {
                    name: port_name,
                    direction: Direction::Out,
                };
                log::error!("{err}");
                Err(err)
            }
        }
    }

    pub fn send(&mut self, msg: &[u8]) -> Result<(), Error> {
        match self {
            Self::Connected(conn) => conn.send(msg).map_err(|source| {
                let msg = crate::bytes::Displayable::from(msg).to_owned();
                log::error!("Failed to send MIDI msg {msg}: {source}");
                Error::Send { msg, source }
            }),
            _ => {
                log::warn!("Attempt to send a msg, but MIDI Out is not connected");
                Err(Error::NotConnected)
            }
        }
    }

    pub fn disconnect(&mut self) {
        if self.is_connected() {
            if let Self::Connected(conn) = std::mem::take(self) {
                *self = Self::Disconnected(conn.close());
            }
        }
    }
}
