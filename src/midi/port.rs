use parking_lot::Mutex;
use std::{collections::BTreeMap, fmt, sync::Arc};

use super::{io, Error, InboundHandler, Msg, Transport};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Direction {
    pub fn as_str(&self) -> &str {
        match self {
            Direction::In => "In Port",
            Direction::Out => "Out Port",
        }
    }
}

/// Finds the port matching `name` in `ports`.
///
/// Exact matches win. Otherwise, the first port whose name starts with `name`
/// is selected: some backends decorate port names with client & port numbers,
/// e.g. `X-Touch-Ext:X-Touch-Ext MIDI 1 20:0`.
fn find<'a, P>(ports: &'a BTreeMap<Arc<str>, P>, name: &str) -> Option<(&'a Arc<str>, &'a P)> {
    ports.get_key_value(name).or_else(|| {
        ports.iter().find(|(port_name, _)| port_name.starts_with(name))
    })
}

pub struct DirectionalPorts<IO: midir::MidiIO, Conn> {
    direction: Direction,
    map: BTreeMap<Arc<str>, IO::Port>,
    cur: Option<Arc<str>>,
    midi_conn: io::Connection<IO, Conn>,
    client_name: Arc<str>,
}

pub type PortsIn = DirectionalPorts<midir::MidiInput, midir::MidiInputConnection<()>>;
pub type PortsOut = DirectionalPorts<midir::MidiOutput, midir::MidiOutputConnection>;

impl<IO: midir::MidiIO, Conn> DirectionalPorts<IO, Conn> {
    fn refresh_from(&mut self, io: IO) -> Result<(), Error> {
        self.map.clear();

        for port in io.ports().iter() {
            let name = io.port_name(port)?;
            // Don't list our own ports
            if !name.starts_with(self.client_name.as_ref()) {
                self.map.insert(name.into(), port.clone());
            }
        }

        log::trace!(
            "MIDI {}s: {:?}",
            self.direction,
            self.map.keys().collect::<Vec<_>>()
        );

        Ok(())
    }

    fn resolve(&self, name: &str) -> Result<(Arc<str>, IO::Port), Error> {
        let Some((port_name, port)) = find(&self.map, name) else {
            log::warn!(
                "No MIDI {} matching {name}. Available: {:?}",
                self.direction,
                self.map.keys().collect::<Vec<_>>()
            );

            return Err(Error::PortNotFound {
                name: name.into(),
                direction: self.direction,
            });
        };

        Ok((port_name.clone(), port.clone()))
    }
}

impl PortsIn {
    pub fn try_new(client_name: Arc<str>) -> Result<Self, Error> {
        Ok(Self {
            direction: Direction::In,
            map: BTreeMap::new(),
            cur: None,
            midi_conn: io::MidiIn::try_new(&client_name)?,
            client_name,
        })
    }

    pub fn refresh(&mut self) -> Result<(), Error> {
        let temp_conn = midir::MidiInput::new(&format!("{} refresh In ports", self.client_name))?;
        self.refresh_from(temp_conn)
    }

    pub fn connect(
        &mut self,
        port_name: Arc<str>,
        port: &midir::MidiInputPort,
        handler: InboundHandler,
    ) -> Result<(), Error> {
        self.midi_conn
            .connect(port_name.clone(), port, &self.client_name, handler)
            .map_err(|err| {
                self.cur = None;
                err
            })?;

        log::info!("Connected for Input to {port_name}");
        self.cur = Some(port_name);

        Ok(())
    }

    pub fn disconnect(&mut self) {
        self.midi_conn.disconnect();

        if let Some(cur) = self.cur.take() {
            log::debug!("Disconnected Input from {cur}");
        }
    }
}

impl PortsOut {
    pub fn try_new(client_name: Arc<str>) -> Result<Self, Error> {
        Ok(Self {
            direction: Direction::Out,
            map: BTreeMap::new(),
            cur: None,
            midi_conn: io::MidiOut::try_new(&client_name)?,
            client_name,
        })
    }

    pub fn refresh(&mut self) -> Result<(), Error> {
        let temp_conn =
            midir::MidiOutput::new(&format!("{} refresh Out ports", self.client_name))?;
        self.refresh_from(temp_conn)
    }

    pub fn connect(
        &mut self,
        port_name: Arc<str>,
        port: &midir::MidiOutputPort,
    ) -> Result<(), Error> {
        self.midi_conn
            .connect(port_name.clone(), port, &self.client_name)
            .map_err(|err| {
                self.cur = None;
                err
            })?;

        log::info!("Connected for Output to {port_name}");
        self.cur = Some(port_name);

        Ok(())
    }

    pub fn send(&mut self, msg: &Msg) -> Result<(), Error> {
        self.midi_conn.send(msg)
    }

    pub fn disconnect(&mut self) {
        self.midi_conn.disconnect();

        if let Some(cur) = self.cur.take() {
            log::debug!("Disconnected Output from {cur}");
        }
    }
}

/// [`Transport`] over a pair of midir in & out ports sharing the same name.
pub struct InOutPorts {
    ins: Mutex<PortsIn>,
    outs: Mutex<PortsOut>,
}

impl InOutPorts {
    pub fn try_new(client_name: impl Into<Arc<str>>) -> Result<Self, Error> {
        let client_name = client_name.into();

        Ok(Self {
            ins: Mutex::new(PortsIn::try_new(client_name.clone())?),
            outs: Mutex::new(PortsOut::try_new(client_name)?),
        })
    }
}

impl Transport for InOutPorts {
    fn open(&self, port_name: &str, handler: InboundHandler) -> Result<(), Error> {
        let mut ins = self.ins.lock();
        ins.refresh()?;
        let (in_name, in_port) = ins.resolve(port_name)?;

        let mut outs = self.outs.lock();
        outs.refresh()?;
        let (out_name, out_port) = outs.resolve(port_name)?;

        // Listen first: the device may talk as soon as we connect.
        ins.connect(in_name, &in_port, handler)?;

        if let Err(err) = outs.connect(out_name, &out_port) {
            ins.disconnect();
            return Err(err);
        }

        Ok(())
    }

    fn send(&self, msg: &Msg) -> Result<(), Error> {
        self.outs.lock().send(msg)
    }

    fn close(&self) {
        self.ins.lock().disconnect();
        self.outs.lock().disconnect();
    }
}
