//! In-memory [`Transport`] for tests.

use parking_lot::Mutex;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

use super::{Direction, Error, InboundHandler, Msg, Transport};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Availability {
    Present,
    MissingOut,
    MissingIn,
    InUse,
}

pub struct MockTransport {
    port_name: Arc<str>,
    availability: Availability,
    handler: Mutex<Option<InboundHandler>>,
    is_listening: AtomicBool,
    fails_sending: AtomicBool,
    sent: Mutex<Vec<Msg>>,
    opens: AtomicUsize,
    closes: AtomicUsize,
}

impl MockTransport {
    pub fn new(port_name: &str) -> Arc<Self> {
        Self::with_availability(port_name, Availability::Present)
    }

    pub fn with_availability(port_name: &str, availability: Availability) -> Arc<Self> {
        Arc::new(Self {
            port_name: port_name.into(),
            availability,
            handler: Mutex::new(None),
            is_listening: AtomicBool::new(false),
            fails_sending: AtomicBool::new(false),
            sent: Mutex::new(Vec::new()),
            opens: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
        })
    }

    /// Delivers `buf` as if it was received from the device.
    ///
    /// Handlers may send, but must not close the transport.
    pub fn inject(&self, buf: &[u8]) {
        if let Some(handler) = self.handler.lock().as_mut() {
            handler(buf);
        }
    }

    pub fn is_listening(&self) -> bool {
        self.is_listening.load(Ordering::SeqCst)
    }

    pub fn fail_sending(&self, fails: bool) {
        self.fails_sending.store(fails, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<Msg> {
        self.sent.lock().clone()
    }

    pub fn take_sent(&self) -> Vec<Msg> {
        std::mem::take(&mut *self.sent.lock())
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl Transport for MockTransport {
    fn open(&self, port_name: &str, handler: InboundHandler) -> Result<(), Error> {
        let not_found = |direction| Error::PortNotFound {
            name: port_name.into(),
            direction,
        };

        if port_name != self.port_name.as_ref() {
            return Err(not_found(Direction::In));
        }

        match self.availability {
            Availability::Present => (),
            Availability::MissingIn => return Err(not_found(Direction::In)),
            Availability::MissingOut => return Err(not_found(Direction::Out)),
            Availability::InUse => {
                return Err(Error::PortConnection {
                    name: port_name.into(),
                    direction: Direction::In,
                })
            }
        }

        self.opens.fetch_add(1, Ordering::SeqCst);
        *self.handler.lock() = Some(handler);
        self.is_listening.store(true, Ordering::SeqCst);

        Ok(())
    }

    fn send(&self, msg: &Msg) -> Result<(), Error> {
        if !self.is_listening() || self.fails_sending.load(Ordering::SeqCst) {
            return Err(Error::NotConnected);
        }

        self.sent.lock().push(msg.clone());

        Ok(())
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
        self.is_listening.store(false, Ordering::SeqCst);
        self.handler.lock().take();
    }
}
