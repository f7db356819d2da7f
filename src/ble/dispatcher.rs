//! BLE event dispatcher.
//!
//! Single entry point for everything the radio stack reports. Runs in the
//! stack's event context, so nothing here blocks or waits: each event is
//! handled with at most one stack call plus a short critical section on the
//! connection set.
//!
//! Lifecycle:
//! ```text
//!   Idle --start()--> Advertising --Connect--> NotAdvertising
//!                          ^                        |
//!                          +-------Disconnect-------+
//! ```
//! No error leaves [`EventDispatcher::dispatch`]; failures are logged, the
//! most recent one is kept in [`EventDispatcher::last_error`], and the
//! peripheral keeps advertising.

use super::adv_payload::AdvertisingConfig;
use super::connections::ConnectionRegistry;
use super::events::BleEvent;
use super::{AttributeHandle, ConnectionHandle, PeerAddress, RadioStack, UartHandles};
use crate::config::RX_MAX_LEN;
use crate::error::{Error, StackError};
use crate::fmt::Hex;

/// Consumer of text written to the RX characteristic.
///
/// The message is already decoded and trimmed. It may be empty.
pub trait InboundHandler {
    fn on_message(&mut self, message: &str);
}

impl<F: FnMut(&str)> InboundHandler for F {
    fn on_message(&mut self, message: &str) {
        self(message)
    }
}

/// Handler that only logs what was received.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogInbound;

impl InboundHandler for LogInbound {
    fn on_message(&mut self, message: &str) {
        info!("RX: {}", message);
    }
}

/// Advertising as last requested from the stack.
///
/// `Advertising` means the stack accepted the request, not that the radio
/// is on air. A stack that advertises asynchronously reports a later
/// failure through [`EventDispatcher::advertising_failed`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdvertisingState {
    /// `start()` has not been called yet.
    Idle,
    Advertising,
    /// A central is connected, or the last advertise request failed.
    NotAdvertising,
}

pub struct EventDispatcher<'a, S: RadioStack, H: InboundHandler> {
    stack: &'a S,
    connections: &'a ConnectionRegistry,
    advertising: AdvertisingConfig<'a>,
    handles: UartHandles,
    handler: H,
    state: AdvertisingState,
    last_error: Option<Error>,
}

impl<'a, S: RadioStack, H: InboundHandler> EventDispatcher<'a, S, H> {
    pub fn new(
        stack: &'a S,
        connections: &'a ConnectionRegistry,
        advertising: AdvertisingConfig<'a>,
        handles: UartHandles,
        handler: H,
    ) -> Self {
        Self {
            stack,
            connections,
            advertising,
            handles,
            handler,
            state: AdvertisingState::Idle,
            last_error: None,
        }
    }

    /// Begin advertising with the configured name and UUID. Also used to
    /// ask again after [`advertising_failed`](Self::advertising_failed).
    pub fn start(&mut self) {
        self.advertise();
    }

    /// The stack accepted an advertise request but could not carry it out.
    pub fn advertising_failed(&mut self, e: StackError) {
        self.fail(Error::Stack(e));
        error!("Advertising failed: {}", e);
        self.state = AdvertisingState::NotAdvertising;
    }

    /// Decode a raw stack record and handle it.
    pub fn dispatch_raw(&mut self, code: u8, data: Option<&[u8]>) {
        self.dispatch(BleEvent::decode(code, data));
    }

    pub fn dispatch(&mut self, event: BleEvent) {
        match event {
            BleEvent::Connect { conn, addr } => self.on_connect(conn, addr),
            BleEvent::Disconnect { conn, addr } => self.on_disconnect(conn, addr),
            BleEvent::CharacteristicWrite { conn, attr } => self.on_write(conn, attr),
            BleEvent::Unrecognized { code, reason } => {
                let e = self.fail(reason.into());
                warn!("Ignoring event {}: {}", code, e);
            }
        }
    }

    pub fn advertising_state(&self) -> AdvertisingState {
        self.state
    }

    /// Most recent failure handled, if any. Never cleared.
    pub fn last_error(&self) -> Option<Error> {
        self.last_error
    }

    pub fn handles(&self) -> UartHandles {
        self.handles
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    fn on_connect(&mut self, conn: ConnectionHandle, addr: PeerAddress) {
        info!("New connection {} from {}", conn, addr);
        // The stack stops advertising once a central connects.
        self.state = AdvertisingState::NotAdvertising;

        match self.connections.add(conn) {
            Ok(true) => {}
            Ok(false) => debug!("Connection {} already tracked", conn),
            Err(e) => {
                self.fail(e);
                warn!("Not tracking connection {}: {}", conn, e);
            }
        }
    }

    fn on_disconnect(&mut self, conn: ConnectionHandle, addr: Option<PeerAddress>) {
        match addr {
            Some(addr) => info!("Disconnected {} ({})", conn, addr),
            None => info!("Disconnected {}", conn),
        }
        if !self.connections.remove(conn) {
            debug!("Connection {} was not tracked", conn);
        }
        self.advertise();
    }

    fn on_write(&mut self, conn: ConnectionHandle, attr: AttributeHandle) {
        if attr != self.handles.rx {
            trace!("Write to attribute {} ignored", attr);
            return;
        }

        let mut buf = [0u8; RX_MAX_LEN];
        match read_text(self.stack, attr, &mut buf) {
            Ok(text) => {
                let message = text.trim();
                debug!("RX from {}: {}", conn, message);
                self.handler.on_message(message);
            }
            Err(e) => {
                self.fail(e);
                warn!("Dropping RX from connection {}: {}", conn, e);
            }
        }
    }

    fn advertise(&mut self) {
        let payload = self.advertising.payload();
        info!(
            "Advertising as {} (payload {})",
            self.advertising.name,
            Hex(payload.as_bytes())
        );

        match self.stack.advertise(payload.as_bytes()) {
            Ok(()) => self.state = AdvertisingState::Advertising,
            Err(e) => {
                let e = self.fail(e.into());
                error!("Advertising request rejected: {}", e);
                self.state = AdvertisingState::NotAdvertising;
            }
        }
    }

    fn fail(&mut self, e: Error) -> Error {
        self.last_error = Some(e);
        e
    }
}

/// Read `attr` into `buf` and decode it. Anything the stack reports past
/// `buf.len()` is dropped.
fn read_text<'b, S: RadioStack>(
    stack: &S,
    attr: AttributeHandle,
    buf: &'b mut [u8],
) -> Result<&'b str, Error> {
    let len = stack.read_attribute(attr, buf)?.min(buf.len());
    Ok(core::str::from_utf8(&buf[..len])?)
}
