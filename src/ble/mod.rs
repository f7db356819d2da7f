//! Bluetooth Low Energy subsystem.
//!
//! This module implements the **Peripheral** side of a UART-like GATT
//! service (one notify-capable TX characteristic, one writable RX
//! characteristic):
//!
//! 1. **Advertising payload** - builds the raw AD structures the stack
//!    transmits while the device is discoverable.
//! 2. **Connection set** - tracks the handles of currently open links.
//! 3. **Event dispatcher** - consumes connect / disconnect / write events
//!    delivered by the radio stack and re-advertises after a disconnect.
//! 4. **Notifier** - pushes a message to every tracked connection.
//!
//! The radio stack itself sits behind the [`RadioStack`] trait; the
//! firmware binary implements it over the Nordic SoftDevice.

pub mod adv_payload;
pub mod connections;
pub mod dispatcher;
pub mod events;
pub mod notifier;


use core::fmt;

use crate::error::StackError;

/// Identifier the radio stack assigns to an open link.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConnectionHandle(pub u16);

/// Handle of a GATT attribute (characteristic value, CCCD, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AttributeHandle(pub u16);

impl fmt::Display for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for AttributeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Value handles of the UART service characteristics, fixed at
/// registration time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartHandles {
    /// TX (read + notify).
    pub tx: AttributeHandle,
    /// RX (write + write without response).
    pub rx: AttributeHandle,
}

/// BLE device address of a peer.
///
/// `bytes` holds the most significant octet first, i.e. display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PeerAddress {
    /// Address type as reported by the stack (public, random static, ...).
    pub kind: u8,
    pub bytes: [u8; 6],
}

impl PeerAddress {
    pub const fn new(kind: u8, bytes: [u8; 6]) -> Self {
        Self { kind, bytes }
    }

    /// Build from the little-endian octet order used on air and by the
    /// SoftDevice.
    pub fn from_le_bytes(kind: u8, mut bytes: [u8; 6]) -> Self {
        bytes.reverse();
        Self { kind, bytes }
    }
}

/// Renders `AA:BB:CC:DD:EE:FF`.
impl fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.bytes.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{:02X}", b)?;
        }
        Ok(())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PeerAddress {
    fn format(&self, f: defmt::Formatter) {
        let b = &self.bytes;
        defmt::write!(
            f,
            "{=u8:02X}:{=u8:02X}:{=u8:02X}:{=u8:02X}:{=u8:02X}:{=u8:02X}",
            b[0],
            b[1],
            b[2],
            b[3],
            b[4],
            b[5]
        );
    }
}

/// Primitives the peripheral needs from the radio stack.
///
/// Implementations must not block: the dispatcher calls them from the
/// stack's event context.
pub trait RadioStack {
    /// Begin (or restart) connectable advertising with a raw AD payload.
    fn advertise(&self, payload: &[u8]) -> Result<(), StackError>;

    /// Copy the current value of `attr` into `buf`, returning its length.
    fn read_attribute(&self, attr: AttributeHandle, buf: &mut [u8]) -> Result<usize, StackError>;

    /// Send a notification of `data` on `attr` to one connection.
    fn notify(
        &self,
        conn: ConnectionHandle,
        attr: AttributeHandle,
        data: &[u8],
    ) -> Result<(), StackError>;
}
