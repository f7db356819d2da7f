//! BLE events delivered by the radio stack.
//!
//! Stacks hand events over as an event code plus a packed record whose
//! shape depends on the code (and, on some stacks, on the stack version).
//! [`BleEvent::decode`] validates that record once; anything that does not
//! match a known shape becomes [`BleEvent::Unrecognized`] instead of a panic.
//!
//! Record layouts (little-endian):
//! ```text
//! CONNECT     conn_handle:u16 addr_type:u8 addr:[u8;6]
//! DISCONNECT  conn_handle:u16 [addr_type:u8 addr:[u8;6]]
//! GATTS_WRITE conn_handle:u16 attr_handle:u16
//! ```
//! Trailing bytes are ignored.

use super::{AttributeHandle, ConnectionHandle, PeerAddress};
use crate::error::DecodeError;

/// Event code: a central connected.
pub const EVT_CONNECT: u8 = 1;
/// Event code: a central disconnected.
pub const EVT_DISCONNECT: u8 = 2;
/// Event code: a client wrote a local characteristic.
pub const EVT_GATTS_WRITE: u8 = 3;

const HANDLE_LEN: usize = 2;
const ADDR_RECORD_LEN: usize = 1 + 6;
const CONNECT_LEN: usize = HANDLE_LEN + ADDR_RECORD_LEN;
const WRITE_LEN: usize = HANDLE_LEN * 2;

/// A decoded stack event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BleEvent {
    Connect {
        conn: ConnectionHandle,
        addr: PeerAddress,
    },
    /// `addr` is `None` when the stack only reported the handle.
    Disconnect {
        conn: ConnectionHandle,
        addr: Option<PeerAddress>,
    },
    CharacteristicWrite {
        conn: ConnectionHandle,
        attr: AttributeHandle,
    },
    /// Unknown code or a record that did not fit the code's layout.
    Unrecognized { code: u8, reason: DecodeError },
}

impl BleEvent {
    /// Decode a raw event record. Never fails: bad input yields
    /// [`BleEvent::Unrecognized`].
    pub fn decode(code: u8, data: Option<&[u8]>) -> Self {
        match Self::try_decode(code, data) {
            Ok(event) => event,
            Err(reason) => BleEvent::Unrecognized { code, reason },
        }
    }

    fn try_decode(code: u8, data: Option<&[u8]>) -> Result<Self, DecodeError> {
        if !matches!(code, EVT_CONNECT | EVT_DISCONNECT | EVT_GATTS_WRITE) {
            return Err(DecodeError::UnknownEvent(code));
        }
        let data = data.ok_or(DecodeError::MissingPayload)?;

        match code {
            EVT_CONNECT => {
                require(data, CONNECT_LEN)?;
                Ok(BleEvent::Connect {
                    conn: read_handle(data),
                    addr: read_addr(&data[HANDLE_LEN..]),
                })
            }
            EVT_DISCONNECT => {
                require(data, HANDLE_LEN)?;
                let addr = (data.len() >= CONNECT_LEN).then(|| read_addr(&data[HANDLE_LEN..]));
                Ok(BleEvent::Disconnect {
                    conn: read_handle(data),
                    addr,
                })
            }
            _ => {
                require(data, WRITE_LEN)?;
                Ok(BleEvent::CharacteristicWrite {
                    conn: read_handle(data),
                    attr: AttributeHandle(u16::from_le_bytes([data[2], data[3]])),
                })
            }
        }
    }

    /// Event code this event was (or would be) delivered with.
    pub fn code(&self) -> u8 {
        match self {
            BleEvent::Connect { .. } => EVT_CONNECT,
            BleEvent::Disconnect { .. } => EVT_DISCONNECT,
            BleEvent::CharacteristicWrite { .. } => EVT_GATTS_WRITE,
            BleEvent::Unrecognized { code, .. } => *code,
        }
    }
}

fn require(data: &[u8], expected: usize) -> Result<(), DecodeError> {
    if data.len() < expected {
        return Err(DecodeError::ShortPayload {
            expected: expected as u8,
            actual: data.len().min(u8::MAX as usize) as u8,
        });
    }
    Ok(())
}

fn read_handle(data: &[u8]) -> ConnectionHandle {
    ConnectionHandle(u16::from_le_bytes([data[0], data[1]]))
}

/// `record` starts with the address type followed by six octets in
/// on-air (little-endian) order.
fn read_addr(record: &[u8]) -> PeerAddress {
    let mut bytes = [0u8; 6];
    bytes.copy_from_slice(&record[1..ADDR_RECORD_LEN]);
    PeerAddress::from_le_bytes(record[0], bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONNECT_RECORD: [u8; 9] = [0x40, 0x00, 0x01, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11];

    #[test]
    fn decode_connect() {
        let event = BleEvent::decode(EVT_CONNECT, Some(&CONNECT_RECORD));
        assert_eq!(
            event,
            BleEvent::Connect {
                conn: ConnectionHandle(0x40),
                addr: PeerAddress::new(1, [0x11, 0x22, 0x33, 0x44, 0x55, 0x66]),
            }
        );
    }

    #[test]
    fn connect_address_renders_colon_hex() {
        let BleEvent::Connect { addr, .. } = BleEvent::decode(EVT_CONNECT, Some(&CONNECT_RECORD))
        else {
            panic!("expected connect");
        };
        assert_eq!(format!("{}", addr), "11:22:33:44:55:66");
    }

    #[test]
    fn short_connect_is_unrecognized() {
        let event = BleEvent::decode(EVT_CONNECT, Some(&CONNECT_RECORD[..5]));
        assert_eq!(
            event,
            BleEvent::Unrecognized {
                code: EVT_CONNECT,
                reason: DecodeError::ShortPayload {
                    expected: 9,
                    actual: 5
                },
            }
        );
    }

    #[test]
    fn disconnect_with_and_without_address() {
        let full = BleEvent::decode(EVT_DISCONNECT, Some(&CONNECT_RECORD));
        assert!(matches!(full, BleEvent::Disconnect { addr: Some(_), .. }));

        let handle_only = BleEvent::decode(EVT_DISCONNECT, Some(&[0x40, 0x00]));
        assert_eq!(
            handle_only,
            BleEvent::Disconnect {
                conn: ConnectionHandle(0x40),
                addr: None
            }
        );
    }

    #[test]
    fn disconnect_needs_a_handle() {
        let event = BleEvent::decode(EVT_DISCONNECT, Some(&[0x40]));
        assert!(matches!(event, BleEvent::Unrecognized { code: EVT_DISCONNECT, .. }));
    }

    #[test]
    fn decode_write() {
        let event = BleEvent::decode(EVT_GATTS_WRITE, Some(&[0x01, 0x00, 0x0C, 0x00]));
        assert_eq!(
            event,
            BleEvent::CharacteristicWrite {
                conn: ConnectionHandle(1),
                attr: AttributeHandle(12),
            }
        );
    }

    #[test]
    fn trailing_bytes_ignored() {
        let event = BleEvent::decode(EVT_GATTS_WRITE, Some(&[0x01, 0x00, 0x0C, 0x00, 0xFF, 0xFF]));
        assert_eq!(event.code(), EVT_GATTS_WRITE);
        assert!(matches!(event, BleEvent::CharacteristicWrite { .. }));
    }

    #[test]
    fn missing_payload_and_unknown_code() {
        assert_eq!(
            BleEvent::decode(EVT_GATTS_WRITE, None),
            BleEvent::Unrecognized {
                code: EVT_GATTS_WRITE,
                reason: DecodeError::MissingPayload
            }
        );
        assert_eq!(
            BleEvent::decode(42, Some(&CONNECT_RECORD)),
            BleEvent::Unrecognized {
                code: 42,
                reason: DecodeError::UnknownEvent(42)
            }
        );
    }
}
