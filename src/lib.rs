//! ble-uart-led: BLE peripheral with a UART-like GATT service that
//! switches an LED.
//!
//! The library holds everything that does not touch the radio directly and
//! therefore runs on the host:
//!
//! - advertising payload building and parsing
//! - connection tracking shared between contexts
//! - decoding and dispatching stack events
//! - TX notification broadcast
//! - the `led_on` / `led_off` command interpreter
//!
//! Usage: `cargo test` (host) or `cargo build --release --features embedded`
//! for the nRF52840 firmware.
//!
//! The radio sits behind [`ble::RadioStack`]; the firmware binary
//! (`src/main.rs`) implements it over the Nordic SoftDevice.

#![cfg_attr(not(test), no_std)]

// Must come first so the logging macros are visible to every module.
mod fmt;

// ═══════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════

pub mod ble;
pub mod command;
pub mod config;
pub mod error;
pub mod led;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports
// ═══════════════════════════════════════════════════════════════════════════

pub use ble::connections::ConnectionRegistry;
pub use ble::dispatcher::{AdvertisingState, EventDispatcher, InboundHandler, LogInbound};
pub use ble::events::BleEvent;
pub use ble::notifier::{Notifier, NotifyReport};
pub use ble::{AttributeHandle, ConnectionHandle, PeerAddress, RadioStack, UartHandles};
pub use command::{Command, CommandInterpreter};
pub use error::{DecodeError, Error, StackError};
pub use fmt::Hex;
pub use led::StatusLed;
