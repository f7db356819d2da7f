//! Unified error types for ble-uart-led.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` (behind the `defmt` feature) for efficient
//! on-target logging.
//!
//! None of these errors is fatal: the dispatcher and notifier report them
//! and carry on, so the peripheral stays advertising and connectable.

use core::fmt;

/// Top-level error type used across the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The radio stack rejected an operation.
    Stack(StackError),

    /// A stack event could not be decoded into a known event.
    Decode(DecodeError),

    /// Bytes written to RX were not valid UTF-8.
    InvalidUtf8,

    /// The connection set is at capacity.
    ConnectionSetFull,

    /// Inbound text did not match any known command.
    UnknownCommand,

    /// The LED GPIO driver reported a failure.
    Gpio,
}

/// Subset of radio stack failures we propagate (keeps the enum `Copy`-friendly).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StackError {
    /// Raw error code from the stack.
    Raw(u32),
    /// The connection handle no longer refers to an open link.
    Disconnected,
    /// The stack cannot take the operation right now (e.g. no free link).
    Busy,
    /// The advertising payload exceeds the stack's size limit.
    PayloadTooLarge,
    /// The attribute handle is not registered.
    InvalidAttribute,
}

/// Why a raw stack event could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// The event code is not one the dispatcher handles.
    UnknownEvent(u8),
    /// The event arrived without any payload.
    MissingPayload,
    /// The payload is shorter than the event kind requires.
    ShortPayload { expected: u8, actual: u8 },
}

// Convenience conversions

impl From<StackError> for Error {
    fn from(e: StackError) -> Self {
        Error::Stack(e)
    }
}

impl From<DecodeError> for Error {
    fn from(e: DecodeError) -> Self {
        Error::Decode(e)
    }
}

impl From<core::str::Utf8Error> for Error {
    fn from(_: core::str::Utf8Error) -> Self {
        Error::InvalidUtf8
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Stack(e) => write!(f, "radio stack error: {}", e),
            Error::Decode(e) => write!(f, "malformed event: {}", e),
            Error::InvalidUtf8 => f.write_str("received bytes are not valid UTF-8"),
            Error::ConnectionSetFull => f.write_str("connection set full"),
            Error::UnknownCommand => f.write_str("unknown command"),
            Error::Gpio => f.write_str("GPIO write failed"),
        }
    }
}

impl fmt::Display for StackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackError::Raw(code) => write!(f, "raw error 0x{:x}", code),
            StackError::Disconnected => f.write_str("connection closed"),
            StackError::Busy => f.write_str("stack busy"),
            StackError::PayloadTooLarge => f.write_str("advertising payload too large"),
            StackError::InvalidAttribute => f.write_str("invalid attribute handle"),
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::UnknownEvent(code) => write!(f, "unknown event code {}", code),
            DecodeError::MissingPayload => f.write_str("missing payload"),
            DecodeError::ShortPayload { expected, actual } => {
                write!(f, "payload too short ({} < {} bytes)", actual, expected)
            }
        }
    }
}
