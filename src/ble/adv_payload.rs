//! Advertising payload builder.
//!
//! Produces the raw advertising data as a sequence of AD structures, each
//! laid out as `[length][type][value...]` where `length` counts the type
//! octet plus the value:
//!
//! ```text
//! 02 01 06                 Flags: LE General Discoverable, BR/EDR not supported
//! len 09 <name bytes>      Complete Local Name
//! 03 03 <uuid lo> <uuid hi>  Complete List of 16-bit Service UUIDs (optional)
//! ```
//!
//! The builder has no error path. Keeping the total within the stack's
//! limit (31 bytes for legacy advertising) is the caller's job; see
//! [`AdvertisingPayload::fits_legacy`].

use heapless::Vec;

/// AD type: Flags.
pub const AD_TYPE_FLAGS: u8 = 0x01;
/// AD type: Complete List of 16-bit Service Class UUIDs.
pub const AD_TYPE_COMPLETE_UUID16: u8 = 0x03;
/// AD type: Complete Local Name.
pub const AD_TYPE_COMPLETE_NAME: u8 = 0x09;

/// LE General Discoverable Mode | BR/EDR Not Supported.
pub const FLAGS_GENERAL_DISC_LE_ONLY: u8 = 0x06;

/// Legacy advertising data limit (bytes).
pub const LEGACY_ADV_DATA_LEN: usize = 31;

/// Longest value an AD structure can carry (its length octet also counts
/// the type octet).
pub const MAX_AD_VALUE_LEN: usize = 254;

/// Room for flags (3) + the longest possible name (2 + 254) + one UUID16 (4).
pub const ADV_PAYLOAD_CAPACITY: usize = 3 + 2 + MAX_AD_VALUE_LEN + 4;

/// Inputs of the builder, kept by the dispatcher so every re-advertise
/// reuses the configured name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdvertisingConfig<'a> {
    /// Complete Local Name. Keep it short (≤ 22 bytes with a UUID) to stay
    /// within legacy advertising.
    pub name: &'a str,
    /// Optional 16-bit service UUID.
    pub service_uuid16: Option<u16>,
}

impl AdvertisingConfig<'_> {
    pub fn payload(&self) -> AdvertisingPayload {
        AdvertisingPayload::build(self.name, self.service_uuid16)
    }
}

/// Raw advertising data bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdvertisingPayload {
    bytes: Vec<u8, ADV_PAYLOAD_CAPACITY>,
}

impl AdvertisingPayload {
    /// Build the payload for `name` and an optional 16-bit service UUID.
    ///
    /// Deterministic and side-effect free. A name longer than
    /// [`MAX_AD_VALUE_LEN`] bytes is cut at the last UTF-8 boundary that fits.
    pub fn build(name: &str, service_uuid16: Option<u16>) -> Self {
        let mut bytes = Vec::new();

        // Every push below stays within ADV_PAYLOAD_CAPACITY by construction.
        let _ = bytes.extend_from_slice(&[2, AD_TYPE_FLAGS, FLAGS_GENERAL_DISC_LE_ONLY]);

        let name = truncate_utf8(name, MAX_AD_VALUE_LEN);
        let _ = bytes.extend_from_slice(&[name.len() as u8 + 1, AD_TYPE_COMPLETE_NAME]);
        let _ = bytes.extend_from_slice(name.as_bytes());

        if let Some(uuid) = service_uuid16 {
            let [lo, hi] = uuid.to_le_bytes();
            let _ = bytes.extend_from_slice(&[3, AD_TYPE_COMPLETE_UUID16, lo, hi]);
        }

        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// True when the payload fits a legacy (31-byte) advertisement.
    pub fn fits_legacy(&self) -> bool {
        self.bytes.len() <= LEGACY_ADV_DATA_LEN
    }
}

impl AsRef<[u8]> for AdvertisingPayload {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

fn truncate_utf8(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests (run on host, not embedded)
// ═══════════════════════════════════════════════════════════════════════════
