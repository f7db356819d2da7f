//! Application-wide constants and compile-time configuration.
//!
//! Device identity, GATT UUIDs, timing parameters and capacities live here so
//! they can be tuned in one place. The UUIDs must match the ones the client
//! (web page / app) looks for.

use crate::ble::adv_payload::AdvertisingConfig;

// BLE identity

/// Advertised Complete Local Name (also the GAP device name).
pub const DEVICE_NAME: &str = "PicoW_BLE";

/// 16-bit service UUID listed in the advertising payload.
pub const ADV_SERVICE_UUID_16: u16 = 0xFFE0;

/// UART service UUID.
pub const SERVICE_UUID: u128 = 0x0000ffe0_0000_1000_8000_0080000b34fb;

/// TX characteristic (read + notify): peripheral → client.
pub const TX_CHAR_UUID: u128 = 0x0000ffe1_0000_1000_8000_0080000b34fb;

/// RX characteristic (write + write without response): client → peripheral.
pub const RX_CHAR_UUID: u128 = 0x0000ffe2_0000_1000_8000_0080000b34fb;

// BLE link parameters

/// Advertising interval (in 0.625 ms units). 160 = 100 ms.
pub const ADV_INTERVAL: u32 = 160;

/// ATT MTU negotiated with the SoftDevice.
pub const ATT_MTU: u16 = 247;

/// Maximum characteristic value length for TX and RX (bytes).
/// ATT_MTU minus the 3-byte ATT header.
pub const RX_MAX_LEN: usize = ATT_MTU as usize - 3;

/// Maximum number of connection handles tracked at once.
pub const MAX_CONNECTIONS: usize = 4;

// LED

/// nRF52840-DK LEDs are wired active-low (LOW = lit).
pub const LED_ACTIVE_LOW: bool = true;

/// Confirmation notified back after `led_on`.
pub const LED_ON_CONFIRMATION: &str = "LED turned ON";

/// Confirmation notified back after `led_off`.
pub const LED_OFF_CONFIRMATION: &str = "LED turned OFF";

// Diagnostics

/// Interval between heartbeat log lines (seconds).
pub const HEARTBEAT_SECS: u64 = 10;

/// Delay before re-requesting advertising after the stack refused it (ms).
pub const ADV_RETRY_MS: u64 = 1000;

/// Everything the peripheral needs at construction time.
#[derive(Clone, Copy, Debug)]
pub struct ServiceConfig {
    /// Advertised device name.
    pub device_name: &'static str,
    /// Optional 16-bit UUID placed in the advertising payload.
    pub adv_service_uuid16: Option<u16>,
    /// 128-bit UUID of the GATT service.
    pub service_uuid: u128,
    /// 128-bit UUID of the TX characteristic.
    pub tx_uuid: u128,
    /// 128-bit UUID of the RX characteristic.
    pub rx_uuid: u128,
}

impl ServiceConfig {
    /// Advertising parameters derived from this configuration.
    pub const fn advertising(&self) -> AdvertisingConfig<'static> {
        AdvertisingConfig {
            name: self.device_name,
            service_uuid16: self.adv_service_uuid16,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            device_name: DEVICE_NAME,
            adv_service_uuid16: Some(ADV_SERVICE_UUID_16),
            service_uuid: SERVICE_UUID,
            tx_uuid: TX_CHAR_UUID,
            rx_uuid: RX_CHAR_UUID,
        }
    }
}
