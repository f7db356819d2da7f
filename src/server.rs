//! GATT table: one primary service with the TX and RX characteristics.

use ble_uart_led::config::{ServiceConfig, RX_MAX_LEN};
use ble_uart_led::{AttributeHandle, UartHandles};
use defmt::{debug, info};
use nrf_softdevice::ble::gatt_server::builder::ServiceBuilder;
use nrf_softdevice::ble::gatt_server::characteristic::{Attribute, Metadata, Properties};
use nrf_softdevice::ble::gatt_server::{self, RegisterError, WriteOp};
use nrf_softdevice::ble::{Connection, Uuid};
use nrf_softdevice::Softdevice;

pub struct UartServer {
    handles: UartHandles,
}

impl UartServer {
    /// Register the service. Must run before the SoftDevice task starts.
    pub fn new(sd: &mut Softdevice, config: &ServiceConfig) -> Result<Self, RegisterError> {
        let empty: &[u8] = &[];
        let mut sb = ServiceBuilder::new(sd, uuid(config.service_uuid))?;

        let tx = sb
            .add_characteristic(
                uuid(config.tx_uuid),
                Attribute::new(empty).variable_len(RX_MAX_LEN as u16),
                Metadata::new(Properties::new().read().notify()),
            )?
            .build();

        let rx = sb
            .add_characteristic(
                uuid(config.rx_uuid),
                Attribute::new(empty).variable_len(RX_MAX_LEN as u16),
                Metadata::new(Properties::new().write().write_without_response()),
            )?
            .build();

        let _service = sb.build();

        let handles = UartHandles {
            tx: AttributeHandle(tx.value_handle),
            rx: AttributeHandle(rx.value_handle),
        };
        info!(
            "UART service registered: tx={} (cccd {}) rx={}",
            tx.value_handle, tx.cccd_handle, rx.value_handle
        );
        Ok(Self { handles })
    }

    pub fn handles(&self) -> UartHandles {
        self.handles
    }
}

/// 128-bit UUIDs go to the SoftDevice little-endian.
fn uuid(value: u128) -> Uuid {
    Uuid::new_128(&value.to_le_bytes())
}

impl gatt_server::Server for UartServer {
    /// Handle of the attribute that was written. The value itself stays in
    /// the SoftDevice and is read back by the dispatcher.
    type Event = AttributeHandle;

    fn on_write(
        &self,
        _conn: &Connection,
        handle: u16,
        _op: WriteOp,
        _offset: usize,
        data: &[u8],
    ) -> Option<Self::Event> {
        debug!("GATT write: handle={} len={}", handle, data.len());
        Some(AttributeHandle(handle))
    }
}
