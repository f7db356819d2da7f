//! [`RadioStack`] over the Nordic SoftDevice.
//!
//! The SoftDevice has no "start advertising now" call that returns
//! immediately: `advertise_connectable` is an async call that only resolves
//! on connection. So `advertise` here just hands the payload to the
//! advertising loop in `main.rs` through a [`Signal`], which keeps the
//! dispatcher non-blocking.

use ble_uart_led::ble::adv_payload::LEGACY_ADV_DATA_LEN;
use ble_uart_led::{AttributeHandle, ConnectionHandle, RadioStack, StackError};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use heapless::Vec;
use nrf_softdevice::ble::gatt_server::{self, GetValueError, NotifyValueError};
use nrf_softdevice::ble::peripheral::AdvertiseError;
use nrf_softdevice::ble::Connection;
use nrf_softdevice::{RawError, Softdevice};

/// Raw advertising data accepted by legacy advertising.
pub type AdvData = Vec<u8, LEGACY_ADV_DATA_LEN>;

pub struct SoftdeviceStack {
    sd: &'static Softdevice,
    adv_request: Signal<CriticalSectionRawMutex, AdvData>,
}

impl SoftdeviceStack {
    pub fn new(sd: &'static Softdevice) -> Self {
        Self {
            sd,
            adv_request: Signal::new(),
        }
    }

    pub fn softdevice(&self) -> &'static Softdevice {
        self.sd
    }

    /// Wait for the next advertise request.
    pub async fn next_advertisement(&self) -> AdvData {
        self.adv_request.wait().await
    }
}

impl RadioStack for SoftdeviceStack {
    fn advertise(&self, payload: &[u8]) -> Result<(), StackError> {
        let data = AdvData::from_slice(payload).map_err(|_| StackError::PayloadTooLarge)?;
        self.adv_request.signal(data);
        Ok(())
    }

    fn read_attribute(&self, attr: AttributeHandle, buf: &mut [u8]) -> Result<usize, StackError> {
        gatt_server::get_value(self.sd, attr.0, buf).map_err(get_value_error)
    }

    fn notify(
        &self,
        conn: ConnectionHandle,
        attr: AttributeHandle,
        data: &[u8],
    ) -> Result<(), StackError> {
        let conn = Connection::from_handle(conn.0).ok_or(StackError::Disconnected)?;
        gatt_server::notify_value(&conn, attr.0, data).map_err(notify_error)
    }
}

fn raw_error(e: RawError) -> StackError {
    StackError::Raw(e as u32)
}

fn get_value_error(e: GetValueError) -> StackError {
    match e {
        GetValueError::Raw(raw) => raw_error(raw),
        #[allow(unreachable_patterns)]
        _ => StackError::InvalidAttribute,
    }
}

/// `NoFreeConn` / `Timeout`: the SoftDevice could not take a link right now.
pub fn advertise_error(e: AdvertiseError) -> StackError {
    match e {
        AdvertiseError::Raw(raw) => raw_error(raw),
        _ => StackError::Busy,
    }
}

fn notify_error(e: NotifyValueError) -> StackError {
    match e {
        NotifyValueError::Disconnected => StackError::Disconnected,
        NotifyValueError::Raw(raw) => raw_error(raw),
    }
}
