//! ble-uart-led firmware for the nRF52840 (SoftDevice S140).
//!
//! Advertises as `PicoW_BLE`, exposes the UART service and switches LED1
//! on `led_on` / `led_off` written to RX. Confirmations go out on TX.
//!
//! Tasks:
//! - `softdevice_task`: runs the SoftDevice event loop
//! - `ble_task`: advertising / connection loop feeding the event dispatcher
//! - main: heartbeat

#![no_std]
#![no_main]

mod server;
mod softdevice;

use core::mem;

use ble_uart_led::config::{
    ServiceConfig, ADV_INTERVAL, ADV_RETRY_MS, ATT_MTU, DEVICE_NAME, HEARTBEAT_SECS,
    LED_ACTIVE_LOW, MAX_CONNECTIONS,
};
use ble_uart_led::{
    BleEvent, CommandInterpreter, ConnectionHandle, ConnectionRegistry, EventDispatcher, Notifier,
    PeerAddress, StatusLed,
};
use defmt::{debug, error, info, unwrap, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_nrf::gpio::{Level, Output, OutputDrive};
use embassy_nrf::interrupt::Priority;
use embassy_time::Timer;
use nrf_softdevice::ble::{gatt_server, peripheral, AddressType};
use nrf_softdevice::{raw, Softdevice};
use panic_probe as _;
use static_cell::StaticCell;

use crate::server::UartServer;
use crate::softdevice::{advertise_error, SoftdeviceStack};

type Interpreter = CommandInterpreter<'static, Output<'static>, SoftdeviceStack>;
type Dispatcher = EventDispatcher<'static, SoftdeviceStack, Interpreter>;

static CONNECTIONS: ConnectionRegistry = ConnectionRegistry::new();
static STACK: StaticCell<SoftdeviceStack> = StaticCell::new();
static NOTIFIER: StaticCell<Notifier<'static, SoftdeviceStack>> = StaticCell::new();
static SERVER: StaticCell<UartServer> = StaticCell::new();

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("ble-uart-led starting");

    // SoftDevice reserves priorities 0, 1 and 4.
    let mut nrf_config = embassy_nrf::config::Config::default();
    nrf_config.gpiote_interrupt_priority = Priority::P2;
    nrf_config.time_interrupt_priority = Priority::P2;
    let p = embassy_nrf::init(nrf_config);

    // LED1 on the nRF52840-DK, active-low: HIGH = off.
    let led_pin = Output::new(p.P0_13, Level::High, OutputDrive::Standard);

    let sd_config = nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t { att_mtu: ATT_MTU }),
        gatts_attr_tab_size: Some(raw::ble_gatts_cfg_attr_tab_size_t {
            attr_tab_size: raw::BLE_GATTS_ATTR_TAB_SIZE_DEFAULT,
        }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 1,
            central_role_count: 0,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: DEVICE_NAME.as_ptr() as _,
            current_len: DEVICE_NAME.len() as u16,
            max_len: DEVICE_NAME.len() as u16,
            write_perm: unsafe { mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    };

    let service = ServiceConfig::default();
    let sd = Softdevice::enable(&sd_config);
    let server: &'static UartServer = SERVER.init(unwrap!(UartServer::new(sd, &service)));
    let sd: &'static Softdevice = sd;
    unwrap!(spawner.spawn(softdevice_task(sd)));

    let handles = server.handles();
    let stack: &'static SoftdeviceStack = STACK.init(SoftdeviceStack::new(sd));
    let notifier: &'static Notifier<'static, SoftdeviceStack> =
        NOTIFIER.init(Notifier::new(stack, &CONNECTIONS, handles.tx));

    let led = StatusLed::new(led_pin, LED_ACTIVE_LOW);
    let interpreter = CommandInterpreter::new(led, Some(notifier));
    let dispatcher = EventDispatcher::new(
        stack,
        &CONNECTIONS,
        service.advertising(),
        handles,
        interpreter,
    );

    unwrap!(spawner.spawn(ble_task(stack, server, dispatcher)));

    loop {
        Timer::after_secs(HEARTBEAT_SECS).await;
        info!(
            "Heartbeat: {}/{} connection(s)",
            CONNECTIONS.len(),
            MAX_CONNECTIONS
        );
    }
}

/// Advertising / connection loop.
///
/// Translates what the SoftDevice reports (connection established, GATT
/// write, link closed) into [`BleEvent`]s for the dispatcher. The dispatcher
/// requests every advertisement itself, starting with `start()`, and is told
/// when the SoftDevice fails one so its state stays accurate.
#[embassy_executor::task]
async fn ble_task(
    stack: &'static SoftdeviceStack,
    server: &'static UartServer,
    mut dispatcher: Dispatcher,
) {
    let sd = stack.softdevice();
    dispatcher.start();

    loop {
        let payload = stack.next_advertisement().await;

        let config = peripheral::Config {
            interval: ADV_INTERVAL,
            ..Default::default()
        };
        let adv = peripheral::ConnectableAdvertisement::ScannableUndirected {
            adv_data: &payload,
            scan_data: &[],
        };

        let conn = match peripheral::advertise_connectable(sd, adv, &config).await {
            Ok(conn) => conn,
            Err(e) => {
                error!("advertise_connectable failed: {:?}", e);
                dispatcher.advertising_failed(advertise_error(e));
                Timer::after_millis(ADV_RETRY_MS).await;
                dispatcher.start();
                continue;
            }
        };

        let Some(raw_handle) = conn.handle() else {
            // Closed before we could look at it.
            warn!("Connection gone before setup, advertising again");
            dispatcher.start();
            continue;
        };
        let handle = ConnectionHandle(raw_handle);
        let peer = conn.peer_address();
        let addr = PeerAddress::from_le_bytes(address_kind(peer.address_type()), peer.bytes());

        dispatcher.dispatch(BleEvent::Connect { conn: handle, addr });

        let reason = gatt_server::run(&conn, server, |attr| {
            dispatcher.dispatch(BleEvent::CharacteristicWrite { conn: handle, attr });
        })
        .await;
        debug!("GATT server stopped: {:?}", reason);

        dispatcher.dispatch(BleEvent::Disconnect {
            conn: handle,
            addr: Some(addr),
        });
    }
}

fn address_kind(kind: AddressType) -> u8 {
    match kind {
        AddressType::Public => 0,
        AddressType::RandomStatic => 1,
        AddressType::RandomPrivateResolvable => 2,
        AddressType::RandomPrivateNonResolvable => 3,
        AddressType::Anonymous => 4,
    }
}
