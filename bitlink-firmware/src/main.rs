//! bitlink - GPIO Data Link Firmware
//!
//! Main firmware binary for RP2040 boards. Two boards wired TX-to-RX
//! exchange short CRC-protected messages over plain GPIO, each receiver
//! recovering the sender's bit clock from the frame preamble.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_time::Delay;
use {defmt_rtt as _, panic_probe as _};

use bitlink_core::{Receiver, Transmitter};
use bitlink_hal_rp2040::{EmbassyClock, LinkInput, LinkOutput, PinBank};

use crate::channels::LINK_QUEUES;
use crate::config::{parse_config, FirmwareConfig};

mod channels;
mod config;
mod tasks;

/// Embedded configuration (compiled into firmware)
/// Edit link.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../link.toml");

/// Messages queued at boot
const DEMO_MESSAGES: [&str; 4] = [
    "123456789123456789",
    "asdfsadfasdfasdfas",
    "Sed nec purus in justo fringilla suscipit.",
    "Lorem ipsum dolor sit amet, consectetur adipiscing elit.",
];

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("========= bitlink starting =========");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = load_config();
    info!(
        "Link config: half bit {} ms (+{} ms first half), sample correction {} ms, idle gap {} bits",
        config.link.half_bit_ms,
        config.link.first_half_extra_ms,
        config.link.sample_correction_ms,
        config.link.idle_gap_bits
    );
    info!(
        "Lines: tx=gpio{}, rx=gpio{} (pull-up: {})",
        config.tx_pin.pin, config.rx_pin.pin, config.rx_pin.pull_up
    );

    let mut pins = PinBank::new(p);
    let tx_pin = pins.take(config.tx_pin.pin).unwrap();
    let rx_pin = pins.take(config.rx_pin.pin).unwrap();

    let transmitter = Transmitter::new(&LINK_QUEUES, LinkOutput::new(tx_pin), Delay, config.link);
    let receiver = Receiver::new(
        &LINK_QUEUES,
        LinkInput::new(rx_pin, config.rx_pin.pull_up),
        EmbassyClock,
        Delay,
        config.link,
    );

    spawner.spawn(tasks::receiver_task(receiver)).unwrap();
    spawner.spawn(tasks::transmitter_task(transmitter)).unwrap();
    spawner.spawn(tasks::console_task()).unwrap();

    info!("All tasks spawned, link running");

    let link = channels::link();
    for text in DEMO_MESSAGES {
        match link.send(text.as_bytes()).await {
            Ok(()) => debug!("Queued {} byte message", text.len()),
            Err(e) => warn!("Message not queued: {:?}", e),
        }
    }
}

/// Parse the embedded config, falling back to defaults on any error
fn load_config() -> FirmwareConfig {
    let config = match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to parse link.toml: {:?}, using defaults", e);
            return FirmwareConfig::default();
        }
    };

    match config.link.validate() {
        Ok(()) => config,
        Err(e) => {
            warn!("Invalid link timing: {:?}, using defaults", e);
            FirmwareConfig {
                link: Default::default(),
                ..config
            }
        }
    }
}
