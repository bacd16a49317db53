//! Line transmit task
//!
//! Owns the TX pin and drives queued messages onto it.

use defmt::*;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::Delay;

use bitlink_core::Transmitter;
use bitlink_hal_rp2040::LinkOutput;

/// Transmitter bound to the RP2040 output line and the embassy timer
pub type LinkTransmitter =
    Transmitter<'static, CriticalSectionRawMutex, LinkOutput<'static>, Delay>;

/// Transmit task - sends every message queued through the link
#[embassy_executor::task]
pub async fn transmitter_task(mut transmitter: LinkTransmitter) {
    info!("Transmitter task started");
    transmitter.run().await
}
