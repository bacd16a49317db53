//! Line receive task
//!
//! Owns the RX pin. Edge interrupts are only armed while the receiver is
//! waiting for a preamble.

use defmt::*;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::Delay;

use bitlink_core::Receiver;
use bitlink_hal_rp2040::{EmbassyClock, LinkInput};

/// Receiver bound to the RP2040 input line and the embassy timer
pub type LinkReceiver =
    Receiver<'static, CriticalSectionRawMutex, LinkInput<'static>, EmbassyClock, Delay>;

/// Receive task - decodes frames and queues their messages
#[embassy_executor::task]
pub async fn receiver_task(mut receiver: LinkReceiver) {
    info!("Receiver task started");
    receiver.run().await
}
