//! Console task
//!
//! Prints every received message over RTT.

use defmt::*;

use crate::channels;

/// Console task - consumes the inbound queue
#[embassy_executor::task]
pub async fn console_task() {
    info!("Console task started");

    let link = channels::link();
    loop {
        let message = link.receive().await;
        match core::str::from_utf8(&message) {
            Ok(text) => info!("READ : {}", text),
            Err(_) => info!("READ : {=[u8]:02x}", message.as_bytes()),
        }
    }
}
