//! Transmit loop
//!
//! Drains the outbound queue and drives each message onto the output line
//! one frame at a time. Bit timing comes entirely from the delay provider.
//! Every frame is preceded by an idle-low gap, which receivers use to find
//! the start of the next preamble after a failed decode.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal_async::delay::DelayNs;

use bitlink_hal::OutputPin;
use bitlink_protocol::{manchester_levels, Frame, FrameBits, FrameError, Message};

use crate::config::LinkConfig;
use crate::queue::LinkQueues;

/// Owns the output line and the sending half of a link endpoint
pub struct Transmitter<'q, M: RawMutex, P: OutputPin, D: DelayNs> {
    queues: &'q LinkQueues<M>,
    pin: P,
    delay: D,
    config: LinkConfig,
}

impl<'q, M: RawMutex, P: OutputPin, D: DelayNs> Transmitter<'q, M, P, D> {
    /// Create a transmitter; the line is driven low (idle) immediately
    pub fn new(queues: &'q LinkQueues<M>, mut pin: P, delay: D, config: LinkConfig) -> Self {
        pin.set_low();
        Self {
            queues,
            pin,
            delay,
            config,
        }
    }

    /// Encode and drive one message as a complete frame
    pub async fn transmit(&mut self, message: Message) -> Result<(), FrameError> {
        let wire = Frame::new(message).encode_to_vec()?;
        self.drive_wire(&wire).await;
        Ok(())
    }

    /// Wait for the next queued message and transmit it
    pub async fn transmit_next(&mut self) {
        let message = self.queues.outbound.receive().await;
        let len = message.len();
        match self.transmit(message).await {
            Ok(()) => trace!("sent frame, {} byte payload", len),
            Err(e) => error!("failed to encode frame: {:?}", e),
        }
    }

    /// Transmit queued messages forever
    pub async fn run(&mut self) -> ! {
        debug!("transmitter running, bit period {} ms", self.config.bit_period_ms());
        loop {
            self.transmit_next().await;
        }
    }

    /// Idle the line, drive raw wire bytes, then return the line to idle low
    pub(crate) async fn drive_wire(&mut self, wire: &[u8]) {
        let first_half_ms = self.config.first_half_ms();
        let second_half_ms = self.config.half_bit_ms;

        self.pin.set_low();
        self.delay.delay_ms(self.config.idle_gap_ms()).await;

        for bit in FrameBits::new(wire) {
            let [first, second] = manchester_levels(bit);
            self.pin.set_level(first);
            self.delay.delay_ms(first_half_ms).await;
            self.pin.set_level(second);
            self.delay.delay_ms(second_half_ms).await;
        }

        // Next preamble must start from a low line
        self.pin.set_low();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimLine;
    use bitlink_protocol::PREAMBLE;
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    #[test]
    fn test_line_idles_low() {
        let line = SimLine::new();
        let queues = LinkQueues::<NoopRawMutex>::new();
        let mut output = line.output();
        output.set_high();

        let _tx = Transmitter::new(&queues, output, line.delay(), LinkConfig::default());
        assert!(!line.level_at(0));
    }

    #[test]
    fn test_frame_duration() {
        let line = SimLine::new();
        let queues = LinkQueues::<NoopRawMutex>::new();
        let mut tx = Transmitter::new(&queues, line.output(), line.delay(), LinkConfig::default());

        block_on(tx.transmit(Message::new(b"abc").unwrap())).unwrap();

        // Idle gap, then 10 bytes on the wire at 11 ms per bit
        assert_eq!(line.now_ms(), 3 * 11 + 10 * 8 * 11);
        assert!(!line.level_at(line.now_ms()));
    }

    #[test]
    fn test_preamble_edges_are_one_period_apart() {
        let line = SimLine::new();
        let queues = LinkQueues::<NoopRawMutex>::new();
        let mut tx = Transmitter::new(&queues, line.output(), line.delay(), LinkConfig::default());

        block_on(tx.drive_wire(&[PREAMBLE]));

        let edges = line.edge_times();
        assert_eq!(edges.len(), 8);
        assert_eq!(edges[0], 33 + 6);
        for pair in edges.windows(2) {
            assert_eq!(pair[1] - pair[0], 11);
        }
    }

    #[test]
    fn test_bit_levels() {
        let line = SimLine::new();
        let queues = LinkQueues::<NoopRawMutex>::new();
        let mut tx = Transmitter::new(&queues, line.output(), line.delay(), LinkConfig::default());

        // 0b1000_0000: one high-then-low cell, then seven low-then-high cells
        block_on(tx.drive_wire(&[0x80]));

        assert!(!line.level_at(0));
        assert!(line.level_at(33));
        assert!(!line.level_at(33 + 6));
        assert!(!line.level_at(33 + 11));
        assert!(line.level_at(33 + 17));
    }

    #[test]
    fn test_transmit_next_drains_queue_in_order() {
        let line = SimLine::new();
        let queues = LinkQueues::<NoopRawMutex>::new();
        queues.outbound.try_send(Message::new(b"a").unwrap()).unwrap();
        queues.outbound.try_send(Message::new(b"bc").unwrap()).unwrap();

        let mut tx = Transmitter::new(&queues, line.output(), line.delay(), LinkConfig::default());
        block_on(tx.transmit_next());
        assert_eq!(queues.outbound.len(), 1);
        assert_eq!(line.now_ms(), 3 * 11 + 8 * 8 * 11);

        block_on(tx.transmit_next());
        assert!(queues.outbound.is_empty());
        assert_eq!(line.now_ms(), 2 * 3 * 11 + (8 + 9) * 8 * 11);
    }
}
