//! Receive loop
//!
//! Each attempt has two phases. While waiting for a preamble the receiver
//! watches every edge of the input line and feeds its timestamp to the
//! clock recovery. Once eight edges have been seen it stops watching
//! edges and samples the line once per recovered bit period, feeding the
//! frame decoder until it reports a message or an error.
//!
//! An aborted decode leaves the receiver in the middle of a frame. The
//! clock recovery ignores edges until the line has been quiet for two bit
//! periods, which only happens in the idle gap the sender leaves before
//! every preamble.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal_async::delay::DelayNs;

use bitlink_hal::{EdgeInput, MonotonicClock};
use bitlink_protocol::{BitTiming, ClockRecovery, DecodeError, FrameDecoder, Message};

use crate::config::LinkConfig;
use crate::queue::LinkQueues;

/// Owns the input line and the receiving half of a link endpoint
pub struct Receiver<'q, M: RawMutex, I: EdgeInput, C: MonotonicClock, D: DelayNs> {
    queues: &'q LinkQueues<M>,
    input: I,
    clock: C,
    delay: D,
    config: LinkConfig,
    recovery: ClockRecovery,
    decoder: FrameDecoder,
}

impl<'q, M, I, C, D> Receiver<'q, M, I, C, D>
where
    M: RawMutex,
    I: EdgeInput,
    C: MonotonicClock,
    D: DelayNs,
{
    /// Create a receiver waiting for its first preamble
    pub fn new(queues: &'q LinkQueues<M>, input: I, clock: C, delay: D, config: LinkConfig) -> Self {
        Self {
            queues,
            input,
            clock,
            delay,
            config,
            recovery: ClockRecovery::with_quiet_time(config.preamble_quiet_ms()),
            decoder: FrameDecoder::new(),
        }
    }

    /// Watch edges until a full preamble has been timed
    ///
    /// Edge watching ends when this returns, so no edge is observed while
    /// the frame is being sampled.
    pub async fn recover_clock(&mut self) -> BitTiming {
        self.recovery.arm(self.clock.now_ms());
        loop {
            self.input.wait_for_any_edge().await;
            if let Some(timing) = self.recovery.on_edge(self.clock.now_ms()) {
                return timing;
            }
        }
    }

    /// Receive one frame
    ///
    /// Waits for a preamble, then samples until the decoder finishes. On
    /// return the receiver has already let the end of the frame pass, so
    /// the next call starts watching for a fresh preamble.
    pub async fn receive_frame(&mut self) -> Result<Message, DecodeError> {
        trace!("waiting for preamble");
        let timing = self.recover_clock().await;
        let interval = self.config.sample_interval_ms(timing.period_ms);
        debug!(
            "clock recovered: period {} ms, first sample in {} ms",
            timing.period_ms,
            timing.first_sample_delay_ms()
        );

        self.decoder.synchronize();
        self.delay.delay_ms(timing.first_sample_delay_ms()).await;

        let outcome = loop {
            match self.decoder.push_bit(self.input.is_high()) {
                Ok(None) => self.delay.delay_ms(interval).await,
                Ok(Some(message)) => break Ok(message),
                Err(e) => break Err(e),
            }
        };

        // The end flag's last cell still has a transition ahead of it
        self.delay.delay_ms(interval).await;
        self.decoder.reset();
        outcome
    }

    /// Receive one frame and deliver it to the inbound queue
    ///
    /// Decode errors are logged and returned; nothing is delivered for
    /// them.
    pub async fn receive_next(&mut self) -> Result<(), DecodeError> {
        match self.receive_frame().await {
            Ok(message) => {
                info!("received {} byte message", message.len());
                self.queues.inbound.send(message).await;
                Ok(())
            }
            Err(e) => {
                if e.is_integrity() {
                    warn!("frame dropped, CRC mismatch: {:?}", e);
                } else {
                    warn!("frame dropped, framing error: {:?}", e);
                }
                Err(e)
            }
        }
    }

    /// Receive frames forever
    pub async fn run(&mut self) -> ! {
        debug!("receiver running");
        loop {
            // Errors are already logged; resynchronize on the next preamble
            let _ = self.receive_next().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::Link;
    use crate::sim::{SimClock, SimDelay, SimInput, SimLine, SimOutput};
    use crate::transmitter::Transmitter;
    use bitlink_protocol::{Frame, MAX_MESSAGE_LEN};
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use proptest::prelude::*;

    type TestQueues = LinkQueues<NoopRawMutex>;

    fn transmitter<'q>(
        queues: &'q TestQueues,
        line: &SimLine,
    ) -> Transmitter<'q, NoopRawMutex, SimOutput, SimDelay> {
        Transmitter::new(queues, line.output(), line.delay(), LinkConfig::default())
    }

    fn receiver<'q>(
        queues: &'q TestQueues,
        line: &SimLine,
    ) -> Receiver<'q, NoopRawMutex, SimInput, SimClock, SimDelay> {
        Receiver::new(
            queues,
            line.input(),
            line.clock(),
            line.delay(),
            LinkConfig::default(),
        )
    }

    /// Send every message through the sim line and receive them back
    fn loopback(messages: &[&[u8]]) -> std::vec::Vec<Message> {
        let sender = TestQueues::new();
        let listener = TestQueues::new();
        let line = SimLine::new();

        let link = Link::new(&sender);
        for m in messages {
            link.try_send(m).unwrap();
        }

        let mut tx = transmitter(&sender, &line);
        for _ in messages {
            block_on(tx.transmit_next());
        }

        line.rewind();
        let mut rx = receiver(&listener, &line);
        for _ in messages {
            block_on(rx.receive_next()).unwrap();
        }

        let inbox = Link::new(&listener);
        core::iter::from_fn(|| inbox.try_receive()).collect()
    }

    #[test]
    fn test_scenario_message() {
        let text = b"123456789123456789";
        let received = loopback(&[text]);
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].as_bytes(), text);
    }

    #[test]
    fn test_boundary_lengths() {
        let max = [0x5Au8; MAX_MESSAGE_LEN];
        let received = loopback(&[&[], &max]);
        assert_eq!(received.len(), 2);
        assert!(received[0].is_empty());
        assert_eq!(received[1].as_bytes(), &max[..]);
    }

    #[test]
    fn test_back_to_back_frames_keep_order() {
        let received = loopback(&[b"Hello", b"Tomasz", b"Piotr", b"123456789123456789"]);
        let texts: std::vec::Vec<&[u8]> = received.iter().map(|m| m.as_bytes()).collect();
        assert_eq!(
            texts,
            [&b"Hello"[..], &b"Tomasz"[..], &b"Piotr"[..], &b"123456789123456789"[..]]
        );
    }

    #[test]
    fn test_recovered_period_matches_sender() {
        let queues = TestQueues::new();
        let line = SimLine::new();
        block_on(transmitter(&queues, &line).transmit(Message::new(b"x").unwrap())).unwrap();

        line.rewind();
        let mut rx = receiver(&queues, &line);
        let timing = block_on(rx.recover_clock());
        assert_eq!(timing.period_ms, 11);
        assert_eq!(timing.first_sample_delay_ms(), 6);
        // Eighth preamble edge sits in the middle of the last preamble cell
        assert_eq!(line.now_ms(), 3 * 11 + 7 * 11 + 6);
    }

    #[test]
    fn test_corrupted_crc_is_not_delivered() {
        let queues = TestQueues::new();
        let line = SimLine::new();

        let frame = Frame::new(Message::new(b"hello").unwrap());
        let mut wire = frame.encode_to_vec().unwrap();
        let crc_lo = wire.len() - 2;
        wire[crc_lo] ^= 0x01;
        block_on(transmitter(&queues, &line).drive_wire(&wire));

        line.rewind();
        let mut rx = receiver(&queues, &line);
        let err = block_on(rx.receive_next()).unwrap_err();
        assert!(err.is_integrity());
        assert!(Link::new(&queues).try_receive().is_none());
    }

    #[test]
    fn test_bad_end_flag_is_not_delivered() {
        let queues = TestQueues::new();
        let line = SimLine::new();

        let frame = Frame::new(Message::new(b"hello").unwrap());
        let mut wire = frame.encode_to_vec().unwrap();
        let end = wire.len() - 1;
        wire[end] = 0x7F;
        block_on(transmitter(&queues, &line).drive_wire(&wire));

        line.rewind();
        let mut rx = receiver(&queues, &line);
        assert_eq!(
            block_on(rx.receive_frame()),
            Err(DecodeError::BadEndFlag(0x7F))
        );
    }

    /// Drive a damaged frame and a good one back to back, then receive both
    fn damaged_then_good(damage: impl FnOnce(&mut [u8])) -> (DecodeError, Message) {
        let queues = TestQueues::new();
        let line = SimLine::new();

        let frame = Frame::new(Message::new(b"first").unwrap());
        let mut wire = frame.encode_to_vec().unwrap();
        damage(&mut wire[..]);

        let mut tx = transmitter(&queues, &line);
        block_on(tx.drive_wire(&wire));
        block_on(tx.transmit(Message::new(b"second").unwrap())).unwrap();

        line.rewind();
        let mut rx = receiver(&queues, &line);
        let err = block_on(rx.receive_frame()).unwrap_err();
        let message = block_on(rx.receive_frame()).unwrap();
        (err, message)
    }

    #[test]
    fn test_resync_after_crc_mismatch() {
        let (err, message) = damaged_then_good(|wire| {
            let crc_lo = wire.len() - 2;
            wire[crc_lo] ^= 0x01;
        });
        assert!(matches!(err, DecodeError::CrcMismatch { .. }));
        assert_eq!(message.as_bytes(), b"second");
    }

    #[test]
    fn test_resync_after_bad_start_flag() {
        // wire[0] is the preamble
        let (err, message) = damaged_then_good(|wire| wire[1] = 0x7F);
        assert_eq!(err, DecodeError::BadStartFlag(0x7F));
        assert_eq!(message.as_bytes(), b"second");
    }

    #[test]
    fn test_resync_delivers_every_following_frame() {
        let queues = TestQueues::new();
        let line = SimLine::new();
        let mut tx = transmitter(&queues, &line);

        let mut wire = Frame::new(Message::new(b"Hello").unwrap())
            .encode_to_vec()
            .unwrap();
        wire[4] ^= 0x10;
        block_on(tx.drive_wire(&wire));
        for text in [&b"Tomasz"[..], b"Piotr"] {
            block_on(tx.transmit(Message::new(text).unwrap())).unwrap();
        }

        line.rewind();
        let mut rx = receiver(&queues, &line);
        assert!(block_on(rx.receive_next()).unwrap_err().is_integrity());
        block_on(rx.receive_next()).unwrap();
        block_on(rx.receive_next()).unwrap();

        let inbox = Link::new(&queues);
        assert_eq!(inbox.try_receive().unwrap().as_bytes(), b"Tomasz");
        assert_eq!(inbox.try_receive().unwrap().as_bytes(), b"Piotr");
        assert!(inbox.try_receive().is_none());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_loopback(payload in proptest::collection::vec(any::<u8>(), 0..=MAX_MESSAGE_LEN)) {
            let received = loopback(&[&payload]);
            prop_assert_eq!(received.len(), 1);
            prop_assert_eq!(received[0].as_bytes(), &payload[..]);
        }
    }
}
