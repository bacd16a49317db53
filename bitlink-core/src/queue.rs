//! Bounded message queues between the application and the line loops

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;

use bitlink_protocol::Message;

/// Capacity of each queue
pub const QUEUE_DEPTH: usize = 16;

/// FIFO of whole messages
pub type MessageQueue<M> = Channel<M, Message, QUEUE_DEPTH>;

/// The two queues of one link endpoint
///
/// `outbound` is filled by the application and drained by the
/// transmitter; `inbound` is filled by the receiver and drained by the
/// application. Both can live in a `static`.
pub struct LinkQueues<M: RawMutex> {
    /// Messages waiting to be transmitted
    pub outbound: MessageQueue<M>,
    /// Messages received and not yet consumed
    pub inbound: MessageQueue<M>,
}

impl<M: RawMutex> LinkQueues<M> {
    /// Create empty queues
    pub const fn new() -> Self {
        Self {
            outbound: Channel::new(),
            inbound: Channel::new(),
        }
    }
}

impl<M: RawMutex> Default for LinkQueues<M> {
    fn default() -> Self {
        Self::new()
    }
}
