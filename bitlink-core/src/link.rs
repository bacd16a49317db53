//! Application API

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::TrySendError;

use bitlink_protocol::Message;

use crate::error::LinkError;
use crate::queue::LinkQueues;

/// Application handle to one link endpoint
///
/// Cheap to copy; every copy talks to the same queues.
pub struct Link<'q, M: RawMutex> {
    queues: &'q LinkQueues<M>,
}

impl<M: RawMutex> Clone for Link<'_, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: RawMutex> Copy for Link<'_, M> {}

impl<'q, M: RawMutex> Link<'q, M> {
    /// Create a handle over `queues`
    pub fn new(queues: &'q LinkQueues<M>) -> Self {
        Self { queues }
    }

    /// Queue `bytes` for transmission, waiting while the outbound queue is full
    pub async fn send(&self, bytes: &[u8]) -> Result<(), LinkError> {
        let message = to_message(bytes)?;
        self.queues.outbound.send(message).await;
        Ok(())
    }

    /// Queue `bytes` for transmission without waiting
    pub fn try_send(&self, bytes: &[u8]) -> Result<(), LinkError> {
        let message = to_message(bytes)?;
        self.queues
            .outbound
            .try_send(message)
            .map_err(|_: TrySendError<Message>| LinkError::QueueFull)
    }

    /// Wait for the next received message
    pub async fn receive(&self) -> Message {
        self.queues.inbound.receive().await
    }

    /// Take the next received message, if any
    pub fn try_receive(&self) -> Option<Message> {
        self.queues.inbound.try_receive().ok()
    }

    /// Number of messages waiting to be transmitted
    pub fn pending_outbound(&self) -> usize {
        self.queues.outbound.len()
    }
}

fn to_message(bytes: &[u8]) -> Result<Message, LinkError> {
    Message::new(bytes).map_err(|_| LinkError::MessageTooLong { len: bytes.len() })
}
