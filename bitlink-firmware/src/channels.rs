//! Inter-task communication channels
//!
//! The link queues live in a static so the transmitter, receiver and
//! application tasks can all borrow them for `'static`.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use bitlink_core::{Link, LinkQueues};

/// Outbound and inbound message queues of this board's link endpoint
pub static LINK_QUEUES: LinkQueues<CriticalSectionRawMutex> = LinkQueues::new();

/// Application handle to the link
pub fn link() -> Link<'static, CriticalSectionRawMutex> {
    Link::new(&LINK_QUEUES)
}
