//! Embassy async tasks
//!
//! Each task runs independently and communicates via the link queues.

pub mod console;
pub mod receiver;
pub mod transmitter;

pub use console::console_task;
pub use receiver::{receiver_task, LinkReceiver};
pub use transmitter::{transmitter_task, LinkTransmitter};
