//! GPIO line abstractions
//!
//! Provides traits for the two digital lines of the link. The output line
//! is driven exclusively by the transmitter, the input line is read
//! exclusively by the receiver.

use core::future::Future;

/// Digital output line
///
/// Implementations should handle the actual hardware register manipulation
/// for the specific chip.
pub trait OutputPin {
    /// Set the line high (logic 1)
    fn set_high(&mut self);

    /// Set the line low (logic 0)
    fn set_low(&mut self);

    /// Set the line to a specific level
    fn set_level(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the line is currently driven high
    fn is_set_high(&self) -> bool;
}

/// Digital input line
pub trait InputPin {
    /// Check if the line reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the line reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }
}

/// Input line that can notify on level transitions
///
/// Awaiting [`EdgeInput::wait_for_any_edge`] is the equivalent of having
/// rising- and falling-edge callbacks registered: the edge interrupt wakes
/// the waiting task. Dropping the future (or simply not awaiting it)
/// unregisters interest, so no edge handler runs while the receiver is
/// sampling a frame.
pub trait EdgeInput: InputPin {
    /// Wait for the next rising or falling edge
    fn wait_for_any_edge(&mut self) -> impl Future<Output = ()>;
}
