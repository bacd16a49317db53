//! GPIO lines for the link
//!
//! Wraps `embassy-rp` GPIO drivers in the `bitlink-hal` line traits. The
//! input side relies on the RP2040 edge interrupts: awaiting
//! [`LinkInput::wait_for_any_edge`] arms both edge detectors and the
//! interrupt wakes the receiver task.

use embassy_rp::gpio::{AnyPin, Input, Level, Output, Pull};
use embassy_rp::Peri;

use bitlink_hal::{EdgeInput, InputPin, OutputPin};

/// Number of GPIO pins on RP2040
pub const GPIO_COUNT: usize = 30;

/// Transmit line
pub struct LinkOutput<'d> {
    pin: Output<'d>,
}

impl<'d> LinkOutput<'d> {
    /// Configure `pin` as a push-pull output, initially low
    pub fn new(pin: Peri<'d, AnyPin>) -> Self {
        Self {
            pin: Output::new(pin, Level::Low),
        }
    }
}

impl OutputPin for LinkOutput<'_> {
    fn set_high(&mut self) {
        self.pin.set_high();
    }

    fn set_low(&mut self) {
        self.pin.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}

/// Receive line
pub struct LinkInput<'d> {
    pin: Input<'d>,
}

impl<'d> LinkInput<'d> {
    /// Configure `pin` as an input, optionally with the internal pull-up
    pub fn new(pin: Peri<'d, AnyPin>, pull_up: bool) -> Self {
        let pull = if pull_up { Pull::Up } else { Pull::None };
        Self {
            pin: Input::new(pin, pull),
        }
    }
}

impl InputPin for LinkInput<'_> {
    fn is_high(&self) -> bool {
        self.pin.is_high()
    }
}

impl EdgeInput for LinkInput<'_> {
    async fn wait_for_any_edge(&mut self) {
        self.pin.wait_for_any_edge().await;
    }
}

/// Pin assignment parsed from config
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinSpec {
    /// GPIO number
    pub pin: u8,
    /// Enable the internal pull-up (inputs only)
    pub pull_up: bool,
}

/// Parse a pin string from config
///
/// Supports formats:
/// - "gpio5" -> pin 5
/// - "^gpio6" -> pin 6 with pull-up
pub fn parse_pin_string(s: &str) -> Option<PinSpec> {
    let s = s.trim();

    let (s, pull_up) = match s.strip_prefix('^') {
        Some(rest) => (rest, true),
        None => (s, false),
    };

    let pin: u8 = s.strip_prefix("gpio")?.parse().ok()?;
    if usize::from(pin) >= GPIO_COUNT {
        return None;
    }

    Some(PinSpec { pin, pull_up })
}
