//! Virtual-time line simulator for host tests
//!
//! A transmitter writes into the line through [`SimOutput`] and
//! [`SimDelay`], which record every level change with its virtual
//! timestamp. After [`SimLine::rewind`], a receiver plays the recording
//! back through [`SimInput`] and [`SimClock`], sharing the same virtual
//! clock. Nothing sleeps; delays only move the clock forward.

use core::cell::{Cell, RefCell};
use std::rc::Rc;
use std::vec::Vec;

use bitlink_hal::{EdgeInput, InputPin, MonotonicClock, OutputPin};
use embedded_hal_async::delay::DelayNs;

#[derive(Default)]
struct Shared {
    now_ns: Cell<u64>,
    transitions: RefCell<Vec<(u64, bool)>>,
}

/// One simulated wire plus its virtual clock
#[derive(Clone, Default)]
pub struct SimLine {
    shared: Rc<Shared>,
}

impl SimLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.shared.now_ns.get() / 1_000_000
    }

    fn set_now_ms(&self, ms: u64) {
        self.shared.now_ns.set(ms * 1_000_000);
    }

    fn advance_ns(&self, ns: u64) {
        let now = self.shared.now_ns.get();
        self.shared.now_ns.set(now + ns);
    }

    /// Move the clock back to zero for playback
    pub fn rewind(&self) {
        self.shared.now_ns.set(0);
    }

    /// Level on the wire at `ms`; the line starts low
    pub fn level_at(&self, ms: u64) -> bool {
        self.shared
            .transitions
            .borrow()
            .iter()
            .rev()
            .find(|(t, _)| *t <= ms)
            .map_or(false, |(_, level)| *level)
    }

    /// Timestamps of every recorded transition
    pub fn edge_times(&self) -> Vec<u64> {
        self.shared.transitions.borrow().iter().map(|(t, _)| *t).collect()
    }

    pub fn output(&self) -> SimOutput {
        SimOutput {
            line: self.clone(),
            level: false,
        }
    }

    pub fn input(&self) -> SimInput {
        SimInput { line: self.clone() }
    }

    pub fn delay(&self) -> SimDelay {
        SimDelay { line: self.clone() }
    }

    pub fn clock(&self) -> SimClock {
        SimClock { line: self.clone() }
    }
}

/// Recording output pin
pub struct SimOutput {
    line: SimLine,
    level: bool,
}

impl SimOutput {
    fn drive(&mut self, level: bool) {
        if level != self.level {
            self.level = level;
            let now = self.line.now_ms();
            self.line.shared.transitions.borrow_mut().push((now, level));
        }
    }
}

impl OutputPin for SimOutput {
    fn set_high(&mut self) {
        self.drive(true);
    }

    fn set_low(&mut self) {
        self.drive(false);
    }

    fn is_set_high(&self) -> bool {
        self.level
    }
}

/// Playback input pin
pub struct SimInput {
    line: SimLine,
}

impl InputPin for SimInput {
    fn is_high(&self) -> bool {
        self.line.level_at(self.line.now_ms())
    }
}

impl EdgeInput for SimInput {
    async fn wait_for_any_edge(&mut self) {
        let now = self.line.now_ms();
        let next = self
            .line
            .shared
            .transitions
            .borrow()
            .iter()
            .map(|(t, _)| *t)
            .find(|t| *t > now);

        match next {
            Some(t) => self.line.set_now_ms(t),
            None => panic!("line went quiet at {} ms", now),
        }
    }
}

/// Delay that advances virtual time
pub struct SimDelay {
    line: SimLine,
}

impl DelayNs for SimDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.line.advance_ns(u64::from(ns));
    }

    async fn delay_us(&mut self, us: u32) {
        self.line.advance_ns(u64::from(us) * 1_000);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.line.advance_ns(u64::from(ms) * 1_000_000);
    }
}

/// Millisecond view of virtual time
pub struct SimClock {
    line: SimLine,
}

impl MonotonicClock for SimClock {
    fn now_ms(&self) -> u64 {
        self.line.now_ms()
    }
}
