//! Host-facing collaborator contracts: the byte source and the clock.

use std::collections::VecDeque;
use std::time::Instant;

/// Non-blocking byte source a message is read from.
///
/// The same value is handed to command handlers as the response channel; the
/// parser itself only reads from it. Hosts add whatever writing capability
/// their handlers need on the concrete type.
pub trait ByteStream {
    /// Returns `true` when [`ByteStream::read_byte`] has a byte to return.
    fn available(&mut self) -> bool;

    /// Consumes one byte. Only called after `available` returned `true`.
    fn read_byte(&mut self) -> u8;
}

impl ByteStream for VecDeque<u8> {
    fn available(&mut self) -> bool {
        !self.is_empty()
    }

    fn read_byte(&mut self) -> u8 {
        self.pop_front().unwrap_or_default()
    }
}

/// Monotonic millisecond clock.
///
/// Readings may wrap; the parser only ever subtracts them with wrapping
/// arithmetic.
pub trait Clock {
    /// Current time in milliseconds.
    fn now_ms(&self) -> u32;
}

impl<F: Fn() -> u32> Clock for F {
    fn now_ms(&self) -> u32 {
        self()
    }
}

/// Wall clock counting milliseconds since it was created.
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    origin: Instant,
}

impl StdClock {
    /// Starts a clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for StdClock {
    #[allow(clippy::cast_possible_truncation)]
    fn now_ms(&self) -> u32 {
        self.origin.elapsed().as_millis() as u32
    }
}
