//! In-memory serial port and scripted clock for driving the parser off-target.

use std::cell::Cell;
use std::collections::VecDeque;
use std::fmt::Write as _;

use scpi_core::{ByteStream, Clock};

/// Number of voltage channels on the demo instrument.
pub const CHANNEL_COUNT: usize = 4;

/// Byte port of the demo instrument.
///
/// Holds the queued input bytes, the text written back by handlers and the
/// instrument state those handlers act on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DemoPort {
    input: VecDeque<u8>,
    output: String,
    /// Front-panel LED.
    pub led: bool,
    /// Programmed channel voltages, channel 1 first.
    pub voltages: [f32; CHANNEL_COUNT],
}

impl DemoPort {
    /// Creates an idle port with the instrument in its reset state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues bytes as if they had arrived on the wire.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.input.extend(bytes.iter().copied());
    }

    /// Number of queued input bytes.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.input.len()
    }

    /// Writes one response line.
    pub fn respond(&mut self, line: &str) {
        let _ = writeln!(self.output, "{line}");
    }

    /// Text written so far.
    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Takes the text written so far, leaving the output empty.
    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }

    /// Returns the instrument to its power-on state. Queued input and output
    /// are kept.
    pub fn reset_instrument(&mut self) {
        self.led = false;
        self.voltages = [0.0; CHANNEL_COUNT];
    }
}

impl ByteStream for DemoPort {
    fn available(&mut self) -> bool {
        !self.input.is_empty()
    }

    fn read_byte(&mut self) -> u8 {
        self.input.pop_front().unwrap_or_default()
    }
}

/// Millisecond clock that only moves when told to.
#[derive(Debug, Clone, Default)]
pub struct ScriptClock {
    now: Cell<u32>,
}

impl ScriptClock {
    /// Creates a clock reading `start_ms`.
    #[must_use]
    pub const fn new(start_ms: u32) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    /// Moves the clock forward, wrapping at `u32::MAX`.
    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }

    /// Current reading.
    #[must_use]
    pub fn now(&self) -> u32 {
        self.now.get()
    }
}

impl Clock for ScriptClock {
    fn now_ms(&self) -> u32 {
        self.now()
    }
}
