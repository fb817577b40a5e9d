//! Streaming message assembly.
//!
//! Bytes are collected until the terminator shows up. The assembler is idle
//! while its cursor is zero and accumulating otherwise; it returns to idle on
//! a terminator, a timeout or an overflow, and only the terminator hands a
//! message back.

use crate::error::ErrorCode;
use crate::stream::{ByteStream, Clock};

/// Result of one [`MessageAssembler::poll`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssemblerPoll {
    /// Nothing buffered and nothing arrived.
    Idle,
    /// A partial message is buffered and waiting for more bytes.
    Pending,
    /// A message of this many bytes, terminator removed, is ready in
    /// [`MessageAssembler::message`].
    Message(usize),
    /// Buffered bytes were discarded.
    Failed(ErrorCode),
}

/// Fixed-size message buffer with terminator detection and an idle timeout.
#[derive(Debug, Clone)]
pub struct MessageAssembler<const B: usize> {
    buffer: [u8; B],
    cursor: usize,
    last_activity_ms: u32,
}

impl<const B: usize> Default for MessageAssembler<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const B: usize> MessageAssembler<B> {
    /// Creates an idle assembler.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: [0; B],
            cursor: 0,
            last_activity_ms: 0,
        }
    }

    /// Reads every available byte from `stream`.
    ///
    /// Returns as soon as a message is complete or the buffer overflows, so
    /// later bytes stay in the stream for the next call. When the stream runs
    /// dry with a partial message older than `timeout_ms`, the partial
    /// message is dropped and [`ErrorCode::Timeout`] is reported. A
    /// zero-length buffer overflows on every byte.
    pub fn poll<S, K>(
        &mut self,
        stream: &mut S,
        clock: &K,
        terminator: &[u8],
        timeout_ms: u32,
    ) -> AssemblerPoll
    where
        S: ByteStream + ?Sized,
        K: Clock + ?Sized,
    {
        while stream.available() {
            let byte = stream.read_byte();
            self.last_activity_ms = clock.now_ms();
            let Some(slot) = self.buffer.get_mut(self.cursor) else {
                self.cursor = 0;
                return AssemblerPoll::Failed(ErrorCode::BufferOverflow);
            };
            *slot = byte;
            self.cursor += 1;

            if self.cursor >= B {
                self.cursor = 0;
                return AssemblerPoll::Failed(ErrorCode::BufferOverflow);
            }

            if !terminator.is_empty() && self.buffer[..self.cursor].ends_with(terminator) {
                let length = self.cursor - terminator.len();
                self.cursor = 0;
                return AssemblerPoll::Message(length);
            }
        }

        if self.cursor == 0 {
            return AssemblerPoll::Idle;
        }

        if clock.now_ms().wrapping_sub(self.last_activity_ms) > timeout_ms {
            self.cursor = 0;
            return AssemblerPoll::Failed(ErrorCode::Timeout);
        }

        AssemblerPoll::Pending
    }

    /// First `length` bytes of the buffer, as reported by
    /// [`AssemblerPoll::Message`].
    #[must_use]
    pub fn message(&self, length: usize) -> &[u8] {
        &self.buffer[..length.min(B)]
    }

    /// Number of bytes buffered for the message in progress.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Drops any partial message.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Buffer capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        B
    }
}
