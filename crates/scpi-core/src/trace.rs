//! Dispatch trace hooks.

use crate::error::ErrorCode;

/// Events emitted while assembling and dispatching messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceEvent {
    /// A terminator was found; the message is about to be executed.
    MessageAssembled {
        /// Message length without the terminator.
        length: usize,
    },
    /// A sub-command matched a registry entry and its handler ran.
    CommandDispatched {
        /// Command code, widened.
        code: u64,
        /// Registry position of the handler.
        entry: usize,
    },
    /// A sub-command hashed to a valid code nobody registered.
    CommandUnmatched {
        /// Command code, widened.
        code: u64,
    },
    /// The error handler is about to run.
    ErrorRaised {
        /// Error stored as the last error.
        error: ErrorCode,
    },
}

/// Receiver of trace events, in the order they happen.
pub trait TraceSink {
    /// Records one event.
    fn on_event(&mut self, event: TraceEvent);
}

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTrace;

impl TraceSink for NoTrace {
    fn on_event(&mut self, _event: TraceEvent) {}
}

impl TraceSink for Vec<TraceEvent> {
    fn on_event(&mut self, event: TraceEvent) {
        self.push(event);
    }
}
