//! Error taxonomy for dispatch, stream assembly and parser setup.

use thiserror::Error;

/// Last error observed by the parser, updated right before the error handler
/// runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum ErrorCode {
    /// Steady state; nothing went wrong since the last dispatch started.
    #[default]
    #[error("no error")]
    NoError = 0x00,
    /// Message parsed but its keywords did not match the registered grammar.
    #[error("unknown command")]
    UnknownCommand = 0x01,
    /// Inter-byte gap exceeded while a partial message was buffered.
    #[error("message timed out before its terminator arrived")]
    Timeout = 0x02,
    /// Incoming byte would have overflowed the message buffer.
    #[error("message buffer overflow")]
    BufferOverflow = 0x03,
}

impl ErrorCode {
    /// Converts the error to its stable byte value.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Converts a stable byte value back into an error code.
    #[must_use]
    pub const fn from_u8(code: u8) -> Option<Self> {
        match code {
            0x00 => Some(Self::NoError),
            0x01 => Some(Self::UnknownCommand),
            0x02 => Some(Self::Timeout),
            0x03 => Some(Self::BufferOverflow),
            _ => None,
        }
    }

    /// Returns `true` for every variant except [`ErrorCode::NoError`].
    #[must_use]
    pub const fn is_error(self) -> bool {
        !matches!(self, Self::NoError)
    }

    /// Errors raised by the stream assembler; these discard buffered bytes.
    #[must_use]
    pub const fn is_transport(self) -> bool {
        matches!(self, Self::Timeout | Self::BufferOverflow)
    }
}

/// Capacity problems hit while registering commands.
///
/// Setup keeps going after any of these: whatever fit is stored and the rest
/// is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(clippy::struct_excessive_bools)]
pub struct SetupErrors {
    /// A keyword could not be interned because the token store was full.
    pub token_overflow: bool,
    /// The registry was full, or a command had too many keywords.
    pub command_overflow: bool,
    /// A tree base had more keywords than a sequence can hold.
    pub branch_overflow: bool,
}

impl SetupErrors {
    /// Returns `true` when any flag is set.
    #[must_use]
    pub const fn any(self) -> bool {
        self.token_overflow || self.command_overflow || self.branch_overflow
    }
}

/// Rejected parser configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ConfigError {
    /// Terminator has no bytes and would match after every byte.
    #[error("terminator must not be empty")]
    EmptyTerminator,
    /// Terminator is longer than the terminator storage.
    #[error("terminator is {len} bytes, at most {max} are supported")]
    TerminatorTooLong {
        /// Requested terminator length.
        len: usize,
        /// Supported maximum.
        max: usize,
    },
    /// Terminator does not leave room in the message buffer.
    #[error("terminator of {len} bytes does not fit a {buffer}-byte message buffer")]
    TerminatorExceedsBuffer {
        /// Terminator length.
        len: usize,
        /// Message buffer capacity.
        buffer: usize,
    },
    /// Hash multiplier below two maps every command to the same code.
    #[error("hash multiplier must be at least 2")]
    DegenerateMagic,
    /// Hash seed collides with a reserved code.
    #[error("hash offset must not equal a reserved code")]
    ReservedOffset,
}
