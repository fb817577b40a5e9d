//! Capacity defaults and runtime parser configuration.

use crate::code::{CommandCode, HashConfig};
use crate::error::ConfigError;

/// Default maximum keywords per command, and parameters per command.
pub const DEFAULT_ARRAY_SIZE: usize = 6;

/// Default token store capacity.
pub const DEFAULT_MAX_TOKENS: usize = 15;

/// Default registry capacity, not counting the error handler.
pub const DEFAULT_MAX_COMMANDS: usize = 20;

/// Default message buffer capacity in bytes.
///
/// One byte is kept free, so the longest message including its terminator
/// is one byte shorter than this.
pub const DEFAULT_BUFFER_LENGTH: usize = 64;

/// Default inter-byte idle timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u32 = 10;

/// Maximum terminator length.
pub const MAX_TERMINATOR_LEN: usize = 8;

/// Default message terminator (carriage return).
pub const DEFAULT_TERMINATOR: &[u8] = b"\r";

/// Byte string that ends a message on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Terminator {
    bytes: heapless::Vec<u8, MAX_TERMINATOR_LEN>,
}

impl Terminator {
    /// Carriage return.
    pub const CR: &'static [u8] = b"\r";
    /// Line feed.
    pub const LF: &'static [u8] = b"\n";
    /// Carriage return followed by line feed.
    pub const CRLF: &'static [u8] = b"\r\n";

    /// Builds a terminator from its bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyTerminator`] for an empty string and
    /// [`ConfigError::TerminatorTooLong`] when it exceeds
    /// [`MAX_TERMINATOR_LEN`].
    pub fn new(bytes: &[u8]) -> Result<Self, ConfigError> {
        if bytes.is_empty() {
            return Err(ConfigError::EmptyTerminator);
        }
        let too_long = ConfigError::TerminatorTooLong {
            len: bytes.len(),
            max: MAX_TERMINATOR_LEN,
        };
        let bytes = heapless::Vec::from_slice(bytes).map_err(|_| too_long)?;
        Ok(Self { bytes })
    }

    /// Terminator bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Terminator length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always `false` for a terminator built through [`Terminator::new`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl Default for Terminator {
    fn default() -> Self {
        let mut bytes = heapless::Vec::new();
        for &byte in DEFAULT_TERMINATOR {
            let _ = bytes.push(byte);
        }
        Self { bytes }
    }
}

/// Runtime configuration of a parser instance.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ParserConfig<C> {
    /// Idle gap after which a partial message is discarded.
    pub timeout_ms: u32,
    /// Byte string that ends each message.
    pub terminator: Terminator,
    /// Hash multiplier and seed.
    pub hash: HashConfig<C>,
}

impl<C: CommandCode> Default for ParserConfig<C> {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            terminator: Terminator::default(),
            hash: HashConfig::default(),
        }
    }
}

impl<C: CommandCode> ParserConfig<C> {
    /// Replaces the terminator.
    ///
    /// # Errors
    ///
    /// Propagates the validation errors of [`Terminator::new`].
    pub fn with_terminator(mut self, bytes: &[u8]) -> Result<Self, ConfigError> {
        self.terminator = Terminator::new(bytes)?;
        Ok(self)
    }

    /// Replaces the idle timeout.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn with_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Checks the configuration against a message buffer of `buffer_length`
    /// bytes.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] that applies.
    pub fn validate(&self, buffer_length: usize) -> Result<(), ConfigError> {
        if self.terminator.is_empty() {
            return Err(ConfigError::EmptyTerminator);
        }
        if self.terminator.len() >= buffer_length {
            return Err(ConfigError::TerminatorExceedsBuffer {
                len: self.terminator.len(),
                buffer: buffer_length,
            });
        }
        if self.hash.magic == C::UNKNOWN || self.hash.magic == C::INVALID {
            return Err(ConfigError::DegenerateMagic);
        }
        if self.hash.offset.is_reserved() {
            return Err(ConfigError::ReservedOffset);
        }
        Ok(())
    }
}
