//! SCPI command parser and dispatcher for small instruments.
//!
//! Commands are registered as keyword spellings such as `SYSTem:LED?` and
//! matched case-insensitively against their short or long forms. Incoming
//! bytes are assembled into terminator-delimited messages and each
//! `;`-separated sub-command is dispatched to its handler.

/// Command-code width abstraction and hash parameters.
pub mod code;
pub use code::{CommandCode, HashConfig, DEFAULT_HASH_MAGIC, DEFAULT_HASH_OFFSET};

/// Runtime error codes, setup flags and configuration errors.
pub mod error;
pub use error::{ConfigError, ErrorCode, SetupErrors};

/// Capacities, terminator and parser configuration.
pub mod config;
pub use config::{
    ParserConfig, Terminator, DEFAULT_ARRAY_SIZE, DEFAULT_BUFFER_LENGTH, DEFAULT_MAX_COMMANDS,
    DEFAULT_MAX_TOKENS, DEFAULT_TERMINATOR, DEFAULT_TIMEOUT_MS, MAX_TERMINATOR_LEN,
};

/// Interned keyword spellings.
pub mod token;
pub use token::{InternOutcome, Token, TokenStore, NUMERIC_SUFFIX_MARKER, QUERY_MARKER};

/// Sub-command, keyword and parameter splitting.
pub mod tokenizer;
pub use tokenizer::{
    split_command, split_parameters, sub_commands, Keywords, Parameters, Segments,
    COMMAND_SEPARATOR, KEYWORD_SEPARATOR, PARAMETER_SEPARATOR,
};

/// Keyword matching and command hashing.
pub mod hasher;
pub use hasher::{command_code, keyword_matches, match_token};

/// Command registration and lookup.
pub mod registry;
pub use registry::{ignore_error, CommandRegistry, Entry, Handler, TreeBase};

/// Byte source and clock contracts.
pub mod stream;
pub use stream::{ByteStream, Clock, StdClock};

/// Terminator-delimited message assembly.
pub mod assembler;
pub use assembler::{AssemblerPoll, MessageAssembler};

/// Dispatch trace hooks.
pub mod trace;
pub use trace::{NoTrace, TraceEvent, TraceSink};

/// Message execution pipeline.
pub mod execute;
pub use execute::{execute_message, raise_error};

/// Setup diagnostics.
pub mod diag;
pub use diag::{CodeStatus, CommandDiagnostic, DebugReport};

/// Parser facade.
pub mod parser;
pub use parser::ScpiParser;

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
