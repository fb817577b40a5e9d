//! Setup diagnostics: tokens, command codes and collisions.

use core::fmt;

use crate::code::CommandCode;
use crate::config::ParserConfig;
use crate::error::SetupErrors;
use crate::registry::CommandRegistry;

/// Health of one registered code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum CodeStatus {
    /// Unique, dispatchable code.
    Valid,
    /// Registration was rejected, including keywords that match no token;
    /// the entry never dispatches.
    Invalid,
    /// Same code as an earlier entry, which shadows this one.
    Collision {
        /// Position of the earlier entry.
        first: usize,
    },
}

impl CodeStatus {
    const fn marker(self) -> &'static str {
        match self {
            Self::Valid => "",
            Self::Invalid => "!%",
            Self::Collision { .. } => "!!",
        }
    }
}

/// One registry entry as seen by the inspector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CommandDiagnostic {
    /// Registry position.
    pub index: usize,
    /// Command code, widened.
    pub code: u64,
    /// Code health.
    pub status: CodeStatus,
}

/// Snapshot of a parser setup.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DebugReport {
    /// Width of the command code in bits.
    pub code_bits: u32,
    /// Keywords and parameters per command.
    pub array_size: usize,
    /// Token store capacity.
    pub max_tokens: usize,
    /// Registry capacity.
    pub max_commands: usize,
    /// Message buffer length.
    pub buffer_length: usize,
    /// Idle timeout.
    pub timeout_ms: u32,
    /// Message terminator.
    pub terminator: Vec<u8>,
    /// Hash multiplier, widened.
    pub hash_magic: u64,
    /// Hash seed, widened.
    pub hash_offset: u64,
    /// Interned token spellings in store order.
    pub tokens: Vec<String>,
    /// Registry entries in insertion order.
    pub commands: Vec<CommandDiagnostic>,
    /// Setup capacity problems.
    pub setup_errors: SetupErrors,
}

impl DebugReport {
    /// Builds a report for `registry` running under `config` with a message
    /// buffer of `buffer_length` bytes.
    #[must_use]
    pub fn new<S, C, const N: usize, const T: usize, const M: usize>(
        registry: &CommandRegistry<S, C, N, T, M>,
        config: &ParserConfig<C>,
        buffer_length: usize,
    ) -> Self
    where
        C: CommandCode,
    {
        let entries = registry.entries();
        let commands = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let status = if entry.code == C::INVALID {
                    CodeStatus::Invalid
                } else {
                    entries[..index]
                        .iter()
                        .position(|earlier| earlier.code == entry.code)
                        .map_or(CodeStatus::Valid, |first| CodeStatus::Collision { first })
                };
                CommandDiagnostic {
                    index,
                    code: entry.code.widen(),
                    status,
                }
            })
            .collect();

        Self {
            code_bits: C::BITS,
            array_size: N,
            max_tokens: T,
            max_commands: M,
            buffer_length,
            timeout_ms: config.timeout_ms,
            terminator: config.terminator.as_bytes().to_vec(),
            hash_magic: registry.hash_config().magic.widen(),
            hash_offset: registry.hash_config().offset.widen(),
            tokens: registry
                .tokens()
                .iter()
                .map(|token| token.to_string())
                .collect(),
            commands,
            setup_errors: registry.setup_errors(),
        }
    }

    /// Returns `true` when two entries share a code.
    #[must_use]
    pub fn has_collisions(&self) -> bool {
        self.collisions().next().is_some()
    }

    /// Entries shadowed by an earlier entry with the same code.
    pub fn collisions(&self) -> impl Iterator<Item = &CommandDiagnostic> + '_ {
        self.commands
            .iter()
            .filter(|command| matches!(command.status, CodeStatus::Collision { .. }))
    }

    fn any_status(&self, wanted: CodeStatus) -> bool {
        self.commands.iter().any(|command| command.status == wanted)
    }
}

impl fmt::Display for DebugReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "*** DEBUG INFO ***")?;
        writeln!(f)?;
        writeln!(f, "Max command tree branches: {}", self.array_size)?;
        if self.setup_errors.branch_overflow {
            writeln!(f, " **ERROR** Max branch size exceeded.")?;
        }
        writeln!(f, "Max number of parameters: {}", self.array_size)?;
        writeln!(f, "Message buffer size: {}", self.buffer_length)?;
        writeln!(
            f,
            "Terminator: \"{}\", timeout: {} ms",
            self.terminator.escape_ascii(),
            self.timeout_ms
        )?;
        writeln!(
            f,
            "Hash: {} bits, magic {:#x}, offset {:#x}",
            self.code_bits, self.hash_magic, self.hash_offset
        )?;
        writeln!(f)?;

        writeln!(f, "TOKENS : {} / {}", self.tokens.len(), self.max_tokens)?;
        if self.setup_errors.token_overflow {
            writeln!(f, " **ERROR** Max tokens exceeded.")?;
        }
        for (index, token) in self.tokens.iter().enumerate() {
            writeln!(f, "  {}:\t{token}", index + 1)?;
        }
        writeln!(f)?;

        writeln!(f, "VALID CODES : {} / {}", self.commands.len(), self.max_commands)?;
        if self.setup_errors.command_overflow {
            writeln!(f, " **ERROR** Max commands exceeded.")?;
        }
        writeln!(f, "  #\tHash")?;
        for command in &self.commands {
            writeln!(
                f,
                "  {}:\t{:x}{}",
                command.index + 1,
                command.code,
                command.status.marker()
            )?;
        }

        if self.any_status(CodeStatus::Invalid) {
            writeln!(f, " **ERROR** Tried to register invalid commands. (!%)")?;
        }
        if self.has_collisions() {
            writeln!(f, " **ERROR** Hash collision in command codes. (!!)")?;
        }
        Ok(())
    }
}
