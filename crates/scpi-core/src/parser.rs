//! Owning parser facade: registry, message buffer and last error.

use core::fmt;

use crate::assembler::{AssemblerPoll, MessageAssembler};
use crate::code::CommandCode;
use crate::config::{
    ParserConfig, DEFAULT_ARRAY_SIZE, DEFAULT_BUFFER_LENGTH, DEFAULT_MAX_COMMANDS,
    DEFAULT_MAX_TOKENS,
};
use crate::diag::DebugReport;
use crate::error::{ConfigError, ErrorCode, SetupErrors};
use crate::execute::{execute_message, raise_error};
use crate::registry::{CommandRegistry, Handler, TreeBase};
use crate::stream::{ByteStream, Clock};
use crate::token::TokenStore;
use crate::tokenizer::{Keywords, Parameters};
use crate::trace::{NoTrace, TraceEvent, TraceSink};

/// SCPI command parser.
///
/// `S` is the stream type handed to handlers, `C` the command-code width.
/// `ARRAY` bounds keywords and parameters per command, `TOKENS` the token
/// store, `COMMANDS` the registry and `BUFFER` the message buffer, which must
/// hold the longest message plus its terminator.
///
/// Setup (`register`, `set_tree_base`, `set_error_handler`) is expected to
/// finish before the first message is processed.
pub struct ScpiParser<
    S,
    C = u8,
    const ARRAY: usize = DEFAULT_ARRAY_SIZE,
    const TOKENS: usize = DEFAULT_MAX_TOKENS,
    const COMMANDS: usize = DEFAULT_MAX_COMMANDS,
    const BUFFER: usize = DEFAULT_BUFFER_LENGTH,
> {
    registry: CommandRegistry<S, C, ARRAY, TOKENS, COMMANDS>,
    assembler: MessageAssembler<BUFFER>,
    config: ParserConfig<C>,
    last_error: ErrorCode,
}

impl<S, C, const ARRAY: usize, const TOKENS: usize, const COMMANDS: usize, const BUFFER: usize>
    Default for ScpiParser<S, C, ARRAY, TOKENS, COMMANDS, BUFFER>
where
    C: CommandCode,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S, C, const ARRAY: usize, const TOKENS: usize, const COMMANDS: usize, const BUFFER: usize>
    ScpiParser<S, C, ARRAY, TOKENS, COMMANDS, BUFFER>
where
    C: CommandCode,
{
    /// Creates a parser with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::build(ParserConfig::default())
    }

    /// Creates a parser with `config`.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] reported by [`ParserConfig::validate`]
    /// against this parser's buffer length.
    pub fn with_config(config: ParserConfig<C>) -> Result<Self, ConfigError> {
        config.validate(BUFFER)?;
        Ok(Self::build(config))
    }

    fn build(config: ParserConfig<C>) -> Self {
        Self {
            registry: CommandRegistry::new(config.hash),
            assembler: MessageAssembler::new(),
            config,
            last_error: ErrorCode::NoError,
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &ParserConfig<C> {
        &self.config
    }

    /// Sets the prefix implicitly prepended to later registrations.
    ///
    /// An empty prefix returns to the root.
    pub fn set_tree_base(&mut self, prefix: &str) {
        self.registry.set_tree_base(prefix);
    }

    /// Registers `command` under the current tree base.
    ///
    /// Uppercase letters of each keyword form the short spelling, a trailing
    /// `#` accepts a numeric suffix and a trailing `?` marks a query.
    pub fn register(&mut self, command: &str, handler: Handler<S, ARRAY>) {
        self.registry.register(command, handler);
    }

    /// Replaces the error handler. The default does nothing.
    pub fn set_error_handler(&mut self, handler: Handler<S, ARRAY>) {
        self.registry.set_error_handler(handler);
    }

    /// Executes a complete message, without terminator.
    pub fn execute(&mut self, message: &[u8], stream: &mut S) {
        self.execute_traced(message, stream, &mut NoTrace);
    }

    /// [`ScpiParser::execute`] reporting to `trace`.
    pub fn execute_traced(&mut self, message: &[u8], stream: &mut S, trace: &mut dyn TraceSink) {
        execute_message(
            &mut self.registry,
            &mut self.last_error,
            message,
            stream,
            trace,
        );
    }

    /// Last error raised. Stable after a dispatch call returns.
    #[must_use]
    pub const fn last_error(&self) -> ErrorCode {
        self.last_error
    }

    /// Capacity problems met during setup.
    #[must_use]
    pub const fn setup_errors(&self) -> SetupErrors {
        self.registry.setup_errors()
    }

    /// Interned tokens.
    #[must_use]
    pub const fn tokens(&self) -> &TokenStore<TOKENS> {
        self.registry.tokens()
    }

    /// Command registry.
    #[must_use]
    pub const fn registry(&self) -> &CommandRegistry<S, C, ARRAY, TOKENS, COMMANDS> {
        &self.registry
    }

    /// Active tree base.
    #[must_use]
    pub const fn tree_base(&self) -> TreeBase<C> {
        self.registry.tree_base()
    }

    /// Bytes of the message currently being assembled.
    #[must_use]
    pub const fn assembler_cursor(&self) -> usize {
        self.assembler.cursor()
    }

    /// Snapshot of the parser setup for diagnostics.
    #[must_use]
    pub fn debug_report(&self) -> DebugReport {
        DebugReport::new(&self.registry, &self.config, BUFFER)
    }

    fn raise_transport_error(&mut self, error: ErrorCode, stream: &mut S, trace: &mut dyn TraceSink) {
        raise_error(
            &self.registry,
            &mut self.last_error,
            error,
            &Keywords::new(),
            &Parameters::new(),
            stream,
            trace,
        );
    }
}

impl<S, C, const ARRAY: usize, const TOKENS: usize, const COMMANDS: usize, const BUFFER: usize>
    ScpiParser<S, C, ARRAY, TOKENS, COMMANDS, BUFFER>
where
    S: ByteStream,
    C: CommandCode,
{
    /// Reads available bytes and returns a completed message.
    ///
    /// Timeouts and overflows set the last error and run the error handler
    /// with empty sequences. The returned slice borrows the message buffer
    /// and is overwritten by the next call.
    pub fn get_message<K>(&mut self, stream: &mut S, clock: &K) -> Option<&[u8]>
    where
        K: Clock + ?Sized,
    {
        match self.poll(stream, clock) {
            AssemblerPoll::Message(length) => Some(self.assembler.message(length)),
            AssemblerPoll::Failed(error) => {
                self.raise_transport_error(error, stream, &mut NoTrace);
                None
            }
            AssemblerPoll::Idle | AssemblerPoll::Pending => None,
        }
    }

    /// Reads available bytes and executes a message once one is complete.
    ///
    /// Bytes after the first terminator stay in the stream until the next
    /// call.
    pub fn process_input<K>(&mut self, stream: &mut S, clock: &K)
    where
        K: Clock + ?Sized,
    {
        self.process_input_traced(stream, clock, &mut NoTrace);
    }

    /// [`ScpiParser::process_input`] reporting to `trace`.
    pub fn process_input_traced<K>(&mut self, stream: &mut S, clock: &K, trace: &mut dyn TraceSink)
    where
        K: Clock + ?Sized,
    {
        match self.poll(stream, clock) {
            AssemblerPoll::Message(length) => {
                trace.on_event(TraceEvent::MessageAssembled { length });
                execute_message(
                    &mut self.registry,
                    &mut self.last_error,
                    self.assembler.message(length),
                    stream,
                    trace,
                );
            }
            AssemblerPoll::Failed(error) => self.raise_transport_error(error, stream, trace),
            AssemblerPoll::Idle | AssemblerPoll::Pending => {}
        }
    }

    fn poll<K>(&mut self, stream: &mut S, clock: &K) -> AssemblerPoll
    where
        K: Clock + ?Sized,
    {
        self.assembler.poll(
            stream,
            clock,
            self.config.terminator.as_bytes(),
            self.config.timeout_ms,
        )
    }
}

impl<S, C, const ARRAY: usize, const TOKENS: usize, const COMMANDS: usize, const BUFFER: usize>
    fmt::Debug for ScpiParser<S, C, ARRAY, TOKENS, COMMANDS, BUFFER>
where
    C: CommandCode,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScpiParser")
            .field("registry", &self.registry)
            .field("assembler_cursor", &self.assembler.cursor())
            .field("config", &self.config)
            .field("last_error", &self.last_error)
            .finish()
    }
}
