//! Command registration, tree bases and handler lookup.

use core::fmt;

use crate::code::{CommandCode, HashConfig};
use crate::error::SetupErrors;
use crate::hasher::command_code;
use crate::token::{InternOutcome, TokenStore};
use crate::tokenizer::{split_command, Keywords, Parameters};

/// Callback invoked for a matched command, or for an error.
///
/// Receives the parsed keywords, the parameters and the stream the message
/// came from. Both sequences borrow the message buffer and are only valid for
/// the duration of the call.
pub type Handler<S, const N: usize> = fn(&Keywords<'_, N>, &Parameters<'_, N>, &mut S);

/// Error handler used until [`CommandRegistry::set_error_handler`] is called.
pub fn ignore_error<S, const N: usize>(
    _keywords: &Keywords<'_, N>,
    _parameters: &Parameters<'_, N>,
    _stream: &mut S,
) {
}

/// Prefix implicitly prepended to subsequent registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeBase<C> {
    /// Hash of the prefix keywords, used as the seed for later registrations.
    pub code: C,
    /// Number of keywords in the prefix.
    pub length: usize,
}

impl<C: CommandCode> TreeBase<C> {
    /// Root of the command tree.
    #[must_use]
    pub fn root() -> Self {
        Self {
            code: C::UNKNOWN,
            length: 0,
        }
    }

    /// Returns `true` at the root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.code == C::UNKNOWN && self.length == 0
    }
}

/// One registered command.
pub struct Entry<S, C, const N: usize> {
    /// Command code, or [`CommandCode::INVALID`] for a rejected registration.
    pub code: C,
    /// Handler run when the code matches.
    pub handler: Handler<S, N>,
}

impl<S, C: Copy, const N: usize> Clone for Entry<S, C, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, C: Copy, const N: usize> Copy for Entry<S, C, N> {}

impl<S, C: fmt::Debug, const N: usize> fmt::Debug for Entry<S, C, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("code", &self.code)
            .finish_non_exhaustive()
    }
}

/// Ordered table of `(code, handler)` entries plus the token store they are
/// encoded against.
///
/// `N` bounds keywords per command, `T` the token store and `M` the number
/// of entries.
pub struct CommandRegistry<S, C, const N: usize, const T: usize, const M: usize> {
    tokens: TokenStore<T>,
    entries: heapless::Vec<Entry<S, C, N>, M>,
    error_handler: Handler<S, N>,
    tree: TreeBase<C>,
    hash: HashConfig<C>,
    setup_errors: SetupErrors,
}

impl<S, C, const N: usize, const T: usize, const M: usize> CommandRegistry<S, C, N, T, M>
where
    C: CommandCode,
{
    /// Creates an empty registry hashing with `hash`.
    #[must_use]
    pub fn new(hash: HashConfig<C>) -> Self {
        Self {
            tokens: TokenStore::new(),
            entries: heapless::Vec::new(),
            error_handler: ignore_error::<S, N>,
            tree: TreeBase::root(),
            hash,
            setup_errors: SetupErrors::default(),
        }
    }

    fn intern_all(&mut self, keywords: &Keywords<'_, N>) {
        for keyword in keywords.iter() {
            if self.tokens.intern(keyword) == InternOutcome::Overflow {
                self.setup_errors.token_overflow = true;
            }
        }
    }

    /// Sets the prefix for subsequent [`CommandRegistry::register`] calls.
    ///
    /// An empty prefix returns to the root. The prefix hash is computed from
    /// the root and baked into every later registration, so call order
    /// matters. A prefix with more keywords than a sequence holds sets
    /// `branch_overflow` and makes later registrations invalid, as does a
    /// prefix whose keywords could not all be interned.
    pub fn set_tree_base(&mut self, prefix: &str) {
        let (keywords, _) = split_command::<N>(prefix.as_bytes());
        if keywords.is_empty() {
            self.tree = TreeBase::root();
            return;
        }
        self.intern_all(&keywords);

        let mut code = command_code(keywords.as_slice(), C::UNKNOWN, &self.tokens, &self.hash);
        if code == C::UNKNOWN {
            code = C::INVALID;
        }
        if keywords.overflowed() {
            self.setup_errors.branch_overflow = true;
            code = C::INVALID;
        }
        self.tree = TreeBase {
            code,
            length: keywords.len(),
        };
    }

    /// Registers `command` under the current tree base.
    ///
    /// A full registry sets `command_overflow` and drops the command. A
    /// command that cannot be encoded is still stored, with the
    /// [`CommandCode::INVALID`] code, so the debug report can point at it.
    pub fn register(&mut self, command: &str, handler: Handler<S, N>) {
        if self.entries.is_full() {
            self.setup_errors.command_overflow = true;
            return;
        }
        let (keywords, _) = split_command::<N>(command.as_bytes());
        self.intern_all(&keywords);

        let mut code = command_code(keywords.as_slice(), self.tree.code, &self.tokens, &self.hash);
        if code == C::UNKNOWN {
            code = C::INVALID;
        }
        if keywords.overflowed() || self.tree.length + keywords.len() > N {
            self.setup_errors.command_overflow = true;
            code = C::INVALID;
        }
        if self.entries.push(Entry { code, handler }).is_err() {
            self.setup_errors.command_overflow = true;
        }
    }

    /// Replaces the error handler.
    pub fn set_error_handler(&mut self, handler: Handler<S, N>) {
        self.error_handler = handler;
    }

    /// Current error handler.
    #[must_use]
    pub fn error_handler(&self) -> Handler<S, N> {
        self.error_handler
    }

    /// Position of the first entry registered with `code`.
    ///
    /// Entries stored as [`CommandCode::INVALID`] are never returned.
    #[must_use]
    pub fn position(&self, code: C) -> Option<usize> {
        if code == C::INVALID {
            return None;
        }
        self.entries.iter().position(|entry| entry.code == code)
    }

    /// Handler of the first entry registered with `code`.
    #[must_use]
    pub fn lookup(&self, code: C) -> Option<Handler<S, N>> {
        self.position(code).map(|index| self.entries[index].handler)
    }

    /// Hashes a keyword sequence under the current tree base.
    #[must_use]
    pub fn code_of(&self, keywords: &[&[u8]]) -> C {
        command_code(keywords, self.tree.code, &self.tokens, &self.hash)
    }

    /// Returns to the root tree base.
    pub fn reset_tree_base(&mut self) {
        self.tree = TreeBase::root();
    }

    /// Active tree base.
    #[must_use]
    pub const fn tree_base(&self) -> TreeBase<C> {
        self.tree
    }

    /// Interned tokens.
    #[must_use]
    pub const fn tokens(&self) -> &TokenStore<T> {
        &self.tokens
    }

    /// Registered entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[Entry<S, C, N>] {
        &self.entries
    }

    /// Number of registered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registry capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        M
    }

    /// Hash parameters.
    #[must_use]
    pub const fn hash_config(&self) -> &HashConfig<C> {
        &self.hash
    }

    /// Capacity problems met during setup.
    #[must_use]
    pub const fn setup_errors(&self) -> SetupErrors {
        self.setup_errors
    }
}

impl<S, C, const N: usize, const T: usize, const M: usize> fmt::Debug
    for CommandRegistry<S, C, N, T, M>
where
    C: CommandCode,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("tokens", &self.tokens)
            .field("entries", &self.entries.as_slice())
            .field("tree", &self.tree)
            .field("hash", &self.hash)
            .field("setup_errors", &self.setup_errors)
            .finish_non_exhaustive()
    }
}
