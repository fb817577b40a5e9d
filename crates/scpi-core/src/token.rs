//! Interned keyword spellings.
//!
//! A token is the canonical spelling of one keyword as it was registered:
//! uppercase bytes form the short form, trailing lowercase bytes extend it to
//! the long form and an optional final `#` accepts a numeric suffix. The store
//! is append-only and its indices are the alphabet of the command hash.

use core::fmt;

/// Marker for a keyword that accepts trailing ASCII digits.
pub const NUMERIC_SUFFIX_MARKER: u8 = b'#';

/// Marker for a query command; never stored in a token.
pub const QUERY_MARKER: u8 = b'?';

/// One canonical keyword spelling.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Token {
    spelling: Box<[u8]>,
}

impl Token {
    fn new(spelling: &[u8]) -> Self {
        Self {
            spelling: spelling.into(),
        }
    }

    /// Stored spelling bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.spelling
    }

    /// Number of leading uppercase bytes: the short form.
    #[must_use]
    pub fn short_len(&self) -> usize {
        self.spelling
            .iter()
            .take_while(|byte| byte.is_ascii_uppercase())
            .count()
    }

    /// Full spelling length, including any numeric-suffix marker.
    #[must_use]
    pub fn len(&self) -> usize {
        self.spelling.len()
    }

    /// Returns `true` for an empty spelling.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spelling.is_empty()
    }

    /// Returns `true` when the spelling ends in the numeric-suffix marker.
    #[must_use]
    pub fn accepts_numeric_suffix(&self) -> bool {
        self.spelling.last() == Some(&NUMERIC_SUFFIX_MARKER)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({:?})", String::from_utf8_lossy(&self.spelling))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.spelling))
    }
}

/// Outcome of [`TokenStore::intern`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InternOutcome {
    /// Spelling was appended at this index.
    Inserted(usize),
    /// An identical spelling already lives at this index.
    Existing(usize),
    /// Store was full; nothing was stored.
    Overflow,
    /// Keyword had no bytes left after removing the query marker.
    Empty,
}

/// Append-only, bounded set of canonical keyword spellings.
#[derive(Debug, Clone, Default)]
pub struct TokenStore<const N: usize> {
    tokens: heapless::Vec<Token, N>,
    overflowed: bool,
}

impl<const N: usize> TokenStore<N> {
    /// Creates an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tokens: heapless::Vec::new(),
            overflowed: false,
        }
    }

    /// Adds a keyword spelling unless an identical one is already stored.
    ///
    /// A trailing query marker is dropped first. Duplicates are detected by
    /// exact, case-sensitive comparison, so `SYSTem` and `SYSTEM` are two
    /// tokens. A new spelling that does not fit sets the sticky overflow flag;
    /// re-interning a stored spelling never does.
    pub fn intern(&mut self, keyword: &[u8]) -> InternOutcome {
        let spelling = keyword.strip_suffix(&[QUERY_MARKER]).unwrap_or(keyword);
        if spelling.is_empty() {
            return InternOutcome::Empty;
        }
        if let Some(index) = self.position(spelling) {
            return InternOutcome::Existing(index);
        }
        let index = self.tokens.len();
        if self.tokens.push(Token::new(spelling)).is_err() {
            self.overflowed = true;
            return InternOutcome::Overflow;
        }
        InternOutcome::Inserted(index)
    }

    /// Index of an exact spelling.
    #[must_use]
    pub fn position(&self, spelling: &[u8]) -> Option<usize> {
        self.tokens
            .iter()
            .position(|token| token.as_bytes() == spelling)
    }

    /// Token at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    /// Tokens in index order.
    pub fn iter(&self) -> core::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    /// Number of stored tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns `true` when nothing has been interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Store capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Returns `true` once an insert was refused for lack of room.
    #[must_use]
    pub const fn overflowed(&self) -> bool {
        self.overflowed
    }
}

impl<'a, const N: usize> IntoIterator for &'a TokenStore<N> {
    type Item = &'a Token;
    type IntoIter = core::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{InternOutcome, TokenStore};

    #[test]
    fn intern_strips_query_marker() {
        let mut store = TokenStore::<4>::new();
        assert_eq!(store.intern(b"*IDN?"), InternOutcome::Inserted(0));
        assert_eq!(store.get(0).map(super::Token::as_bytes), Some(&b"*IDN"[..]));
    }

    #[test]
    fn intern_ignores_exact_duplicates() {
        let mut store = TokenStore::<4>::new();
        store.intern(b"SYSTem");
        assert_eq!(store.intern(b"SYSTem"), InternOutcome::Existing(0));
        assert_eq!(store.intern(b"SYSTem?"), InternOutcome::Existing(0));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn duplicate_detection_is_case_sensitive() {
        let mut store = TokenStore::<4>::new();
        store.intern(b"SYSTem");
        assert_eq!(store.intern(b"SYSTEM"), InternOutcome::Inserted(1));
    }

    #[test]
    fn prefix_of_existing_token_is_a_new_token() {
        let mut store = TokenStore::<4>::new();
        store.intern(b"LEDs");
        assert_eq!(store.intern(b"LED"), InternOutcome::Inserted(1));
    }

    #[test]
    fn full_store_sets_sticky_overflow() {
        let mut store = TokenStore::<2>::new();
        store.intern(b"A");
        store.intern(b"B");
        assert!(!store.overflowed());
        assert_eq!(store.intern(b"B"), InternOutcome::Existing(1));
        assert!(!store.overflowed());
        assert_eq!(store.intern(b"C"), InternOutcome::Overflow);
        assert!(store.overflowed());
        assert_eq!(store.len(), 2);
        assert_eq!(store.capacity(), 2);
    }

    #[test]
    fn bare_query_marker_is_not_stored() {
        let mut store = TokenStore::<2>::new();
        assert_eq!(store.intern(b"?"), InternOutcome::Empty);
        assert!(store.is_empty());
    }

    #[test]
    fn token_forms_follow_letter_case() {
        let mut store = TokenStore::<4>::new();
        store.intern(b"CHANnel#");
        store.intern(b"*IDN");
        let channel = store.get(0).expect("channel token");
        assert_eq!(channel.short_len(), 4);
        assert_eq!(channel.len(), 8);
        assert!(channel.accepts_numeric_suffix());
        let idn = store.get(1).expect("idn token");
        assert_eq!(idn.short_len(), 0);
        assert!(!idn.accepts_numeric_suffix());
        assert_eq!(idn.to_string(), "*IDN");
    }
}
