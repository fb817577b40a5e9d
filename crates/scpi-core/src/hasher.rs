//! Command hashing over token indices.
//!
//! Each keyword is matched against the token store and replaced by the index
//! of the first token it matches; the sequence of indices is folded into a
//! command code:
//!
//! ```text
//! code(0) = tree_code, or offset at the root
//! code(i) = code(i - 1) * magic + index(keyword i)
//! query   = code(n) * magic - 1
//! ```
//!
//! Matching a keyword never allocates and is a linear scan: the store is
//! small enough that this beats any lookup structure.

use crate::code::{CommandCode, HashConfig};
use crate::token::{Token, TokenStore, NUMERIC_SUFFIX_MARKER, QUERY_MARKER};

/// Drops trailing digits from `keyword` when `token` accepts a numeric suffix
/// and the keyword does not end in the marker itself.
///
/// Returns the keyword to compare and the long-form length of the token.
fn strip_numeric_suffix<'k>(token: &Token, keyword: &'k [u8]) -> (&'k [u8], usize) {
    let long_len = token.len();
    if !token.accepts_numeric_suffix() || keyword.last() == Some(&NUMERIC_SUFFIX_MARKER) {
        return (keyword, long_len);
    }
    let digits = keyword
        .iter()
        .rev()
        .take_while(|byte| byte.is_ascii_digit())
        .count();
    (&keyword[..keyword.len() - digits], long_len - 1)
}

fn spells(token: &Token, keyword: &[u8], long_len: usize) -> bool {
    let spelling = token.as_bytes();
    let short_len = token.short_len();
    if keyword.is_empty() {
        return false;
    }
    if keyword.len() == short_len {
        return keyword.eq_ignore_ascii_case(&spelling[..short_len]);
    }
    if keyword.len() == long_len {
        return keyword.eq_ignore_ascii_case(&spelling[..long_len]);
    }
    false
}

/// Returns `true` when an input keyword spells `token` in short or long form.
///
/// Comparison is ASCII case-insensitive. When the token accepts a numeric
/// suffix and the keyword does not end in the marker itself, trailing digits
/// are dropped from the keyword and the marker from the long form. A keyword
/// with nothing left to compare never matches.
#[must_use]
pub fn keyword_matches(token: &Token, keyword: &[u8]) -> bool {
    let (keyword, long_len) = strip_numeric_suffix(token, keyword);
    spells(token, keyword, long_len)
}

/// Index of the first token matched by `keyword`.
///
/// Tokens are tried in store order. Digits stripped for a numeric-suffix
/// token stay stripped for every later token in the scan.
#[must_use]
pub fn match_token<const T: usize>(tokens: &TokenStore<T>, keyword: &[u8]) -> Option<usize> {
    let mut keyword = keyword;
    tokens.iter().position(|token| {
        let (stripped, long_len) = strip_numeric_suffix(token, keyword);
        keyword = stripped;
        spells(token, keyword, long_len)
    })
}

/// Computes the code of a keyword sequence hashed under `tree_code`.
///
/// Returns [`CommandCode::INVALID`] when the tree code is invalid and
/// [`CommandCode::UNKNOWN`] for an empty sequence or any keyword that matches
/// no token. A trailing `?` on the last keyword marks a query and adds one
/// more hash step.
#[must_use]
pub fn command_code<C: CommandCode, const T: usize>(
    keywords: &[&[u8]],
    tree_code: C,
    tokens: &TokenStore<T>,
    hash: &HashConfig<C>,
) -> C {
    if tree_code == C::INVALID {
        return C::INVALID;
    }
    let mut code = if tree_code == C::UNKNOWN {
        hash.offset
    } else {
        tree_code
    };
    let Some((last, leading)) = keywords.split_last() else {
        return C::UNKNOWN;
    };

    for keyword in leading {
        let Some(index) = match_token(tokens, keyword) else {
            return C::UNKNOWN;
        };
        code = code.keyword_step(hash.magic, C::from_index(index));
    }

    let (last, is_query) = match last.strip_suffix(&[QUERY_MARKER]) {
        Some(stripped) => (stripped, true),
        None => (*last, false),
    };
    let Some(index) = match_token(tokens, last) else {
        return C::UNKNOWN;
    };
    code = code.keyword_step(hash.magic, C::from_index(index));

    if is_query {
        code = code.query_step(hash.magic);
    }
    code
}
