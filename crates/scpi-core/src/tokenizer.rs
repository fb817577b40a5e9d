//! Splitting of sub-commands into keyword and parameter sequences.
//!
//! Both sequences are borrowed views into the message buffer; nothing is
//! copied or rewritten. A sequence holds at most `N` slices and remembers
//! whether anything had to be dropped.

use core::ops::Index;

use crate::config::DEFAULT_ARRAY_SIZE;

/// Separator between keywords of one command.
pub const KEYWORD_SEPARATOR: u8 = b':';

/// Separator between parameters.
pub const PARAMETER_SEPARATOR: u8 = b',';

/// Separator between sub-commands of one message.
pub const COMMAND_SEPARATOR: u8 = b';';

/// Bounded sequence of byte slices borrowed from a message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Segments<'a, const N: usize = DEFAULT_ARRAY_SIZE> {
    items: heapless::Vec<&'a [u8], N>,
    overflowed: bool,
}

/// Keywords of one command, e.g. `["SYST", "LED"]`.
pub type Keywords<'a, const N: usize = DEFAULT_ARRAY_SIZE> = Segments<'a, N>;

/// Parameters following a command, e.g. `["1", "2.5"]`.
pub type Parameters<'a, const N: usize = DEFAULT_ARRAY_SIZE> = Segments<'a, N>;

impl<'a, const N: usize> Segments<'a, N> {
    /// Creates an empty sequence.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: heapless::Vec::new(),
            overflowed: false,
        }
    }

    /// Appends a slice, or sets the overflow flag when the sequence is full.
    pub fn push(&mut self, item: &'a [u8]) {
        if self.items.push(item).is_err() {
            self.overflowed = true;
        }
    }

    /// Removes and returns the last slice.
    pub fn pop(&mut self) -> Option<&'a [u8]> {
        self.items.pop()
    }

    /// Slice at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&'a [u8]> {
        self.items.get(index).copied()
    }

    /// Slice at `index` as text, when it is valid UTF-8.
    #[must_use]
    pub fn get_str(&self, index: usize) -> Option<&'a str> {
        self.get(index).and_then(|bytes| core::str::from_utf8(bytes).ok())
    }

    /// First slice.
    #[must_use]
    pub fn first(&self) -> Option<&'a [u8]> {
        self.items.first().copied()
    }

    /// Last slice.
    #[must_use]
    pub fn last(&self) -> Option<&'a [u8]> {
        self.items.last().copied()
    }

    /// Slices in order.
    pub fn iter(&self) -> impl Iterator<Item = &'a [u8]> + '_ {
        self.items.iter().copied()
    }

    /// Borrowed slices as a plain slice.
    #[must_use]
    pub fn as_slice(&self) -> &[&'a [u8]] {
        &self.items
    }

    /// Number of slices held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` when no slice is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sequence capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Returns `true` when a slice was dropped because the sequence was full.
    #[must_use]
    pub const fn overflowed(&self) -> bool {
        self.overflowed
    }
}

impl<'a, const N: usize> Index<usize> for Segments<'a, N> {
    type Output = [u8];

    fn index(&self, index: usize) -> &Self::Output {
        self.items[index]
    }
}

const fn is_blank(byte: u8) -> bool {
    byte == b' ' || byte == b'\t'
}

fn trim_leading_whitespace(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|byte| !byte.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    &bytes[start..]
}

/// Splits a sub-command into its keywords and the unprocessed parameter tail.
///
/// Leading whitespace is skipped, the command ends at the first space or tab
/// and the command region is split on `:` with empty segments skipped. The
/// tail after that first blank is returned for [`split_parameters`]; it is
/// `None` when the sub-command has no blank.
#[must_use]
pub fn split_command<const N: usize>(sub_command: &[u8]) -> (Keywords<'_, N>, Option<&[u8]>) {
    let trimmed = trim_leading_whitespace(sub_command);
    let (command, tail) = match trimmed.iter().position(|&byte| is_blank(byte)) {
        Some(at) => (&trimmed[..at], Some(&trimmed[at + 1..])),
        None => (trimmed, None),
    };

    let mut keywords = Keywords::new();
    for keyword in command
        .split(|&byte| byte == KEYWORD_SEPARATOR)
        .filter(|segment| !segment.is_empty())
    {
        keywords.push(keyword);
    }
    (keywords, tail)
}

/// Splits a parameter tail on `,`.
///
/// Empty raw segments are skipped and leading blanks of each parameter are
/// trimmed. Trailing blanks are kept; parameters are passed on verbatim.
#[must_use]
pub fn split_parameters<const N: usize>(tail: Option<&[u8]>) -> Parameters<'_, N> {
    let mut parameters = Parameters::new();
    let Some(tail) = tail else {
        return parameters;
    };
    for segment in tail
        .split(|&byte| byte == PARAMETER_SEPARATOR)
        .filter(|segment| !segment.is_empty())
    {
        let start = segment
            .iter()
            .position(|&byte| !is_blank(byte))
            .unwrap_or(segment.len());
        parameters.push(&segment[start..]);
    }
    parameters
}

/// Iterates over the `;`-separated sub-commands of a message.
///
/// A message with no separator yields itself once; a trailing separator
/// yields a final empty sub-command. Separators inside parameters are not
/// recognised and split the message there.
pub fn sub_commands(message: &[u8]) -> impl Iterator<Item = &[u8]> {
    message.split(|&byte| byte == COMMAND_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::{split_command, split_parameters, sub_commands, Keywords, Parameters};
    use rstest::rstest;

    fn keywords_of(input: &[u8]) -> Vec<&[u8]> {
        let (keywords, _): (Keywords<'_, 6>, _) = split_command(input);
        keywords.iter().collect()
    }

    #[rstest]
    #[case(b"SYST:LED", &[b"SYST".as_slice(), b"LED"])]
    #[case(b"  \t*IDN?", &[b"*IDN?".as_slice()])]
    #[case(b":SYST::LED:", &[b"SYST".as_slice(), b"LED"])]
    #[case(b"\n*IDN?", &[b"*IDN?".as_slice()])]
    fn command_splits_on_colons(#[case] input: &[u8], #[case] expected: &[&[u8]]) {
        assert_eq!(keywords_of(input), expected);
    }

    #[test]
    fn command_tail_starts_after_first_blank() {
        let (keywords, tail): (Keywords<'_, 6>, _) = split_command(b"syst:led 1, 2");
        assert_eq!(keywords.len(), 2);
        assert_eq!(tail, Some(&b"1, 2"[..]));

        let (_, tab_tail): (Keywords<'_, 6>, _) = split_command(b"VOLT\t3");
        assert_eq!(tab_tail, Some(&b"3"[..]));

        let (_, none): (Keywords<'_, 6>, _) = split_command(b"*IDN?");
        assert_eq!(none, None);
    }

    #[test]
    fn empty_input_yields_no_keywords() {
        let (keywords, tail): (Keywords<'_, 6>, _) = split_command(b"   ");
        assert!(keywords.is_empty());
        assert_eq!(tail, None);
    }

    #[test]
    fn keyword_overflow_keeps_first_entries() {
        let (keywords, _): (Keywords<'_, 2>, _) = split_command(b"A:B:C");
        assert_eq!(keywords.as_slice(), &[b"A".as_slice(), b"B"]);
        assert!(keywords.overflowed());
    }

    #[rstest]
    #[case(b"1", &[b"1".as_slice()])]
    #[case(b"5,  minutes", &[b"5".as_slice(), b"minutes"])]
    #[case(b"1,,2", &[b"1".as_slice(), b"2"])]
    #[case(b"1, ,2", &[b"1".as_slice(), b"", b"2"])]
    #[case(b"2.5 ", &[b"2.5 ".as_slice()])]
    fn parameters_split_on_commas(#[case] tail: &[u8], #[case] expected: &[&[u8]]) {
        let parameters: Parameters<'_, 6> = split_parameters(Some(tail));
        assert_eq!(parameters.as_slice(), expected);
    }

    #[test]
    fn missing_tail_yields_no_parameters() {
        let parameters: Parameters<'_, 6> = split_parameters(None);
        assert!(parameters.is_empty());
        assert!(!parameters.overflowed());
    }

    #[test]
    fn parameter_overflow_sets_flag() {
        let parameters: Parameters<'_, 2> = split_parameters(Some(b"1,2,3"));
        assert_eq!(parameters.len(), 2);
        assert!(parameters.overflowed());
    }

    #[test]
    fn sub_commands_split_unconditionally() {
        let parts: Vec<&[u8]> = sub_commands(b"*IDN?;SYST:LED 1;").collect();
        assert_eq!(parts, vec![&b"*IDN?"[..], b"SYST:LED 1", b""]);

        let quoted: Vec<&[u8]> = sub_commands(b"TEXT \"a;b\"").collect();
        assert_eq!(quoted.len(), 2);
    }

    #[test]
    fn sequence_accessors_follow_insertion_order() {
        let mut parameters: Parameters<'_, 4> = split_parameters(Some(b"a,b,c"));
        assert_eq!(parameters.first(), Some(&b"a"[..]));
        assert_eq!(parameters.last(), Some(&b"c"[..]));
        assert_eq!(&parameters[1], b"b");
        assert_eq!(parameters.get_str(1), Some("b"));
        assert_eq!(parameters.pop(), Some(&b"c"[..]));
        assert_eq!(parameters.len(), 2);
        assert_eq!(parameters.get(5), None);
        assert_eq!(parameters.capacity(), 4);
    }
}
