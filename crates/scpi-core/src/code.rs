//! Command-code integer abstraction and hash parameters.
//!
//! A command code is the compact identity of a registered command. Codes are
//! plain unsigned integers; every arithmetic step wraps, so the code width is
//! chosen by the host to trade registry memory against collision odds.

use core::fmt;

/// Default hash multiplier applied once per keyword and once more for queries.
pub const DEFAULT_HASH_MAGIC: u8 = 37;

/// Default seed used when hashing from the root of the command tree.
pub const DEFAULT_HASH_OFFSET: u8 = 7;

/// Unsigned integer usable as a command code.
///
/// Two values are reserved: [`CommandCode::UNKNOWN`] marks input that does not
/// match the registered grammar and [`CommandCode::INVALID`] marks a
/// registration or tree base that could not be encoded.
pub trait CommandCode: Copy + Eq + fmt::Debug + fmt::LowerHex + 'static {
    /// Code of input that referenced keywords outside the token store.
    const UNKNOWN: Self;
    /// Code of registrations that overflowed a capacity limit.
    const INVALID: Self;
    /// Width of the code in bits.
    const BITS: u32;

    /// Converts a small constant into a code.
    fn from_u8(value: u8) -> Self;

    /// Converts a token index into a code, truncating to the code width.
    fn from_index(index: usize) -> Self;

    /// Widens the code for width-independent reporting.
    fn widen(self) -> u64;

    /// One keyword step: `self * magic + index`, wrapping.
    #[must_use]
    fn keyword_step(self, magic: Self, index: Self) -> Self;

    /// Query step applied after the last keyword: `self * magic - 1`, wrapping.
    #[must_use]
    fn query_step(self, magic: Self) -> Self;

    /// Returns `true` for the two reserved codes.
    fn is_reserved(self) -> bool {
        self == Self::UNKNOWN || self == Self::INVALID
    }
}

macro_rules! impl_command_code {
    ($($ty:ty),* $(,)?) => {
        $(
            impl CommandCode for $ty {
                const UNKNOWN: Self = 0;
                const INVALID: Self = 1;
                const BITS: u32 = <$ty>::BITS;

                fn from_u8(value: u8) -> Self {
                    Self::from(value)
                }

                #[allow(clippy::cast_possible_truncation)]
                fn from_index(index: usize) -> Self {
                    index as $ty
                }

                #[allow(clippy::cast_lossless)]
                fn widen(self) -> u64 {
                    self as u64
                }

                fn keyword_step(self, magic: Self, index: Self) -> Self {
                    self.wrapping_mul(magic).wrapping_add(index)
                }

                fn query_step(self, magic: Self) -> Self {
                    self.wrapping_mul(magic).wrapping_sub(1)
                }
            }
        )*
    };
}

impl_command_code!(u8, u16, u32, u64);

/// Multiplier and root seed of the command hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct HashConfig<C> {
    /// Multiplier applied per keyword and for the final query step.
    pub magic: C,
    /// Seed used when no tree base is active.
    pub offset: C,
}

impl<C: CommandCode> Default for HashConfig<C> {
    fn default() -> Self {
        Self {
            magic: C::from_u8(DEFAULT_HASH_MAGIC),
            offset: C::from_u8(DEFAULT_HASH_OFFSET),
        }
    }
}
