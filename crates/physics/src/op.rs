//! Boolean operators for combining two occupancy sets.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A two-input boolean predicate stored as its truth table.
///
/// Bit `(a << 1) | b` of the table holds `apply(a, b)`, so the named constants line up
/// with the conventional sixteen-operator ordering (`FALSE` = 0 through `TRUE` = 15).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BooleanOp {
    table: u8,
}

const NAMES: [&str; 16] = [
    "false",
    "not_or",
    "only_second",
    "not_first",
    "only_first",
    "not_second",
    "not_same",
    "not_and",
    "and",
    "same",
    "second",
    "causes",
    "first",
    "caused_by",
    "or",
    "true",
];

impl BooleanOp {
    /// Always false.
    pub const FALSE: Self = Self::from_table(0b0000);
    /// Neither input.
    pub const NOT_OR: Self = Self::from_table(0b0001);
    /// Second input but not the first.
    pub const ONLY_SECOND: Self = Self::from_table(0b0010);
    /// Negated first input.
    pub const NOT_FIRST: Self = Self::from_table(0b0011);
    /// First input but not the second.
    pub const ONLY_FIRST: Self = Self::from_table(0b0100);
    /// Negated second input.
    pub const NOT_SECOND: Self = Self::from_table(0b0101);
    /// Exclusive or.
    pub const NOT_SAME: Self = Self::from_table(0b0110);
    /// Not both inputs.
    pub const NOT_AND: Self = Self::from_table(0b0111);
    /// Intersection.
    pub const AND: Self = Self::from_table(0b1000);
    /// Equivalence.
    pub const SAME: Self = Self::from_table(0b1001);
    /// Second input.
    pub const SECOND: Self = Self::from_table(0b1010);
    /// `first` implies `second`.
    pub const CAUSES: Self = Self::from_table(0b1011);
    /// First input.
    pub const FIRST: Self = Self::from_table(0b1100);
    /// `second` implies `first`.
    pub const CAUSED_BY: Self = Self::from_table(0b1101);
    /// Union.
    pub const OR: Self = Self::from_table(0b1110);
    /// Always true.
    pub const TRUE: Self = Self::from_table(0b1111);

    const fn from_table(table: u8) -> Self {
        Self { table: table & 0b1111 }
    }

    /// Tabulate an arbitrary predicate once.
    pub fn from_fn(predicate: impl Fn(bool, bool) -> bool) -> Self {
        let mut table = 0;
        for a in [false, true] {
            for b in [false, true] {
                if predicate(a, b) {
                    table |= 1 << ((u8::from(a) << 1) | u8::from(b));
                }
            }
        }
        Self::from_table(table)
    }

    /// Evaluate the operator.
    #[inline]
    pub fn apply(self, first: bool, second: bool) -> bool {
        self.table & (1 << ((u8::from(first) << 1) | u8::from(second))) != 0
    }

    /// Result where only the first input is set.
    #[inline]
    pub fn only_first(self) -> bool {
        self.apply(true, false)
    }

    /// Result where only the second input is set.
    #[inline]
    pub fn only_second(self) -> bool {
        self.apply(false, true)
    }

    /// Whether the operator keeps the unbounded exterior empty.
    #[inline]
    pub fn is_valid_join(self) -> bool {
        !self.apply(false, false)
    }

    /// Canonical snake-case name.
    pub fn name(self) -> &'static str {
        NAMES[usize::from(self.table)]
    }
}

impl fmt::Debug for BooleanOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BooleanOp::{}", self.name().to_ascii_uppercase())
    }
}

impl fmt::Display for BooleanOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown operator name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown boolean operator `{0}`")]
pub struct ParseBooleanOpError(pub String);

impl FromStr for BooleanOp {
    type Err = ParseBooleanOpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        NAMES
            .iter()
            .position(|name| *name == normalized)
            .map(|index| Self::from_table(index as u8))
            .ok_or_else(|| ParseBooleanOpError(s.to_string()))
    }
}
