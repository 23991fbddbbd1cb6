use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decimal places used when the caller does not pick a precision
/// (cent-level for most currencies).
pub const DEFAULT_PRECISION: u32 = 2;

/// Largest scale a `Decimal` can carry.
pub const MAX_PRECISION: u32 = 28;

/// Display-only currency label of a group (e.g. "PHP", "EUR").
///
/// The engine never converts between currencies; a snapshot is assumed
/// to be denominated in a single one.
///
/// # Examples
///
/// ```
/// use split_ledger::core::money::CurrencyCode;
///
/// let php = CurrencyCode::new("PHP");
/// assert_eq!(php.as_str(), "PHP");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::new("PHP")
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Round `amount` to `precision` decimal places, halves away from zero.
///
/// Every rounding step in the engine goes through here so the nets, the
/// planner and the pairwise table agree on the same discipline.
///
/// ```
/// use split_ledger::core::money::round_money;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(round_money(dec!(2.345), 2), dec!(2.35));
/// assert_eq!(round_money(dec!(-2.345), 2), dec!(-2.35));
/// ```
pub fn round_money(amount: Decimal, precision: u32) -> Decimal {
    amount.round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero)
}

/// Smallest representable amount at `precision` (0.01 for 2).
pub fn unit(precision: u32) -> Decimal {
    Decimal::new(1, precision.min(MAX_PRECISION))
}

/// Sum of the values of an allocation map.
pub fn total<'a>(amounts: impl IntoIterator<Item = &'a Decimal>) -> Decimal {
    amounts.into_iter().copied().sum()
}
