use crate::core::member::MemberId;
use crate::core::money::{round_money, total, unit};
use crate::core::LedgerError;
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Allocation of an expense across members: member -> amount.
pub type Allocation = BTreeMap<MemberId, Decimal>;

/// A shared expense: who put money in (`paid_by`) and who is responsible
/// for it (`split_between`).
///
/// By convention `Σ paid_by == Σ split_between == amount`. This is not
/// enforced on construction; see [`Expense::allocation_mismatch`].
///
/// # Examples
///
/// ```
/// use split_ledger::core::expense::Expense;
/// use split_ledger::core::member::MemberId;
/// use rust_decimal_macros::dec;
///
/// let dinner = Expense::new("dinner", dec!(100))
///     .unwrap()
///     .paid_by(MemberId::new("A"), dec!(100))
///     .split(MemberId::new("A"), dec!(50))
///     .split(MemberId::new("B"), dec!(50));
///
/// assert_eq!(dinner.total_paid(), dec!(100));
/// assert!(dinner.allocation_mismatch(2).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    id: Uuid,
    #[serde(default)]
    description: String,
    amount: Decimal,
    #[serde(default)]
    paid_by: Allocation,
    #[serde(default)]
    split_between: Allocation,
    date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_by: Option<MemberId>,
}

impl Expense {
    /// Create an expense with empty allocations, dated now.
    pub fn new(description: impl Into<String>, amount: Decimal) -> Result<Self, LedgerError> {
        Self::with_id(Uuid::new_v4(), description, amount)
    }

    /// Create an expense with a fixed id (useful for tests and determinism).
    pub fn with_id(
        id: Uuid,
        description: impl Into<String>,
        amount: Decimal,
    ) -> Result<Self, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount(amount));
        }
        Ok(Self {
            id,
            description: description.into(),
            amount,
            paid_by: Allocation::new(),
            split_between: Allocation::new(),
            date: Utc::now(),
            notes: None,
            created_by: None,
        })
    }

    /// Record a contribution. Repeated calls for one member accumulate.
    pub fn paid_by(mut self, member: MemberId, amount: Decimal) -> Self {
        *self.paid_by.entry(member).or_insert(Decimal::ZERO) += amount;
        self
    }

    /// Record a share of responsibility. Repeated calls accumulate.
    pub fn split(mut self, member: MemberId, share: Decimal) -> Self {
        *self.split_between.entry(member).or_insert(Decimal::ZERO) += share;
        self
    }

    /// Replace the split with an equal one over `members`.
    pub fn split_equally(
        mut self,
        members: &[MemberId],
        precision: u32,
    ) -> Result<Self, LedgerError> {
        self.split_between = split_equally(self.amount, members, precision)?;
        Ok(self)
    }

    /// When the expense happened. Defaults to creation time.
    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }

    /// Free-form remark, never used in computations.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Member who entered the expense.
    pub fn created_by(mut self, member: MemberId) -> Self {
        self.created_by = Some(member);
        self
    }

    // --- Accessors ---

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Stated total; always positive.
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Contribution per payer (`paidBy`).
    pub fn paid(&self) -> &Allocation {
        &self.paid_by
    }

    /// Share per member (`splitBetween`).
    pub fn shares(&self) -> &Allocation {
        &self.split_between
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn creator(&self) -> Option<&MemberId> {
        self.created_by.as_ref()
    }

    /// Sum of contributions. Not guaranteed to equal [`Expense::amount`].
    pub fn total_paid(&self) -> Decimal {
        total(self.paid_by.values())
    }

    /// Sum of shares.
    pub fn total_split(&self) -> Decimal {
        total(self.split_between.values())
    }

    /// Compare both allocations against `amount`, allowing a difference of
    /// one unit at `precision`. Returns the first side that is off.
    pub fn allocation_mismatch(&self, precision: u32) -> Option<AllocationMismatch> {
        let tolerance = unit(precision);
        [
            (AllocationSide::PaidBy, self.total_paid()),
            (AllocationSide::SplitBetween, self.total_split()),
        ]
        .into_iter()
        .find(|(_, actual)| (*actual - self.amount).abs() > tolerance)
        .map(|(side, actual)| AllocationMismatch {
            side,
            expected: self.amount,
            actual,
        })
    }
}

/// Which allocation of an expense disagrees with its amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllocationSide {
    PaidBy,
    SplitBetween,
}

impl fmt::Display for AllocationSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationSide::PaidBy => write!(f, "paidBy"),
            AllocationSide::SplitBetween => write!(f, "splitBetween"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationMismatch {
    pub side: AllocationSide,
    pub expected: Decimal,
    pub actual: Decimal,
}

impl fmt::Display for AllocationMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} sums to {}, expected {}",
            self.side, self.actual, self.expected
        )
    }
}

/// Divide `amount` equally among `members` at `precision`.
///
/// Each share is rounded toward zero; the leftover units go one at a time
/// to the first members, so the shares always sum to the rounded amount.
pub fn split_equally(
    amount: Decimal,
    members: &[MemberId],
    precision: u32,
) -> Result<Allocation, LedgerError> {
    if members.is_empty() {
        return Err(LedgerError::EmptySplit);
    }
    let amount = round_money(amount, precision);
    let count = Decimal::from(members.len());
    let base = (amount / count).round_dp_with_strategy(precision, RoundingStrategy::ToZero);
    let step = unit(precision);
    let mut remainder = amount - base * count;

    let mut split = Allocation::new();
    for member in members {
        let mut share = base;
        if remainder >= step {
            share += step;
            remainder -= step;
        }
        *split.entry(member.clone()).or_insert(Decimal::ZERO) += share;
    }
    Ok(split)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ids(names: &[&str]) -> Vec<MemberId> {
        names.iter().map(|n| MemberId::new(*n)).collect()
    }

    #[test]
    fn test_expense_creation() {
        let e = Expense::new("groceries", dec!(90))
            .unwrap()
            .paid_by(MemberId::new("A"), dec!(90))
            .split(MemberId::new("A"), dec!(45))
            .split(MemberId::new("B"), dec!(45));
        assert_eq!(e.description(), "groceries");
        assert_eq!(e.amount(), dec!(90));
        assert_eq!(e.total_paid(), dec!(90));
        assert_eq!(e.total_split(), dec!(90));
    }

    #[test]
    fn test_zero_amount_rejected() {
        assert_eq!(
            Expense::new("nothing", Decimal::ZERO),
            Err(LedgerError::NonPositiveAmount(Decimal::ZERO))
        );
    }

    #[test]
    fn test_negative_amount_rejected() {
        assert!(Expense::new("refund", dec!(-5)).is_err());
    }

    #[test]
    fn test_repeated_contributions_accumulate() {
        let e = Expense::new("taxi", dec!(30))
            .unwrap()
            .paid_by(MemberId::new("A"), dec!(10))
            .paid_by(MemberId::new("A"), dec!(20));
        assert_eq!(e.paid()[&MemberId::new("A")], dec!(30));
    }

    #[test]
    fn test_split_equally_distributes_remainder() {
        let split = split_equally(dec!(100), &ids(&["A", "B", "C"]), 2).unwrap();
        assert_eq!(split[&MemberId::new("A")], dec!(33.34));
        assert_eq!(split[&MemberId::new("B")], dec!(33.33));
        assert_eq!(split[&MemberId::new("C")], dec!(33.33));
        assert_eq!(total(split.values()), dec!(100));
    }

    #[test]
    fn test_split_equally_even() {
        let split = split_equally(dec!(90), &ids(&["A", "B"]), 2).unwrap();
        assert_eq!(split[&MemberId::new("A")], dec!(45));
        assert_eq!(split[&MemberId::new("B")], dec!(45));
    }

    #[test]
    fn test_split_equally_requires_members() {
        assert_eq!(split_equally(dec!(10), &[], 2), Err(LedgerError::EmptySplit));
    }

    #[test]
    fn test_allocation_mismatch_detects_short_split() {
        let e = Expense::new("hotel", dec!(200))
            .unwrap()
            .paid_by(MemberId::new("A"), dec!(200))
            .split(MemberId::new("A"), dec!(100))
            .split(MemberId::new("B"), dec!(90));
        let mismatch = e.allocation_mismatch(2).unwrap();
        assert_eq!(mismatch.side, AllocationSide::SplitBetween);
        assert_eq!(mismatch.actual, dec!(190));
        assert_eq!(mismatch.to_string(), "splitBetween sums to 190, expected 200");
    }

    #[test]
    fn test_allocation_tolerates_one_cent() {
        let e = Expense::new("cake", dec!(10))
            .unwrap()
            .paid_by(MemberId::new("A"), dec!(10))
            .split(MemberId::new("A"), dec!(3.33))
            .split(MemberId::new("B"), dec!(3.33))
            .split(MemberId::new("C"), dec!(3.33));
        assert!(e.allocation_mismatch(2).is_none());
    }

    #[test]
    fn test_expense_json_uses_camel_case() {
        let e = Expense::new("fuel", dec!(40))
            .unwrap()
            .paid_by(MemberId::new("A"), dec!(40))
            .split(MemberId::new("B"), dec!(40));
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["paidBy"]["A"], "40");
        assert_eq!(json["splitBetween"]["B"], "40");
        assert!(json.get("notes").is_none());
    }
}
