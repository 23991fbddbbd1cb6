use crate::core::activity::Activity;
use crate::core::expense::Expense;
use crate::core::member::{Member, MemberId};
use crate::core::money::CurrencyCode;
use crate::core::settlement::Settlement;
use serde::{Deserialize, Serialize};

/// The full history of a group handed to the engine for one computation.
///
/// The engine only ever borrows a snapshot. Writers either mutate their
/// own copy through the `add_*` methods or build a new value with the
/// `with_*` methods; a snapshot being read is never changed underneath.
///
/// # Examples
///
/// ```
/// use split_ledger::prelude::*;
/// use rust_decimal_macros::dec;
///
/// let a = MemberId::new("A");
/// let b = MemberId::new("B");
/// let snapshot = LedgerSnapshot::new("flatmates")
///     .with_member(Member::named("A"))
///     .with_member(Member::named("B"))
///     .with_expense(
///         Expense::new("rent", dec!(100)).unwrap()
///             .paid_by(a.clone(), dec!(100))
///             .split(a, dec!(50))
///             .split(b, dec!(50)),
///     );
///
/// assert_eq!(snapshot.members().len(), 2);
/// assert_eq!(snapshot.expenses().len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSnapshot {
    #[serde(default)]
    name: String,
    #[serde(default)]
    currency: CurrencyCode,
    #[serde(default)]
    members: Vec<Member>,
    #[serde(default)]
    expenses: Vec<Expense>,
    #[serde(default)]
    settlements: Vec<Settlement>,
}

impl LedgerSnapshot {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_currency(mut self, currency: CurrencyCode) -> Self {
        self.currency = currency;
        self
    }

    pub fn with_member(mut self, member: Member) -> Self {
        self.add_member(member);
        self
    }

    pub fn with_expense(mut self, expense: Expense) -> Self {
        self.add_expense(expense);
        self
    }

    pub fn with_settlement(mut self, settlement: Settlement) -> Self {
        self.add_settlement(settlement);
        self
    }

    pub fn with_settlements(mut self, settlements: impl IntoIterator<Item = Settlement>) -> Self {
        self.settlements.extend(settlements);
        self
    }

    /// Add a member. A second member with an existing id is ignored.
    pub fn add_member(&mut self, member: Member) {
        if !self.contains_member(&member.id) {
            self.members.push(member);
        }
    }

    /// Remove a member. Their past expenses and settlements stay in the
    /// history and become references to an unknown member.
    pub fn remove_member(&mut self, id: &MemberId) -> Option<Member> {
        let idx = self.members.iter().position(|m| &m.id == id)?;
        Some(self.members.remove(idx))
    }

    pub fn add_expense(&mut self, expense: Expense) {
        self.expenses.push(expense);
    }

    pub fn add_settlement(&mut self, settlement: Settlement) {
        self.settlements.push(settlement);
    }

    // --- Accessors ---

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn settlements(&self) -> &[Settlement] {
        &self.settlements
    }

    pub fn member(&self, id: &MemberId) -> Option<&Member> {
        self.members.iter().find(|m| &m.id == id)
    }

    pub fn contains_member(&self, id: &MemberId) -> bool {
        self.member(id).is_some()
    }

    pub fn member_ids(&self) -> impl Iterator<Item = &MemberId> {
        self.members.iter().map(|m| &m.id)
    }

    /// Expenses and settlements merged into one history, newest first.
    /// Entries with the same date keep expenses before settlements.
    pub fn timeline(&self) -> Vec<Activity<'_>> {
        let mut activities: Vec<Activity<'_>> = self
            .expenses
            .iter()
            .map(Activity::Expense)
            .chain(self.settlements.iter().map(Activity::Settlement))
            .collect();
        activities.sort_by(|a, b| b.date().cmp(&a.date()));
        activities
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn base() -> LedgerSnapshot {
        LedgerSnapshot::new("trip")
            .with_member(Member::named("A"))
            .with_member(Member::named("B"))
    }

    #[test]
    fn test_duplicate_member_ignored() {
        let snapshot = base().with_member(Member::new("A", "Another A"));
        assert_eq!(snapshot.members().len(), 2);
        assert_eq!(snapshot.member(&MemberId::new("A")).unwrap().name, "A");
    }

    #[test]
    fn test_remove_member() {
        let mut snapshot = base();
        let removed = snapshot.remove_member(&MemberId::new("B")).unwrap();
        assert_eq!(removed.id, MemberId::new("B"));
        assert!(!snapshot.contains_member(&MemberId::new("B")));
        assert!(snapshot.remove_member(&MemberId::new("Z")).is_none());
    }

    #[test]
    fn test_with_methods_leave_original_untouched() {
        let original = base();
        let extended = original.clone().with_settlement(
            Settlement::new(MemberId::new("B"), MemberId::new("A"), dec!(5)).unwrap(),
        );
        assert!(original.settlements().is_empty());
        assert_eq!(extended.settlements().len(), 1);
    }

    #[test]
    fn test_timeline_newest_first() {
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let expense = Expense::new("lunch", dec!(20))
            .unwrap()
            .with_date(t0);
        let settlement = Settlement::new(MemberId::new("B"), MemberId::new("A"), dec!(10))
            .unwrap()
            .with_date(t0 + Duration::days(1));
        let older = Expense::new("breakfast", dec!(8))
            .unwrap()
            .with_date(t0 - Duration::days(1));

        let snapshot = base()
            .with_expense(expense.clone())
            .with_expense(older.clone())
            .with_settlement(settlement.clone());

        let timeline = snapshot.timeline();
        assert_eq!(timeline.len(), 3);
        assert_eq!(timeline[0].id(), settlement.id());
        assert!(timeline[0].is_settlement());
        assert_eq!(timeline[1].id(), expense.id());
        assert_eq!(timeline[2].id(), older.id());
    }

    #[test]
    fn test_snapshot_deserializes_with_defaults() {
        let json = r#"{
            "name": "flat",
            "members": [{ "id": "A", "name": "Ann" }]
        }"#;
        let snapshot: LedgerSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.members().len(), 1);
        assert!(snapshot.expenses().is_empty());
        assert_eq!(snapshot.currency().as_str(), "PHP");
    }
}
