use crate::core::member::MemberId;
use crate::core::money::round_money;
use crate::core::snapshot::LedgerSnapshot;
use crate::engine::policy::{MemberFilter, ReferenceSite, UnknownReference};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// `debtor -> creditor -> amount`.
pub type DebtTable = BTreeMap<MemberId, BTreeMap<MemberId, Decimal>>;

/// Direction of a line in a member breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebtDirection {
    /// The counterpart owes the member.
    Owes,
    /// The member owes the counterpart.
    Owed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtLine {
    pub counterpart: MemberId,
    pub amount: Decimal,
    pub direction: DebtDirection,
}

/// How much of each member's shares traces back to each other member's
/// contributions.
///
/// The table is asymmetric: `get(a, b)` is what `a` owes `b`, and a
/// settlement only ever reduces the cell in the direction it was paid.
/// Use [`PairwiseDebts::net_between`] for the netted view of a pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairwiseDebts {
    precision: u32,
    /// Snapshot member order, used when listing rows.
    members: Vec<MemberId>,
    debts: DebtTable,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<UnknownReference>,
}

impl PairwiseDebts {
    pub(crate) fn new(
        precision: u32,
        members: Vec<MemberId>,
        debts: DebtTable,
        warnings: Vec<UnknownReference>,
    ) -> Self {
        Self {
            precision,
            members,
            debts,
            warnings,
        }
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub fn table(&self) -> &DebtTable {
        &self.debts
    }

    pub fn members(&self) -> &[MemberId] {
        &self.members
    }

    pub fn warnings(&self) -> &[UnknownReference] {
        &self.warnings
    }

    /// What `debtor` owes `creditor`, if both are members and distinct.
    pub fn get(&self, debtor: &MemberId, creditor: &MemberId) -> Option<Decimal> {
        self.debts.get(debtor)?.get(creditor).copied()
    }

    /// `get(a, b) - get(b, a)`: positive when `a` owes `b` on balance.
    pub fn net_between(&self, a: &MemberId, b: &MemberId) -> Option<Decimal> {
        Some(self.get(a, b)? - self.get(b, a)?)
    }

    /// Counterparts who owe `member` and whom `member` owes, each cell
    /// strictly above `threshold`, largest first. Equal amounts keep member
    /// order.
    pub fn breakdown(&self, member: &MemberId, threshold: Decimal) -> Vec<DebtLine> {
        let mut lines = Vec::new();
        for other in &self.members {
            if other == member {
                continue;
            }
            if let Some(amount) = self.get(other, member) {
                if amount > threshold {
                    lines.push(DebtLine {
                        counterpart: other.clone(),
                        amount,
                        direction: DebtDirection::Owes,
                    });
                }
            }
            if let Some(amount) = self.get(member, other) {
                if amount > threshold {
                    lines.push(DebtLine {
                        counterpart: other.clone(),
                        amount,
                        direction: DebtDirection::Owed,
                    });
                }
            }
        }
        lines.sort_by(|a, b| b.amount.cmp(&a.amount));
        lines
    }

    /// Amount `from` can pay `to` right now: the request capped at what
    /// `from` owes. `None` if nothing is owed or the request is not positive.
    pub fn settle_amount(
        &self,
        from: &MemberId,
        to: &MemberId,
        requested: Decimal,
    ) -> Option<Decimal> {
        let owed = self.get(from, to)?;
        if requested <= Decimal::ZERO || owed <= Decimal::ZERO {
            return None;
        }
        Some(requested.min(owed))
    }
}

impl fmt::Display for PairwiseDebts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Pairwise Debts ===")?;
        for debtor in &self.members {
            for creditor in &self.members {
                match self.get(debtor, creditor) {
                    Some(amount) if !amount.is_zero() => {
                        writeln!(f, "  {} owes {}: {}", debtor, creditor, amount)?
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }
}

/// Build the debt table, returned with the distinct member ids in
/// snapshot order.
///
/// Each splitter owes each other payer `share / Σsplit × paid`. Every
/// attribution is rounded before it is added and the cell is rounded
/// again, so stored snapshots keep producing the same figures.
pub(crate) fn fold_debts(
    snapshot: &LedgerSnapshot,
    precision: u32,
    filter: &mut MemberFilter<'_>,
) -> (Vec<MemberId>, DebtTable) {
    let n = filter.len();
    let mut cells = vec![vec![Decimal::ZERO; n]; n];

    for expense in snapshot.expenses() {
        let total_paid = expense.total_paid();
        let total_split = expense.total_split();
        if total_paid.is_zero() || total_split.is_zero() {
            continue;
        }

        let mut payers = Vec::new();
        for (payer, &paid) in expense.paid() {
            if let Some(slot) = filter.resolve(payer, expense.id(), ReferenceSite::PaidBy) {
                if paid > Decimal::ZERO {
                    payers.push((slot, paid));
                }
            }
        }

        for (splitter, &share) in expense.shares() {
            let Some(s) = filter.resolve(splitter, expense.id(), ReferenceSite::SplitBetween)
            else {
                continue;
            };
            for &(p, paid) in &payers {
                if p == s {
                    continue;
                }
                let portion = round_money(share / total_split * paid, precision);
                cells[s][p] = round_money(cells[s][p] + portion, precision);
            }
        }
    }

    // Only the direction that was paid is reduced.
    for settlement in snapshot.settlements() {
        let id = settlement.id();
        let from = filter.resolve(settlement.from(), id, ReferenceSite::SettlementFrom);
        let to = filter.resolve(settlement.to(), id, ReferenceSite::SettlementTo);
        if let (Some(from), Some(to)) = (from, to) {
            if from != to {
                cells[from][to] = round_money(cells[from][to] - settlement.amount(), precision);
            }
        }
    }

    let ids: Vec<MemberId> = filter.members().iter().map(|id| (*id).clone()).collect();
    let mut table = DebtTable::new();
    for (i, debtor) in ids.iter().enumerate() {
        let row = table.entry(debtor.clone()).or_default();
        for (j, creditor) in ids.iter().enumerate() {
            if i != j {
                row.insert(creditor.clone(), cells[i][j]);
            }
        }
    }
    (ids, table)
}
