use crate::core::member::MemberId;
use crate::core::money::round_money;
use crate::core::snapshot::LedgerSnapshot;
use crate::engine::policy::{MemberFilter, ReferenceSite, UnknownReference};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Signed balance of one member against the whole group.
///
/// Positive means the group owes the member; negative means the member
/// owes the group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetBalance {
    pub member_id: MemberId,
    pub net: Decimal,
}

/// Net balances of every member, in snapshot member order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSheet {
    precision: u32,
    balances: Vec<NetBalance>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<UnknownReference>,
}

impl BalanceSheet {
    pub(crate) fn new(
        precision: u32,
        balances: Vec<NetBalance>,
        warnings: Vec<UnknownReference>,
    ) -> Self {
        Self {
            precision,
            balances,
            warnings,
        }
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub fn balances(&self) -> &[NetBalance] {
        &self.balances
    }

    /// Unknown references skipped under the warn policy.
    pub fn warnings(&self) -> &[UnknownReference] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    pub fn net_of(&self, member: &MemberId) -> Option<Decimal> {
        self.balances
            .iter()
            .find(|b| &b.member_id == member)
            .map(|b| b.net)
    }

    /// Sum of all nets. Zero whenever every expense is balanced.
    pub fn total(&self) -> Decimal {
        self.balances.iter().map(|b| b.net).sum()
    }

    /// Whether money is conserved across the sheet.
    pub fn is_balanced(&self) -> bool {
        self.total().is_zero()
    }

    /// Whether every member is at zero.
    pub fn is_settled(&self) -> bool {
        self.balances.iter().all(|b| b.net.is_zero())
    }

    /// Members the group owes, in sheet order.
    pub fn creditors(&self) -> impl Iterator<Item = &NetBalance> {
        self.balances.iter().filter(|b| b.net > Decimal::ZERO)
    }

    /// Members who owe the group, in sheet order.
    pub fn debtors(&self) -> impl Iterator<Item = &NetBalance> {
        self.balances.iter().filter(|b| b.net < Decimal::ZERO)
    }

    /// Total owed to creditors (equal to the total owed by debtors on a
    /// balanced sheet).
    pub fn outstanding(&self) -> Decimal {
        self.creditors().map(|b| b.net).sum()
    }

    /// Balances sorted from largest creditor to largest debtor.
    pub fn ranked(&self) -> Vec<&NetBalance> {
        let mut ranked: Vec<&NetBalance> = self.balances.iter().collect();
        ranked.sort_by(|a, b| b.net.cmp(&a.net));
        ranked
    }
}

impl fmt::Display for BalanceSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Net Balances ===")?;
        for balance in self.ranked() {
            let status = if balance.net > Decimal::ZERO {
                "is owed"
            } else if balance.net < Decimal::ZERO {
                "owes"
            } else {
                "settled"
            };
            writeln!(
                f,
                "  {:<16} {:>12}  {}",
                balance.member_id.as_str(),
                balance.net.to_string(),
                status
            )?;
        }
        writeln!(f, "Outstanding:     {}", self.outstanding())?;
        writeln!(f, "Balanced:        {}", self.is_balanced())?;
        for warning in &self.warnings {
            writeln!(f, "warning: {}", warning)?;
        }
        Ok(())
    }
}

/// Fold the whole history into one balance per known member.
///
/// Values are accumulated exactly and rounded once at the end.
pub(crate) fn fold_nets(
    snapshot: &LedgerSnapshot,
    precision: u32,
    filter: &mut MemberFilter<'_>,
) -> Vec<NetBalance> {
    let mut nets = vec![Decimal::ZERO; filter.len()];

    for expense in snapshot.expenses() {
        for (member, amount) in expense.paid() {
            if let Some(slot) = filter.resolve(member, expense.id(), ReferenceSite::PaidBy) {
                nets[slot] += *amount;
            }
        }
        for (member, share) in expense.shares() {
            if let Some(slot) = filter.resolve(member, expense.id(), ReferenceSite::SplitBetween) {
                nets[slot] -= *share;
            }
        }
    }

    // Paying reduces the payer's debt; receiving reduces the receiver's credit.
    for settlement in snapshot.settlements() {
        let id = settlement.id();
        if let Some(slot) = filter.resolve(settlement.from(), id, ReferenceSite::SettlementFrom) {
            nets[slot] += settlement.amount();
        }
        if let Some(slot) = filter.resolve(settlement.to(), id, ReferenceSite::SettlementTo) {
            nets[slot] -= settlement.amount();
        }
    }

    filter
        .members()
        .iter()
        .zip(nets)
        .map(|(member_id, net)| NetBalance {
            member_id: (*member_id).clone(),
            net: round_money(net, precision),
        })
        .collect()
}
