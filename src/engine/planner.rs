use crate::core::member::MemberId;
use crate::core::money::round_money;
use crate::core::settlement::Settlement;
use crate::core::LedgerError;
use crate::engine::balances::{BalanceSheet, NetBalance};
use crate::engine::policy::UnknownReference;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Note attached to settlements created from a plan.
pub const APPLIED_NOTE: &str = "applied from settlement suggestions";

/// A recommended, not yet executed, payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementSuggestion {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Decimal,
}

impl fmt::Display for SettlementSuggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} pays {} {}", self.from, self.to, self.amount)
    }
}

/// Ordered list of transfers that zeroes a balance sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementPlan {
    precision: u32,
    transfers: Vec<SettlementSuggestion>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<UnknownReference>,
}

impl SettlementPlan {
    pub fn transfers(&self) -> &[SettlementSuggestion] {
        &self.transfers
    }

    pub fn warnings(&self) -> &[UnknownReference] {
        &self.warnings
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub fn len(&self) -> usize {
        self.transfers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }

    /// Total amount moved by the plan.
    pub fn total(&self) -> Decimal {
        self.transfers.iter().map(|t| t.amount).sum()
    }

    /// Balances left over after executing every transfer against `sheet`.
    pub fn apply_to(&self, sheet: &BalanceSheet) -> Vec<NetBalance> {
        let mut residual = sheet.balances().to_vec();
        for transfer in &self.transfers {
            for balance in residual.iter_mut() {
                if balance.member_id == transfer.from {
                    balance.net += transfer.amount;
                } else if balance.member_id == transfer.to {
                    balance.net -= transfer.amount;
                }
            }
        }
        residual
    }

    /// Turn the plan into settlement records dated `date`, ready to be
    /// appended to the snapshot.
    pub fn into_settlements(
        self,
        date: DateTime<Utc>,
        created_by: Option<MemberId>,
    ) -> Result<Vec<Settlement>, LedgerError> {
        self.transfers
            .into_iter()
            .map(|t| -> Result<Settlement, LedgerError> {
                let settlement = Settlement::new(t.from, t.to, t.amount)?
                    .with_date(date)
                    .with_notes(APPLIED_NOTE);
                Ok(match &created_by {
                    Some(member) => settlement.created_by(member.clone()),
                    None => settlement,
                })
            })
            .collect()
    }
}

impl fmt::Display for SettlementPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Suggested Settlements ===")?;
        if self.transfers.is_empty() {
            writeln!(f, "  All settled.")?;
        }
        for (i, transfer) in self.transfers.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, transfer)?;
        }
        writeln!(f, "Transfers:       {}", self.len())?;
        writeln!(f, "Total moved:     {}", self.total())?;
        Ok(())
    }
}

/// Greedy two-pointer matching of creditors against debtors.
///
/// Largest creditors and largest debtors are matched first, which keeps
/// the transfer count low in practice but is not guaranteed minimal.
/// Produces at most `creditors + debtors - 1` transfers.
pub(crate) fn plan(sheet: &BalanceSheet) -> SettlementPlan {
    let precision = sheet.precision();

    // Stable sorts: equal balances keep snapshot member order.
    let mut creditors: Vec<(MemberId, Decimal)> = sheet
        .creditors()
        .map(|b| (b.member_id.clone(), b.net))
        .collect();
    creditors.sort_by(|a, b| b.1.cmp(&a.1));

    let mut debtors: Vec<(MemberId, Decimal)> = sheet
        .debtors()
        .map(|b| (b.member_id.clone(), b.net))
        .collect();
    debtors.sort_by(|a, b| a.1.cmp(&b.1));

    let mut transfers = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < creditors.len() && j < debtors.len() {
        let amount = round_money(creditors[i].1.min(-debtors[j].1), precision);

        if amount <= Decimal::ZERO {
            // Only sub-unit residue left on this pair.
            i += 1;
            j += 1;
            continue;
        }

        transfers.push(SettlementSuggestion {
            from: debtors[j].0.clone(),
            to: creditors[i].0.clone(),
            amount,
        });
        creditors[i].1 = round_money(creditors[i].1 - amount, precision);
        debtors[j].1 = round_money(debtors[j].1 + amount, precision);

        if creditors[i].1 <= Decimal::ZERO {
            i += 1;
        }
        if debtors[j].1 >= Decimal::ZERO {
            j += 1;
        }
    }

    SettlementPlan {
        precision,
        transfers,
        warnings: sheet.warnings().to_vec(),
    }
}
