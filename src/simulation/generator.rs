//! Random ledger generation for benchmarks, property checks and the
//! `generate` command.

use crate::core::expense::{split_equally, Expense};
use crate::core::member::{Member, MemberId};
use crate::core::money::unit;
use crate::core::settlement::Settlement;
use crate::core::snapshot::LedgerSnapshot;
use crate::core::LedgerError;
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Shape of a generated ledger.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub member_count: usize,
    pub expense_count: usize,
    pub settlement_count: usize,
    /// Generated amounts fall in `[min_amount, max_amount)`.
    pub min_amount: Decimal,
    pub max_amount: Decimal,
    pub precision: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            member_count: 6,
            expense_count: 30,
            settlement_count: 5,
            min_amount: Decimal::from(1),
            max_amount: Decimal::from(500),
            precision: 2,
        }
    }
}

/// Generate a ledger in which every expense is balanced: one or two
/// payers, and an equal split over a random non-empty subset of members.
pub fn generate_random_ledger(config: &LedgerConfig) -> Result<LedgerSnapshot, LedgerError> {
    let mut rng = rand::thread_rng();
    let mut snapshot = LedgerSnapshot::new("generated");

    let members: Vec<MemberId> = (0..config.member_count.max(2))
        .map(|i| MemberId::new(format!("member-{:03}", i)))
        .collect();
    for id in &members {
        snapshot.add_member(Member::new(id.clone(), id.as_str()));
    }

    let scale = unit(config.precision);
    let min_units = to_units(config.min_amount, config.precision).max(1);
    let max_units = to_units(config.max_amount, config.precision).max(min_units + 1);

    for i in 0..config.expense_count {
        let amount = Decimal::from(rng.gen_range(min_units..max_units)) * scale;

        let payer_count = rng.gen_range(1..=2);
        let payers: Vec<&MemberId> = members.choose_multiple(&mut rng, payer_count).collect();
        let first_part = if payers.len() == 2 {
            (amount / Decimal::from(2)).round_dp(config.precision)
        } else {
            amount
        };

        let splitter_count = rng.gen_range(1..=members.len());
        let splitters: Vec<MemberId> = members
            .choose_multiple(&mut rng, splitter_count)
            .cloned()
            .collect();

        let mut expense = Expense::new(format!("expense #{}", i + 1), amount)?
            .paid_by(payers[0].clone(), first_part);
        if let Some(second) = payers.get(1) {
            expense = expense.paid_by((*second).clone(), amount - first_part);
        }
        for (member, share) in split_equally(amount, &splitters, config.precision)? {
            expense = expense.split(member, share);
        }
        snapshot.add_expense(expense);
    }

    for _ in 0..config.settlement_count {
        let pair: Vec<&MemberId> = members.choose_multiple(&mut rng, 2).collect();
        let amount = Decimal::from(rng.gen_range(min_units..max_units)) * scale;
        snapshot.add_settlement(Settlement::new(pair[0].clone(), pair[1].clone(), amount)?);
    }

    Ok(snapshot)
}

fn to_units(amount: Decimal, precision: u32) -> i64 {
    (amount / unit(precision)).trunc().to_i64().unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{compute_nets, suggest_settlements};

    #[test]
    fn test_random_ledger_shape() {
        let config = LedgerConfig {
            member_count: 4,
            expense_count: 12,
            settlement_count: 3,
            ..Default::default()
        };
        let snapshot = generate_random_ledger(&config).unwrap();
        assert_eq!(snapshot.members().len(), 4);
        assert_eq!(snapshot.expenses().len(), 12);
        assert_eq!(snapshot.settlements().len(), 3);
        assert!(snapshot
            .expenses()
            .iter()
            .all(|e| e.allocation_mismatch(2).is_none()));
    }

    #[test]
    fn test_random_ledger_settles() {
        let snapshot = generate_random_ledger(&LedgerConfig::default()).unwrap();
        let sheet = compute_nets(&snapshot, 2);
        assert!(sheet.is_balanced());
        let plan = suggest_settlements(&snapshot, 2);
        assert!(plan.apply_to(&sheet).iter().all(|b| b.net.is_zero()));
    }
}
