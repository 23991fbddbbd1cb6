//! The settlement engine: net balances, settlement suggestions and
//! pairwise debts, all computed from scratch over a borrowed snapshot.
//!
//! Each computation is a pure function of the snapshot and the
//! [`EngineConfig`]. Nothing is cached between calls.

pub mod balances;
pub mod pairwise;
pub mod planner;
pub mod policy;

use crate::core::expense::{AllocationMismatch, Expense};
use crate::core::money::{DEFAULT_PRECISION, MAX_PRECISION};
use crate::core::snapshot::LedgerSnapshot;
use balances::BalanceSheet;
use log::debug;
use pairwise::PairwiseDebts;
use planner::SettlementPlan;
use policy::{MemberFilter, UnknownMemberPolicy, UnknownReference};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors returned by the engine. None of them occur under the default
/// configuration.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{0}")]
    UnknownMember(UnknownReference),
    #[error("expense {expense} is unbalanced: {mismatch}")]
    UnbalancedExpense {
        expense: Uuid,
        mismatch: AllocationMismatch,
    },
    #[error("precision must be at most {max} decimal places, got {got}")]
    PrecisionOutOfRange { got: u32, max: u32 },
}

/// Engine settings.
///
/// Deserializable so a front end can load it from a JSON file; every
/// field is optional there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Decimal places results are rounded to.
    pub precision: u32,
    pub unknown_members: UnknownMemberPolicy,
    /// Reject expenses whose `paidBy` or `splitBetween` does not add up to
    /// the amount (within one unit at `precision`).
    pub validate_allocations: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            unknown_members: UnknownMemberPolicy::Ignore,
            validate_allocations: false,
        }
    }
}

impl EngineConfig {
    pub fn with_precision(precision: u32) -> Self {
        Self {
            precision,
            ..Default::default()
        }
    }

    /// Reject unknown members and unbalanced expenses.
    pub fn strict(self) -> Self {
        Self {
            unknown_members: UnknownMemberPolicy::Reject,
            validate_allocations: true,
            ..self
        }
    }
}

/// Entry point for all three computations.
///
/// # Examples
///
/// ```
/// use split_ledger::prelude::*;
/// use rust_decimal_macros::dec;
///
/// let (a, b) = (MemberId::new("A"), MemberId::new("B"));
/// let snapshot = LedgerSnapshot::new("pair")
///     .with_member(Member::named("A"))
///     .with_member(Member::named("B"))
///     .with_expense(
///         Expense::new("dinner", dec!(100)).unwrap()
///             .paid_by(a.clone(), dec!(100))
///             .split(a.clone(), dec!(50))
///             .split(b.clone(), dec!(50)),
///     );
///
/// let engine = SettlementEngine::default();
/// let plan = engine.suggest_settlements(&snapshot).unwrap();
/// assert_eq!(plan.transfers().len(), 1);
/// assert_eq!(plan.transfers()[0].from, b);
/// assert_eq!(plan.transfers()[0].amount, dec!(50));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SettlementEngine {
    config: EngineConfig,
}

impl SettlementEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Net balance of every member.
    pub fn compute_nets(&self, snapshot: &LedgerSnapshot) -> Result<BalanceSheet, EngineError> {
        self.check(snapshot)?;
        let mut filter = MemberFilter::new(snapshot, self.config.unknown_members);
        let balances = balances::fold_nets(snapshot, self.config.precision, &mut filter);
        let warnings = filter.finish()?;
        let sheet = BalanceSheet::new(self.config.precision, balances, warnings);
        debug!(
            "computed nets for {} members ({} expenses, {} settlements)",
            sheet.len(),
            snapshot.expenses().len(),
            snapshot.settlements().len()
        );
        Ok(sheet)
    }

    /// Transfers that bring every balance to zero.
    pub fn suggest_settlements(
        &self,
        snapshot: &LedgerSnapshot,
    ) -> Result<SettlementPlan, EngineError> {
        let sheet = self.compute_nets(snapshot)?;
        let plan = planner::plan(&sheet);
        debug!("suggested {} transfers", plan.len());
        Ok(plan)
    }

    /// Directional debt table between every ordered pair of members.
    pub fn compute_pairwise_debts(
        &self,
        snapshot: &LedgerSnapshot,
    ) -> Result<PairwiseDebts, EngineError> {
        self.check(snapshot)?;
        let mut filter = MemberFilter::new(snapshot, self.config.unknown_members);
        let (members, table) = pairwise::fold_debts(snapshot, self.config.precision, &mut filter);
        let warnings = filter.finish()?;
        debug!("computed pairwise debts for {} members", members.len());
        Ok(PairwiseDebts::new(self.config.precision, members, table, warnings))
    }

    /// Nets as they would be with `expense` added, leaving `snapshot` as is.
    pub fn preview_expense(
        &self,
        snapshot: &LedgerSnapshot,
        expense: Expense,
    ) -> Result<BalanceSheet, EngineError> {
        let preview = snapshot.clone().with_expense(expense);
        self.compute_nets(&preview)
    }

    fn check(&self, snapshot: &LedgerSnapshot) -> Result<(), EngineError> {
        if self.config.precision > MAX_PRECISION {
            return Err(EngineError::PrecisionOutOfRange {
                got: self.config.precision,
                max: MAX_PRECISION,
            });
        }
        if self.config.validate_allocations {
            for expense in snapshot.expenses() {
                if let Some(mismatch) = expense.allocation_mismatch(self.config.precision) {
                    return Err(EngineError::UnbalancedExpense {
                        expense: expense.id(),
                        mismatch,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Net balance of every member, skipping unknown ids.
pub fn compute_nets(snapshot: &LedgerSnapshot, precision: u32) -> BalanceSheet {
    let precision = precision.min(MAX_PRECISION);
    let mut filter = MemberFilter::new(snapshot, UnknownMemberPolicy::Ignore);
    let balances = balances::fold_nets(snapshot, precision, &mut filter);
    BalanceSheet::new(precision, balances, Vec::new())
}

/// Settlement suggestions, skipping unknown ids.
pub fn suggest_settlements(snapshot: &LedgerSnapshot, precision: u32) -> SettlementPlan {
    planner::plan(&compute_nets(snapshot, precision))
}

/// Pairwise debt table, skipping unknown ids.
pub fn compute_pairwise_debts(snapshot: &LedgerSnapshot, precision: u32) -> PairwiseDebts {
    let precision = precision.min(MAX_PRECISION);
    let mut filter = MemberFilter::new(snapshot, UnknownMemberPolicy::Ignore);
    let (members, table) = pairwise::fold_debts(snapshot, precision, &mut filter);
    PairwiseDebts::new(precision, members, table, Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::member::{Member, MemberId};
    use crate::core::settlement::Settlement;
    use rust_decimal_macros::dec;

    fn pair() -> LedgerSnapshot {
        let (a, b) = (MemberId::new("A"), MemberId::new("B"));
        LedgerSnapshot::new("pair")
            .with_member(Member::named("A"))
            .with_member(Member::named("B"))
            .with_expense(
                Expense::new("dinner", dec!(100))
                    .unwrap()
                    .paid_by(a.clone(), dec!(100))
                    .split(a, dec!(50))
                    .split(b, dec!(50)),
            )
    }

    #[test]
    fn test_engine_matches_free_functions() {
        let snapshot = pair();
        let engine = SettlementEngine::default();
        assert_eq!(
            engine.compute_nets(&snapshot).unwrap(),
            compute_nets(&snapshot, 2)
        );
        assert_eq!(
            engine.suggest_settlements(&snapshot).unwrap(),
            suggest_settlements(&snapshot, 2)
        );
        assert_eq!(
            engine.compute_pairwise_debts(&snapshot).unwrap(),
            compute_pairwise_debts(&snapshot, 2)
        );
    }

    #[test]
    fn test_precision_out_of_range() {
        let engine = SettlementEngine::new(EngineConfig::with_precision(40));
        let err = engine.compute_nets(&pair()).unwrap_err();
        assert!(matches!(err, EngineError::PrecisionOutOfRange { got: 40, .. }));
    }

    #[test]
    fn test_validation_off_by_default() {
        let snapshot = pair().with_expense(
            Expense::new("broken", dec!(10))
                .unwrap()
                .paid_by(MemberId::new("A"), dec!(10)),
        );
        assert!(SettlementEngine::default().compute_nets(&snapshot).is_ok());
    }

    #[test]
    fn test_strict_rejects_unbalanced_expense() {
        let broken = Expense::new("broken", dec!(10))
            .unwrap()
            .paid_by(MemberId::new("A"), dec!(10));
        let broken_id = broken.id();
        let snapshot = pair().with_expense(broken);
        let engine = SettlementEngine::new(EngineConfig::default().strict());
        match engine.suggest_settlements(&snapshot) {
            Err(EngineError::UnbalancedExpense { expense, mismatch }) => {
                assert_eq!(expense, broken_id);
                assert_eq!(mismatch.actual, dec!(0));
            }
            other => panic!("expected unbalanced expense, got {:?}", other),
        }
    }

    #[test]
    fn test_strict_rejects_unknown_member() {
        let snapshot = pair().with_settlement(
            Settlement::new(MemberId::new("B"), MemberId::new("ghost"), dec!(5)).unwrap(),
        );
        let engine = SettlementEngine::new(EngineConfig::default().strict());
        let err = engine.compute_pairwise_debts(&snapshot).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!(
                "unknown member ghost in settlement to of record {}",
                snapshot.settlements()[0].id()
            )
        );
    }

    #[test]
    fn test_preview_leaves_snapshot_untouched() {
        let snapshot = pair();
        let extra = Expense::new("coffee", dec!(10))
            .unwrap()
            .paid_by(MemberId::new("B"), dec!(10))
            .split(MemberId::new("A"), dec!(10));
        let preview = SettlementEngine::default()
            .preview_expense(&snapshot, extra)
            .unwrap();
        assert_eq!(preview.net_of(&MemberId::new("A")), Some(dec!(40)));
        assert_eq!(snapshot.expenses().len(), 1);
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "unknownMembers": "warn" }"#).unwrap();
        assert_eq!(config.precision, 2);
        assert_eq!(config.unknown_members, UnknownMemberPolicy::Warn);
        assert!(!config.validate_allocations);
    }
}
