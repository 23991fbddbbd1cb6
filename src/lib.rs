//! # split-ledger
//!
//! Settlement engine for shared-expense groups.
//!
//! Given the members of a group, the expenses they shared and the
//! payments they already made to each other, this crate answers:
//!
//! - what each member is owed (or owes) overall,
//! - a short list of transfers that settles everybody,
//! - how much a specific member owes another specific member.
//!
//! ## Architecture
//!
//! - **core**: Ledger records: members, expenses, settlements, snapshot
//! - **engine**: Net balances, settlement planner, pairwise debts
//! - **simulation**: Random ledger generation for testing

pub mod core;
pub mod engine;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::activity::Activity;
    pub use crate::core::expense::Expense;
    pub use crate::core::member::{Member, MemberId};
    pub use crate::core::money::CurrencyCode;
    pub use crate::core::settlement::Settlement;
    pub use crate::core::snapshot::LedgerSnapshot;
    pub use crate::engine::balances::{BalanceSheet, NetBalance};
    pub use crate::engine::pairwise::PairwiseDebts;
    pub use crate::engine::planner::{SettlementPlan, SettlementSuggestion};
    pub use crate::engine::policy::UnknownMemberPolicy;
    pub use crate::engine::{
        compute_nets, compute_pairwise_debts, suggest_settlements, EngineConfig, EngineError,
        SettlementEngine,
    };
}
