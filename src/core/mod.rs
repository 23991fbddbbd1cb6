//! Ledger data model: members, expenses, settlements and the snapshot
//! that aggregates them.

pub mod activity;
pub mod expense;
pub mod member;
pub mod money;
pub mod settlement;
pub mod snapshot;

use rust_decimal::Decimal;
use thiserror::Error;

use member::MemberId;

/// Errors raised while building ledger records.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),
    #[error("member {0} cannot settle with themselves")]
    SelfSettlement(MemberId),
    #[error("cannot split an expense between zero members")]
    EmptySplit,
}
