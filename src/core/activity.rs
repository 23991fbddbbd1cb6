use crate::core::expense::Expense;
use crate::core::settlement::Settlement;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// One entry of a group's history: either an expense or a settlement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Activity<'a> {
    Expense(&'a Expense),
    Settlement(&'a Settlement),
}

impl Activity<'_> {
    pub fn id(&self) -> Uuid {
        match self {
            Activity::Expense(e) => e.id(),
            Activity::Settlement(s) => s.id(),
        }
    }

    pub fn date(&self) -> DateTime<Utc> {
        match self {
            Activity::Expense(e) => e.date(),
            Activity::Settlement(s) => s.date(),
        }
    }

    pub fn amount(&self) -> Decimal {
        match self {
            Activity::Expense(e) => e.amount(),
            Activity::Settlement(s) => s.amount(),
        }
    }

    pub fn is_settlement(&self) -> bool {
        matches!(self, Activity::Settlement(_))
    }
}
