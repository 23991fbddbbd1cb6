use crate::core::member::MemberId;
use crate::core::LedgerError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A real-world payment already made from one member to another,
/// outside the expense flow (e.g. cash handed over).
///
/// # Examples
///
/// ```
/// use split_ledger::core::member::MemberId;
/// use split_ledger::core::settlement::Settlement;
/// use rust_decimal_macros::dec;
///
/// let paid_back = Settlement::new(MemberId::new("B"), MemberId::new("A"), dec!(50)).unwrap();
/// assert_eq!(paid_back.amount(), dec!(50));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    id: Uuid,
    from: MemberId,
    to: MemberId,
    amount: Decimal,
    date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_by: Option<MemberId>,
}

impl Settlement {
    /// Record that `from` paid `to` the given amount, dated now.
    pub fn new(from: MemberId, to: MemberId, amount: Decimal) -> Result<Self, LedgerError> {
        Self::with_id(Uuid::new_v4(), from, to, amount)
    }

    /// Like [`Settlement::new`] with a fixed id.
    pub fn with_id(
        id: Uuid,
        from: MemberId,
        to: MemberId,
        amount: Decimal,
    ) -> Result<Self, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount(amount));
        }
        if from == to {
            return Err(LedgerError::SelfSettlement(from));
        }
        Ok(Self {
            id,
            from,
            to,
            amount,
            date: Utc::now(),
            notes: None,
            created_by: None,
        })
    }

    /// When the money changed hands.
    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Member who recorded the payment.
    pub fn created_by(mut self, member: MemberId) -> Self {
        self.created_by = Some(member);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The payer.
    pub fn from(&self) -> &MemberId {
        &self.from
    }

    /// The receiver.
    pub fn to(&self) -> &MemberId {
        &self.to
    }

    pub fn amount(&self) -> Decimal {
        self.amount
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
}
