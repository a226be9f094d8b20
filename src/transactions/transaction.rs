use chrono::NaiveDateTime;
use rust_decimal::Decimal;

/// A single signed movement on an account ledger.
///
/// Positive amounts are deposits, negative amounts are withdrawals.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    amount: Decimal,
    timestamp: NaiveDateTime,
    note: String,
}

impl Transaction {
    pub fn new(amount: Decimal, timestamp: NaiveDateTime, note: impl Into<String>) -> Self {
        Self {
            amount,
            timestamp,
            note: note.into(),
        }
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub fn note(&self) -> &str {
        &self.note
    }
}
