use std::fmt;

use rust_decimal::Decimal;
use thiserror::Error;

/// The ledger operation an amount was supplied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Deposit,
    Withdrawal,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Deposit => f.write_str("deposit"),
            Operation::Withdrawal => f.write_str("withdrawal"),
        }
    }
}

/// Failures returned by [`BankAccount`](crate::BankAccount) mutations.
///
/// A failed call never changes the ledger.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccountError {
    /// The amount was zero or negative.
    #[error("amount: the {operation} amount must be positive")]
    InvalidAmount { operation: Operation },

    /// The withdrawal would take the balance below zero.
    #[error("insufficient funds for this withdrawal (balance {balance}, requested {requested})")]
    InsufficientFunds { balance: Decimal, requested: Decimal },

    /// The deposit would push the balance past the largest representable amount.
    #[error("deposit too large: balance {balance} cannot grow by {requested}")]
    BalanceOverflow { balance: Decimal, requested: Decimal },
}

pub type AccountResult<T> = Result<T, AccountError>;
