pub mod bank_account;
pub mod error;
pub mod sequence;

pub use bank_account::{BankAccount, HistoryEntry};
pub use error::{AccountError, AccountResult, Operation};
pub use sequence::{AccountNumberSequence, DEFAULT_ACCOUNT_SEED};
