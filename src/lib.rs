pub mod orchestrator;
pub mod accounts;
pub mod transactions;

pub use orchestrator::run;
pub use accounts::{AccountError, AccountNumberSequence, BankAccount};
pub use transactions::Transaction;
