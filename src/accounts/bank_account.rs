use std::error::Error;
use std::io;

use chrono::{Local, NaiveDate, NaiveDateTime};
use csv::Writer;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::accounts::error::{AccountError, AccountResult, Operation};
use crate::accounts::sequence::AccountNumberSequence;
use crate::transactions::Transaction;

pub const INITIAL_BALANCE_NOTE: &str = "Initial balance";
pub const HISTORY_HEADER: &str = "Date\t\tAmount\tBalance\tNote";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// One line of an account history, with the balance right after the transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub balance: Decimal,
    pub note: String,
}

#[derive(Serialize)]
struct HistoryRow<'a> {
    date: String,
    amount: Decimal,
    balance: Decimal,
    note: &'a str,
}

/// A single account backed by an append-only transaction ledger.
///
/// The balance is never stored: it is the sum of the ledger every time it is read.
#[derive(Debug, Clone)]
pub struct BankAccount {
    account_number: String,
    owner: String,
    transactions: Vec<Transaction>,
}

impl BankAccount {
    /// Open an account stamped with the current local time.
    pub fn open(
        sequence: &mut AccountNumberSequence,
        owner: impl Into<String>,
        initial_balance: Decimal,
    ) -> AccountResult<Self> {
        Self::open_at(sequence, owner, initial_balance, Local::now().naive_local())
    }

    /// Open an account whose initial deposit is recorded at `when`.
    ///
    /// A rejected initial balance does not consume an account number.
    pub fn open_at(
        sequence: &mut AccountNumberSequence,
        owner: impl Into<String>,
        initial_balance: Decimal,
        when: NaiveDateTime,
    ) -> AccountResult<Self> {
        ensure_positive(initial_balance, Operation::Deposit)?;

        let mut account = Self {
            account_number: sequence.next_number(),
            owner: owner.into(),
            transactions: Vec::new(),
        };
        account.deposit(initial_balance, when, INITIAL_BALANCE_NOTE)?;
        Ok(account)
    }

    pub fn account_number(&self) -> &str {
        &self.account_number
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn set_owner(&mut self, owner: impl Into<String>) {
        self.owner = owner.into();
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn balance(&self) -> Decimal {
        self.transactions.iter().map(Transaction::amount).sum()
    }

    /// Record a deposit. Fails if the resulting balance would not fit in a `Decimal`.
    pub fn deposit(
        &mut self,
        amount: Decimal,
        when: NaiveDateTime,
        note: impl Into<String>,
    ) -> AccountResult<()> {
        ensure_positive(amount, Operation::Deposit)?;

        let balance = self.balance();
        if balance.checked_add(amount).is_none() {
            return Err(AccountError::BalanceOverflow {
                balance,
                requested: amount,
            });
        }

        self.transactions.push(Transaction::new(amount, when, note));
        Ok(())
    }

    /// Record a withdrawal. The amount is checked for positivity before funds.
    pub fn withdraw(
        &mut self,
        amount: Decimal,
        when: NaiveDateTime,
        note: impl Into<String>,
    ) -> AccountResult<()> {
        ensure_positive(amount, Operation::Withdrawal)?;

        let balance = self.balance();
        if balance - amount < Decimal::ZERO {
            return Err(AccountError::InsufficientFunds {
                balance,
                requested: amount,
            });
        }

        self.transactions.push(Transaction::new(-amount, when, note));
        Ok(())
    }

    /// Ledger rows in insertion order, each with its running balance.
    pub fn history(&self) -> Vec<HistoryEntry> {
        let mut balance = Decimal::ZERO;
        self.transactions
            .iter()
            .map(|tx| {
                balance += tx.amount();
                HistoryEntry {
                    date: tx.timestamp().date(),
                    amount: tx.amount(),
                    balance,
                    note: tx.note().to_string(),
                }
            })
            .collect()
    }

    /// Tab-separated history: a header, then one line per transaction.
    pub fn render_history(&self) -> String {
        let mut report = String::new();
        report.push_str(HISTORY_HEADER);
        report.push('\n');

        for entry in self.history() {
            report.push_str(&format!(
                "{}\t{}\t{}\t{}\n",
                entry.date.format(DATE_FORMAT),
                entry.amount,
                entry.balance,
                entry.note
            ));
        }

        report
    }

    /// Write the history as CSV with a `date,amount,balance,note` header.
    pub fn write_history_csv<W: io::Write>(&self, writer: W) -> Result<(), Box<dyn Error>> {
        let mut wtr = Writer::from_writer(writer);

        for entry in self.history() {
            wtr.serialize(HistoryRow {
                date: entry.date.format(DATE_FORMAT).to_string(),
                amount: entry.amount,
                balance: entry.balance,
                note: &entry.note,
            })?;
        }

        wtr.flush()?;
        Ok(())
    }
}

fn ensure_positive(amount: Decimal, operation: Operation) -> AccountResult<()> {
    if amount <= Decimal::ZERO {
        return Err(AccountError::InvalidAmount { operation });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn decimal(amount: &str) -> Decimal {
        amount.parse().unwrap()
    }

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap()
    }

    fn account_with(initial: &str) -> BankAccount {
        let mut seq = AccountNumberSequence::default();
        BankAccount::open_at(&mut seq, "Alice", decimal(initial), at(1)).unwrap()
    }

    #[test]
    fn test_open_records_initial_deposit() {
        let acc = account_with("500");
        assert_eq!(acc.balance(), decimal("500"));
        assert_eq!(acc.transactions().len(), 1);
        assert_eq!(acc.transactions()[0].note(), INITIAL_BALANCE_NOTE);
        assert_eq!(acc.owner(), "Alice");
        assert_eq!(acc.account_number(), "1234567890");
    }

    #[test]
    fn test_open_rejects_non_positive_initial_balance() {
        let mut seq = AccountNumberSequence::default();
        for initial in ["0", "-10"] {
            let err = BankAccount::open_at(&mut seq, "Bob", decimal(initial), at(1)).unwrap_err();
            assert_eq!(
                err,
                AccountError::InvalidAmount {
                    operation: Operation::Deposit
                }
            );
        }
        // Rejected opens leave the sequence untouched
        assert_eq!(seq.peek(), 1_234_567_890);
    }

    #[test]
    fn test_account_numbers_increase_by_one() {
        let mut seq = AccountNumberSequence::new(1000);
        let first = BankAccount::open_at(&mut seq, "A", decimal("1"), at(1)).unwrap();
        let second = BankAccount::open_at(&mut seq, "B", decimal("1"), at(1)).unwrap();
        let first: u64 = first.account_number().parse().unwrap();
        let second: u64 = second.account_number().parse().unwrap();
        assert_eq!(second, first + 1);
    }

    #[test]
    fn test_deposit_validation() {
        let mut acc = account_with("100");
        for amount in ["0", "-5"] {
            let err = acc.deposit(decimal(amount), at(2), "Deposit").unwrap_err();
            assert!(matches!(err, AccountError::InvalidAmount { operation: Operation::Deposit }));
        }
        assert_eq!(acc.transactions().len(), 1);

        acc.deposit(decimal("0.01"), at(2), "Deposit").unwrap();
        assert_eq!(acc.balance(), decimal("100.01"));
    }

    #[test]
    fn test_deposit_rejects_balance_overflow() {
        let mut seq = AccountNumberSequence::default();
        let mut acc = BankAccount::open_at(&mut seq, "Alice", Decimal::MAX, at(1)).unwrap();

        let err = acc.deposit(Decimal::ONE, at(2), "Deposit").unwrap_err();
        assert_eq!(
            err,
            AccountError::BalanceOverflow {
                balance: Decimal::MAX,
                requested: Decimal::ONE,
            }
        );
        assert_eq!(acc.transactions().len(), 1);
        assert_eq!(acc.balance(), Decimal::MAX);
        assert_eq!(acc.history().len(), 1);

        // Room frees up again after a withdrawal
        acc.withdraw(decimal("10"), at(3), "Withdraw").unwrap();
        acc.deposit(decimal("10"), at(4), "Deposit").unwrap();
        assert_eq!(acc.balance(), Decimal::MAX);
    }

    #[test]
    fn test_withdraw_insufficient_funds() {
        let mut acc = account_with("100");
        let err = acc.withdraw(decimal("100.01"), at(2), "Withdraw").unwrap_err();
        assert_eq!(
            err,
            AccountError::InsufficientFunds {
                balance: decimal("100"),
                requested: decimal("100.01"),
            }
        );
        assert_eq!(acc.balance(), decimal("100"));
        assert_eq!(acc.transactions().len(), 1);
    }

    #[test]
    fn test_withdraw_entire_balance() {
        let mut acc = account_with("100");
        acc.withdraw(decimal("100.00"), at(2), "Withdraw").unwrap();
        assert_eq!(acc.balance(), Decimal::ZERO);
        assert_eq!(acc.transactions()[1].amount(), decimal("-100.00"));
    }

    #[test]
    fn test_withdraw_checks_amount_before_funds() {
        let mut acc = account_with("100");
        let err = acc.withdraw(decimal("-1"), at(2), "Withdraw").unwrap_err();
        assert!(matches!(
            err,
            AccountError::InvalidAmount {
                operation: Operation::Withdrawal
            }
        ));

        // Still invalid-amount once the account is empty
        acc.withdraw(decimal("100"), at(2), "Withdraw").unwrap();
        let err = acc.withdraw(decimal("0"), at(3), "Withdraw").unwrap_err();
        assert!(matches!(err, AccountError::InvalidAmount { .. }));
    }

    #[test]
    fn test_render_history_running_balances() {
        let mut acc = account_with("100");
        acc.deposit(decimal("200"), at(2), "Deposit").unwrap();
        acc.withdraw(decimal("50"), at(3), "Withdraw").unwrap();

        let expected = "Date\t\tAmount\tBalance\tNote\n\
                        2024-01-01\t100\t100\tInitial balance\n\
                        2024-01-02\t200\t300\tDeposit\n\
                        2024-01-03\t-50\t250\tWithdraw\n";
        assert_eq!(acc.render_history(), expected);

        let balances: Vec<Decimal> = acc.history().iter().map(|e| e.balance).collect();
        assert_eq!(balances, vec![decimal("100"), decimal("300"), decimal("250")]);
    }

    #[test]
    fn test_render_history_is_idempotent() {
        let mut acc = account_with("42.50");
        acc.deposit(decimal("7.50"), at(4), "Deposit").unwrap();
        assert_eq!(acc.render_history(), acc.render_history());
    }

    #[test]
    fn test_set_owner_keeps_number() {
        let mut acc = account_with("10");
        let number = acc.account_number().to_string();
        acc.set_owner("Carol");
        assert_eq!(acc.owner(), "Carol");
        assert_eq!(acc.account_number(), number);
    }

    #[test]
    fn test_write_history_csv() {
        let mut acc = account_with("100");
        acc.deposit(decimal("200"), at(2), "Deposit, cash").unwrap();
        acc.withdraw(decimal("50"), at(3), "Withdraw").unwrap();

        let mut out = Vec::new();
        acc.write_history_csv(&mut out).unwrap();
        let csv = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            vec![
                "date,amount,balance,note",
                "2024-01-01,100,100,Initial balance",
                "2024-01-02,200,300,\"Deposit, cash\"",
                "2024-01-03,-50,250,Withdraw",
            ]
        );
    }

    proptest! {
        #[test]
        fn prop_balance_is_sum_of_ledger(
            initial in 1i64..1_000_000,
            ops in proptest::collection::vec((any::<bool>(), 1i64..500_000), 0..40),
        ) {
            let mut acc = account_with(&Decimal::new(initial, 2).to_string());
            for (is_deposit, cents) in ops {
                let amount = Decimal::new(cents, 2);
                if is_deposit {
                    acc.deposit(amount, at(2), "Deposit").unwrap();
                } else {
                    let _ = acc.withdraw(amount, at(2), "Withdraw");
                }
                let sum: Decimal = acc.transactions().iter().map(|t| t.amount()).sum();
                prop_assert_eq!(acc.balance(), sum);
                prop_assert!(acc.balance() >= Decimal::ZERO);
            }
        }
    }
}
