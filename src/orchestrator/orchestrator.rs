use std::error::Error;
use std::io::{BufRead, Write};
use std::str::FromStr;

use chrono::{Local, NaiveDateTime};
use log::{debug, info, warn};
use rust_decimal::Decimal;

use crate::accounts::{AccountError, AccountNumberSequence, BankAccount};

pub const DEPOSIT_NOTE: &str = "Deposit";
pub const WITHDRAW_NOTE: &str = "Withdraw";

const MENU: &str = "\nChoose an action:\n\
                    1. Make a deposit\n\
                    2. Make a withdrawal\n\
                    3. Show account history\n\
                    4. Quit\n\
                    5. Export account history as CSV";

/// Run one interactive session with a fresh default account number sequence.
pub fn run<R: BufRead, W: Write>(input: R, output: W) -> Result<(), Box<dyn Error>> {
    run_with_sequence(input, output, &mut AccountNumberSequence::default())
}

/// Run one interactive session, opening its account from `sequence`.
///
/// The session ends on menu choice 4 or when `input` reaches end of file.
pub fn run_with_sequence<R: BufRead, W: Write>(
    input: R,
    output: W,
    sequence: &mut AccountNumberSequence,
) -> Result<(), Box<dyn Error>> {
    let mut console = Console { input, output };
    console.session(sequence)
}

struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    fn session(&mut self, sequence: &mut AccountNumberSequence) -> Result<(), Box<dyn Error>> {
        writeln!(self.output, "Welcome to the central banking system!")?;

        let Some(owner) = self.prompt_owner()? else {
            return self.farewell();
        };
        let Some(initial_balance) = self.prompt_amount(
            "Enter the initial balance: ",
            "Please enter a valid positive number for the initial balance.",
        )?
        else {
            return self.farewell();
        };

        let mut account = BankAccount::open(sequence, owner, initial_balance)?;
        info!(
            "opened account {} for {} with {}",
            account.account_number(),
            account.owner(),
            initial_balance
        );
        writeln!(
            self.output,
            "Account {} created for {} with an initial balance of {}.",
            account.account_number(),
            account.owner(),
            account.balance()
        )?;

        loop {
            writeln!(self.output, "{}", MENU)?;
            let Some(choice) = self.prompt("Enter your choice: ")? else {
                return self.farewell();
            };

            match choice.trim() {
                "1" => {
                    let Some(amount) = self.prompt_amount(
                        "Enter the deposit amount: ",
                        "Please enter a valid positive amount for the deposit.",
                    )?
                    else {
                        return self.farewell();
                    };
                    let result = account.deposit(amount, now(), DEPOSIT_NOTE);
                    self.report(&account, result, "Deposit", amount)?;
                }
                "2" => {
                    let Some(amount) = self.prompt_amount(
                        "Enter the withdrawal amount: ",
                        "Please enter a valid positive amount for the withdrawal.",
                    )?
                    else {
                        return self.farewell();
                    };
                    let result = account.withdraw(amount, now(), WITHDRAW_NOTE);
                    self.report(&account, result, "Withdrawal", amount)?;
                }
                "3" => {
                    writeln!(self.output, "{}", account.render_history())?;
                }
                "4" => {
                    return self.farewell();
                }
                "5" => {
                    account.write_history_csv(&mut self.output)?;
                }
                other => {
                    debug!("invalid menu choice {:?}", other);
                    writeln!(
                        self.output,
                        "Invalid choice. Please enter a number from 1 to 5."
                    )?;
                }
            }
        }
    }

    fn report(
        &mut self,
        account: &BankAccount,
        result: Result<(), AccountError>,
        label: &str,
        amount: Decimal,
    ) -> Result<(), Box<dyn Error>> {
        match result {
            Ok(()) => {
                debug!(
                    "{} of {} on account {}",
                    label,
                    amount,
                    account.account_number()
                );
                writeln!(
                    self.output,
                    "{} of {} completed. Current balance is {}",
                    label,
                    amount,
                    account.balance()
                )?;
            }
            Err(e) => {
                warn!(
                    "{} of {} rejected on account {}: {}",
                    label,
                    amount,
                    account.account_number(),
                    e
                );
                writeln!(self.output, "{}", e)?;
            }
        }
        Ok(())
    }

    fn farewell(&mut self) -> Result<(), Box<dyn Error>> {
        writeln!(self.output, "Closing the program. Thank you!")?;
        self.output.flush()?;
        Ok(())
    }

    /// Print `message` and read one line. `None` once input is exhausted.
    fn prompt(&mut self, message: &str) -> Result<Option<String>, Box<dyn Error>> {
        write!(self.output, "{}", message)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn prompt_owner(&mut self) -> Result<Option<String>, Box<dyn Error>> {
        loop {
            match self.prompt("Enter your name: ")? {
                None => return Ok(None),
                Some(name) if name.trim().is_empty() => continue,
                Some(name) => return Ok(Some(name.trim().to_string())),
            }
        }
    }

    /// Re-prompt until the line parses as a strictly positive decimal.
    fn prompt_amount(
        &mut self,
        message: &str,
        retry: &str,
    ) -> Result<Option<Decimal>, Box<dyn Error>> {
        loop {
            let Some(line) = self.prompt(message)? else {
                return Ok(None);
            };
            match parse_amount(&line) {
                Some(amount) => return Ok(Some(amount)),
                None => writeln!(self.output, "{}", retry)?,
            }
        }
    }
}

fn parse_amount(line: &str) -> Option<Decimal> {
    Decimal::from_str(line.trim())
        .ok()
        .filter(|amount| *amount > Decimal::ZERO)
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}
