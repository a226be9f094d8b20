/// First account number handed out by a default sequence.
pub const DEFAULT_ACCOUNT_SEED: u64 = 1_234_567_890;

/// Hands out account numbers, one per opened account, strictly increasing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountNumberSequence {
    next: u64,
}

impl AccountNumberSequence {
    pub fn new(seed: u64) -> Self {
        Self { next: seed }
    }

    /// Number the next opened account will receive.
    pub fn peek(&self) -> u64 {
        self.next
    }

    pub fn next_number(&mut self) -> String {
        let number = self.next;
        self.next += 1;
        number.to_string()
    }
}

impl Default for AccountNumberSequence {
    fn default() -> Self {
        Self::new(DEFAULT_ACCOUNT_SEED)
    }
}
