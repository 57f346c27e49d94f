//! Accounts.

use isaac_types::{Address, Amount, Timestamp};
use serde::{Deserialize, Serialize};

use crate::errors::LedgerError;

/// A ledger account, keyed by address. Accounts are never deleted once
/// saved; `sequence_id` increases by one for every transaction whose source
/// is this account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub address: Address,
    pub balance: Amount,
    pub sequence_id: u64,
    /// The parent address this account was frozen from, if any. A frozen
    /// account is exempt from the base reserve requirement on withdrawal.
    pub linked: Option<Address>,
    pub created: Timestamp,
}

impl Account {
    #[must_use]
    pub fn new(address: Address, balance: Amount, linked: Option<Address>, created: Timestamp) -> Self {
        Account {
            address,
            balance,
            sequence_id: 0,
            linked,
            created,
        }
    }

    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.linked.is_some()
    }

    /// Credits `amount` to the balance.
    pub fn deposit(&mut self, amount: Amount) -> Result<(), LedgerError> {
        self.balance = self.balance.add(amount)?;
        Ok(())
    }

    /// Debits `amount`, requiring `balance >= amount + reserve` unless the
    /// account is frozen (frozen accounts are exempt from the reserve).
    pub fn withdraw(&mut self, amount: Amount, reserve: Amount) -> Result<(), LedgerError> {
        let required = if self.is_frozen() {
            amount
        } else {
            amount.add(reserve)?
        };
        if self.balance < required {
            return Err(LedgerError::InsufficientBalance {
                have: self.balance.value(),
                need: required.value(),
            });
        }
        self.balance = self.balance.sub(amount)?;
        Ok(())
    }

    /// Records that one more transaction from this account was confirmed.
    pub fn bump_sequence(&mut self) {
        self.sequence_id += 1;
    }

    /// True if `sequence_id` is the next value this account expects.
    #[must_use]
    pub fn accepts_sequence(&self, sequence_id: u64) -> bool {
        sequence_id == self.sequence_id
    }
}
