//! Operations: the closed set of effects a transaction can carry.

use isaac_types::{Address, Amount};
use serde::{Deserialize, Serialize};

use crate::errors::LedgerError;

/// One operation within a transaction's body. The set is closed: adding a
/// new kind of effect means adding a new variant here and a matching arm in
/// `isaac_blockengine`'s finish-ballot effect application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Operation {
    CreateAccount {
        target: Address,
        amount: Amount,
        linked: Option<Address>,
    },
    Payment {
        target: Address,
        amount: Amount,
    },
    CollectTxFee {
        target: Address,
        amount: Amount,
    },
    Inflation {
        target: Address,
        amount: Amount,
    },
    UnfreezeRequest {
        target: Address,
    },
    CongressVoting,
    CongressVotingResult,
}

impl Operation {
    /// A short, stable name for logging and `UnknownOperationType` messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::CreateAccount { .. } => "create-account",
            Operation::Payment { .. } => "payment",
            Operation::CollectTxFee { .. } => "collect-tx-fee",
            Operation::Inflation { .. } => "inflation",
            Operation::UnfreezeRequest { .. } => "unfreeze-request",
            Operation::CongressVoting => "congress-voting",
            Operation::CongressVotingResult => "congress-voting-result",
        }
    }

    /// This operation's view as a [`Payable`], if it carries a target and an
    /// amount.
    #[must_use]
    pub fn as_payable(&self) -> Option<PayableRef<'_>> {
        match self {
            Operation::CreateAccount { target, amount, .. }
            | Operation::Payment { target, amount }
            | Operation::CollectTxFee { target, amount }
            | Operation::Inflation { target, amount } => Some(PayableRef { target, amount }),
            Operation::UnfreezeRequest { .. }
            | Operation::CongressVoting
            | Operation::CongressVotingResult => None,
        }
    }

    /// Structural well-formedness, independent of chain state: amounts must
    /// be representable and a target address must be present where the
    /// variant requires one. State-dependent checks (does the target exist,
    /// does the source have funds) happen in `isaac_blockengine`.
    pub fn check_well_formed(&self) -> Result<(), LedgerError> {
        match self {
            Operation::CreateAccount { amount, .. }
            | Operation::Payment { amount, .. }
            | Operation::CollectTxFee { amount, .. }
            | Operation::Inflation { amount, .. } => {
                if amount.value() == 0 {
                    return Err(LedgerError::OperationAmountUnderflow);
                }
                Ok(())
            }
            Operation::UnfreezeRequest { .. }
            | Operation::CongressVoting
            | Operation::CongressVotingResult => Ok(()),
        }
    }
}

/// The capability shared by operation variants that carry `(target, amount)`.
pub trait Payable {
    fn target(&self) -> &Address;
    fn amount(&self) -> Amount;
}

/// A borrowed view implementing [`Payable`], returned by
/// [`Operation::as_payable`].
pub struct PayableRef<'a> {
    target: &'a Address,
    amount: &'a Amount,
}

impl Payable for PayableRef<'_> {
    fn target(&self) -> &Address {
        self.target
    }

    fn amount(&self) -> Amount {
        *self.amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payable_variants_expose_target_and_amount() {
        let op = Operation::Payment {
            target: "dest".to_string(),
            amount: Amount::new(10),
        };
        let payable = op.as_payable().expect("payment is payable");
        assert_eq!(payable.target(), "dest");
        assert_eq!(payable.amount(), Amount::new(10));
    }

    #[test]
    fn non_payable_variants_return_none() {
        assert!(Operation::CongressVoting.as_payable().is_none());
        assert!(Operation::UnfreezeRequest { target: "a".to_string() }
            .as_payable()
            .is_none());
    }

    #[test]
    fn zero_amount_fails_well_formedness() {
        let op = Operation::Payment {
            target: "dest".to_string(),
            amount: Amount::ZERO,
        };
        assert!(op.check_well_formed().is_err());
    }

    #[test]
    fn kind_names_are_stable() {
        assert_eq!(Operation::CongressVoting.kind(), "congress-voting");
    }
}
