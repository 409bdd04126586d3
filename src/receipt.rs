//! Successful results of ATM requests.

use std::fmt;

use crate::Amount;
use crate::model::BalanceKind;

/// What a successful request did to the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receipt {
    /// A balance inquiry. Nothing changed.
    Balance { of: BalanceKind, amount: Amount },
    /// `amount` moved from one balance to another; holds both new values.
    Transfer {
        amount: Amount,
        from: BalanceKind,
        to: BalanceKind,
        from_balance: Amount,
        to_balance: Amount,
    },
}

impl fmt::Display for BalanceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BalanceKind::Cash => "cash",
            BalanceKind::Deposit => "deposit",
            BalanceKind::Card => "card",
            BalanceKind::Phone => "phone",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Receipt::Balance { of, amount } => write!(f, "{of} balance is {amount}"),
            Receipt::Transfer {
                amount,
                from,
                to,
                from_balance,
                to_balance,
            } => {
                if to == BalanceKind::Cash {
                    write!(f, "withdrew {amount} from {from}")?;
                } else {
                    write!(f, "topped up {to} with {amount} from {from}")?;
                }
                write!(f, "; {from} {from_balance}, {to} {to_balance}")
            }
        }
    }
}
