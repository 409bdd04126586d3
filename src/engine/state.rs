use serde::Deserialize;

use crate::Amount;
use crate::model::{BalanceKind, Pin};

/// The credentials and balances of the single account served by a [`Bank`](super::Bank).
///
/// Balances are not kept non-negative here; the bank checks cover amounts
/// before it moves anything.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Account {
    pub name: String,
    pub card_id: String,
    pub pin: Pin,
    pub phone: String,
    pub cash: Amount,
    pub deposit: Amount,
    pub card: Amount,
    pub phone_balance: Amount,
}

impl Account {
    pub fn balances(&self) -> Balances {
        Balances {
            cash: self.cash,
            deposit: self.deposit,
            card: self.card,
            phone: self.phone_balance,
        }
    }
}

/// Snapshot of the four account balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Balances {
    pub cash: Amount,
    pub deposit: Amount,
    pub card: Amount,
    pub phone: Amount,
}

impl Balances {
    pub fn get(&self, kind: BalanceKind) -> Amount {
        match kind {
            BalanceKind::Cash => self.cash,
            BalanceKind::Deposit => self.deposit,
            BalanceKind::Card => self.card,
            BalanceKind::Phone => self.phone,
        }
    }

    pub fn total(&self) -> Amount {
        self.cash + self.deposit + self.card + self.phone
    }
}
