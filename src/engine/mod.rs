//! Authorization and rules engine.
//!
//! The [`Bank`] owns the one [`Account`] it serves. It answers credential and
//! sufficiency checks and applies balance transfers, but never decides on its
//! own whether a transfer is allowed: the caller runs the matching check first.
//! Checks never fail, they only answer `true` or `false`. A transfer only
//! fails when a balance would leave the representable range, and then
//! nothing is written.

use tracing::{debug, warn};

use crate::Amount;
use crate::model::{BalanceKind, Pin};

mod state;
pub use state::{Account, Balances};

mod error;
pub use error::{ErrorKind, Severity};

/// Capabilities a bank offers to an ATM.
///
/// Every mutation moves `amount` from one balance to another as a single
/// step and assumes its check already passed. It returns
/// [`ErrorKind::BalanceOverflow`] and leaves both balances untouched when
/// either would overflow.
pub trait BankApi {
    /// Card id and PIN both match the account.
    fn authenticate(&self, card_id: &str, pin: Pin) -> bool;

    /// Card balance is non-zero. Negative balances count as present.
    fn has_card_balance(&self) -> bool;

    /// Deposit balance is non-zero. Negative balances count as present.
    fn has_deposit_balance(&self) -> bool;

    fn can_cover_cash(&self, amount: Amount) -> bool;
    fn can_cover_card(&self, amount: Amount) -> bool;
    fn can_cover_deposit(&self, amount: Amount) -> bool;

    /// Exact match against the account phone number.
    fn matches_phone(&self, number: &str) -> bool;

    fn balances(&self) -> Balances;

    /// deposit -> cash
    fn withdraw_from_deposit(&mut self, amount: Amount) -> Result<(), ErrorKind>;
    /// card -> cash
    fn withdraw_from_card(&mut self, amount: Amount) -> Result<(), ErrorKind>;
    /// cash -> deposit
    fn deposit_to_deposit(&mut self, amount: Amount) -> Result<(), ErrorKind>;
    /// cash -> card
    fn deposit_to_card(&mut self, amount: Amount) -> Result<(), ErrorKind>;
    /// cash -> phone
    fn pay_phone_by_cash(&mut self, amount: Amount) -> Result<(), ErrorKind>;
    /// card -> phone
    fn pay_phone_by_card(&mut self, amount: Amount) -> Result<(), ErrorKind>;
}

/// The bank serving a single account.
#[derive(Debug)]
pub struct Bank {
    account: Account,
}

/// Public API
impl Bank {
    pub fn new(account: Account) -> Self {
        Self { account }
    }

    /// Read-only view of the account.
    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn into_account(self) -> Account {
        self.account
    }
}

/// Private API
impl Bank {
    fn balance_mut(&mut self, kind: BalanceKind) -> &mut Amount {
        match kind {
            BalanceKind::Cash => &mut self.account.cash,
            BalanceKind::Deposit => &mut self.account.deposit,
            BalanceKind::Card => &mut self.account.card,
            BalanceKind::Phone => &mut self.account.phone_balance,
        }
    }

    /// Move `amount` from one balance to another. Both new values are
    /// computed before either is written.
    fn transfer(
        &mut self,
        from: BalanceKind,
        to: BalanceKind,
        amount: Amount,
    ) -> Result<(), ErrorKind> {
        let balances = self.account.balances();
        let (Some(from_balance), Some(to_balance)) = (
            balances.get(from).checked_sub(amount),
            balances.get(to).checked_add(amount),
        ) else {
            warn!(?from, ?to, amount = %amount, "transfer would overflow");
            return Err(ErrorKind::BalanceOverflow);
        };

        *self.balance_mut(from) = from_balance;
        *self.balance_mut(to) = to_balance;
        debug!(?from, ?to, amount = %amount, "transfer applied");
        Ok(())
    }
}

impl BankApi for Bank {
    fn authenticate(&self, card_id: &str, pin: Pin) -> bool {
        card_id == self.account.card_id && pin == self.account.pin
    }

    fn has_card_balance(&self) -> bool {
        !self.account.card.is_zero()
    }

    fn has_deposit_balance(&self) -> bool {
        !self.account.deposit.is_zero()
    }

    fn can_cover_cash(&self, amount: Amount) -> bool {
        self.account.cash >= amount
    }

    fn can_cover_card(&self, amount: Amount) -> bool {
        self.account.card >= amount
    }

    fn can_cover_deposit(&self, amount: Amount) -> bool {
        self.account.deposit >= amount
    }

    fn matches_phone(&self, number: &str) -> bool {
        number == self.account.phone
    }

    fn balances(&self) -> Balances {
        self.account.balances()
    }

    fn withdraw_from_deposit(&mut self, amount: Amount) -> Result<(), ErrorKind> {
        self.transfer(BalanceKind::Deposit, BalanceKind::Cash, amount)
    }

    fn withdraw_from_card(&mut self, amount: Amount) -> Result<(), ErrorKind> {
        self.transfer(BalanceKind::Card, BalanceKind::Cash, amount)
    }

    fn deposit_to_deposit(&mut self, amount: Amount) -> Result<(), ErrorKind> {
        self.transfer(BalanceKind::Cash, BalanceKind::Deposit, amount)
    }

    fn deposit_to_card(&mut self, amount: Amount) -> Result<(), ErrorKind> {
        self.transfer(BalanceKind::Cash, BalanceKind::Card, amount)
    }

    fn pay_phone_by_cash(&mut self, amount: Amount) -> Result<(), ErrorKind> {
        self.transfer(BalanceKind::Cash, BalanceKind::Phone, amount)
    }

    fn pay_phone_by_card(&mut self, amount: Amount) -> Result<(), ErrorKind> {
        self.transfer(BalanceKind::Card, BalanceKind::Phone, amount)
    }
}
