//! Core domain types for the ATM engine.

use crate::Amount;

/// Card PIN code.
pub type Pin = i64;

/// An operation requested at the ATM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Show the card balance.
    RequestCardBalance,
    /// Show the bank deposit balance.
    RequestDepositBalance,
    /// Move money from the bank deposit into cash.
    WithdrawFromDeposit(Amount),
    /// Move money from the card into cash.
    WithdrawFromCard(Amount),
    /// Move cash onto the bank deposit.
    DepositToDeposit(Amount),
    /// Move cash onto the card.
    DepositToCard(Amount),
    /// Top up the phone with the given number; requires a [`PaymentMethod`].
    PayPhone(String),
}

impl Action {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Action::RequestCardBalance => "card balance",
            Action::RequestDepositBalance => "deposit balance",
            Action::WithdrawFromDeposit(_) => "withdraw from deposit",
            Action::WithdrawFromCard(_) => "withdraw from card",
            Action::DepositToDeposit(_) => "deposit to deposit",
            Action::DepositToCard(_) => "deposit to card",
            Action::PayPhone(_) => "pay phone",
        }
    }

    /// Amount carried by the action, if any.
    pub fn amount(&self) -> Option<Amount> {
        match self {
            Action::WithdrawFromDeposit(amount)
            | Action::WithdrawFromCard(amount)
            | Action::DepositToDeposit(amount)
            | Action::DepositToCard(amount) => Some(*amount),
            Action::RequestCardBalance | Action::RequestDepositBalance | Action::PayPhone(_) => {
                None
            }
        }
    }
}

/// How a phone top-up is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    Cash(Amount),
    Card(Amount),
}

impl PaymentMethod {
    pub fn amount(&self) -> Amount {
        match self {
            PaymentMethod::Cash(amount) | PaymentMethod::Card(amount) => *amount,
        }
    }
}

/// A full ATM request: credentials, action and optional payment method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub card_id: String,
    pub pin: Pin,
    pub action: Action,
    pub payment: Option<PaymentMethod>,
}

impl Request {
    pub fn new(card_id: impl Into<String>, pin: Pin, action: Action) -> Self {
        Self {
            card_id: card_id.into(),
            pin,
            action,
            payment: None,
        }
    }

    pub fn with_payment(mut self, payment: PaymentMethod) -> Self {
        self.payment = Some(payment);
        self
    }
}

/// One of the four balances held by an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BalanceKind {
    Cash,
    Deposit,
    Card,
    Phone,
}
