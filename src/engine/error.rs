//! Reasons a request can be refused.

use thiserror::Error;

/// How urgently a refusal should be shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Critical,
    Informational,
}

/// Failure of a single ATM request. Every failure leaves the account untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("the entered PIN/card number is incorrect")]
    IncorrectCredentials,
    #[error("balance of the card is empty")]
    EmptyCardBalance,
    #[error("balance of the bank deposit is empty")]
    EmptyDepositBalance,
    #[error("not enough cash")]
    InsufficientCash,
    #[error("not enough money on the card")]
    InsufficientCard,
    #[error("not enough money on the bank deposit")]
    InsufficientDeposit,
    #[error("the entered phone number is incorrect")]
    IncorrectPhone,
    #[error("no payment method for the phone top-up")]
    IncorrectPayment,
    #[error("the transfer would overflow a balance")]
    BalanceOverflow,
}

impl ErrorKind {
    pub fn severity(&self) -> Severity {
        match self {
            ErrorKind::EmptyCardBalance | ErrorKind::EmptyDepositBalance => {
                Severity::Informational
            }
            ErrorKind::IncorrectCredentials
            | ErrorKind::InsufficientCash
            | ErrorKind::InsufficientCard
            | ErrorKind::InsufficientDeposit
            | ErrorKind::IncorrectPhone
            | ErrorKind::IncorrectPayment
            | ErrorKind::BalanceOverflow => Severity::Critical,
        }
    }

    pub fn is_critical(&self) -> bool {
        self.severity() == Severity::Critical
    }
}
