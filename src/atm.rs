//! Transaction dispatcher.
//!
//! The [`Atm`] authenticates each request against its bank, runs the check
//! that guards the requested action and applies the matching transfer. Every
//! request yields exactly one [`Outcome`]; a refused request never touches
//! the account.

use tokio_stream::{Stream, StreamExt};
use tracing::{info, warn};

use crate::Amount;
use crate::engine::{Balances, Bank, BankApi, ErrorKind};
use crate::model::{Action, BalanceKind, PaymentMethod, Pin, Request};
use crate::receipt::Receipt;

/// Result of one ATM request.
pub type Outcome = Result<Receipt, ErrorKind>;

/// A request applied by [`Atm::run`], with the balances right after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub ticket: usize,
    pub outcome: Outcome,
    pub balances: Balances,
}

/// The ATM in front of a single bank.
pub struct Atm<B = Bank> {
    bank: B,
}

/// Public API
impl<B: BankApi> Atm<B> {
    pub fn new(bank: B) -> Self {
        Self { bank }
    }

    pub fn bank(&self) -> &B {
        &self.bank
    }

    pub fn into_bank(self) -> B {
        self.bank
    }

    /// Authenticate and apply a single action.
    pub fn execute(
        &mut self,
        card_id: &str,
        pin: Pin,
        action: &Action,
        payment: Option<PaymentMethod>,
    ) -> Outcome {
        let result = self.dispatch(card_id, pin, action, payment);
        Self::log_result(action, payment, &result);
        result
    }

    pub fn submit(&mut self, request: &Request) -> Outcome {
        self.execute(
            &request.card_id,
            request.pin,
            &request.action,
            request.payment,
        )
    }

    /// Run the ATM over a stream of ticketed requests, in arrival order.
    pub async fn run(
        &mut self,
        mut stream: impl Stream<Item = (usize, Request)> + Unpin,
    ) -> Vec<Settlement> {
        let mut settlements = Vec::new();
        while let Some((ticket, request)) = stream.next().await {
            // a refused request does not stop the session
            let outcome = self.submit(&request);
            settlements.push(Settlement {
                ticket,
                outcome,
                balances: self.bank.balances(),
            });
        }
        settlements
    }
}

/// Private API
impl<B: BankApi> Atm<B> {
    fn log_result(action: &Action, payment: Option<PaymentMethod>, result: &Outcome) {
        let amount = action
            .amount()
            .or(payment.map(|payment| payment.amount()));
        let action = action.name();
        match (result, amount) {
            (Ok(receipt), _) => {
                info!(%receipt, "{action} applied");
            }
            (Err(e), Some(amt)) if e.is_critical() => {
                warn!(amount = %amt, reason = %e, "{action} refused");
            }
            (Err(e), None) if e.is_critical() => {
                warn!(reason = %e, "{action} refused");
            }
            (Err(e), _) => {
                info!(reason = %e, "{action} refused");
            }
        }
    }

    fn dispatch(
        &mut self,
        card_id: &str,
        pin: Pin,
        action: &Action,
        payment: Option<PaymentMethod>,
    ) -> Outcome {
        if !self.bank.authenticate(card_id, pin) {
            return Err(ErrorKind::IncorrectCredentials);
        }

        match action {
            Action::RequestCardBalance => {
                if !self.bank.has_card_balance() {
                    return Err(ErrorKind::EmptyCardBalance);
                }
                Ok(Receipt::Balance {
                    of: BalanceKind::Card,
                    amount: self.bank.balances().card,
                })
            }
            Action::RequestDepositBalance => {
                if !self.bank.has_deposit_balance() {
                    return Err(ErrorKind::EmptyDepositBalance);
                }
                Ok(Receipt::Balance {
                    of: BalanceKind::Deposit,
                    amount: self.bank.balances().deposit,
                })
            }
            Action::WithdrawFromDeposit(amount) => {
                if !self.bank.can_cover_deposit(*amount) {
                    return Err(ErrorKind::InsufficientDeposit);
                }
                self.bank.withdraw_from_deposit(*amount)?;
                Ok(self.receipt(*amount, BalanceKind::Deposit, BalanceKind::Cash))
            }
            Action::WithdrawFromCard(amount) => {
                if !self.bank.can_cover_card(*amount) {
                    return Err(ErrorKind::InsufficientCard);
                }
                self.bank.withdraw_from_card(*amount)?;
                Ok(self.receipt(*amount, BalanceKind::Card, BalanceKind::Cash))
            }
            Action::DepositToDeposit(amount) => {
                if !self.bank.can_cover_cash(*amount) {
                    return Err(ErrorKind::InsufficientCash);
                }
                self.bank.deposit_to_deposit(*amount)?;
                Ok(self.receipt(*amount, BalanceKind::Cash, BalanceKind::Deposit))
            }
            Action::DepositToCard(amount) => {
                if !self.bank.can_cover_cash(*amount) {
                    return Err(ErrorKind::InsufficientCash);
                }
                self.bank.deposit_to_card(*amount)?;
                Ok(self.receipt(*amount, BalanceKind::Cash, BalanceKind::Card))
            }
            Action::PayPhone(number) => {
                // the payment is only looked at once the phone matches
                if !self.bank.matches_phone(number) {
                    return Err(ErrorKind::IncorrectPhone);
                }
                match payment.ok_or(ErrorKind::IncorrectPayment)? {
                    PaymentMethod::Card(amount) => {
                        if !self.bank.can_cover_card(amount) {
                            return Err(ErrorKind::InsufficientCard);
                        }
                        self.bank.pay_phone_by_card(amount)?;
                        Ok(self.receipt(amount, BalanceKind::Card, BalanceKind::Phone))
                    }
                    PaymentMethod::Cash(amount) => {
                        if !self.bank.can_cover_cash(amount) {
                            return Err(ErrorKind::InsufficientCash);
                        }
                        self.bank.pay_phone_by_cash(amount)?;
                        Ok(self.receipt(amount, BalanceKind::Cash, BalanceKind::Phone))
                    }
                }
            }
        }
    }

    /// Receipt for a transfer that was just applied.
    fn receipt(&self, amount: Amount, from: BalanceKind, to: BalanceKind) -> Receipt {
        let balances = self.bank.balances();
        Receipt::Transfer {
            amount,
            from,
            to,
            from_balance: balances.get(from),
            to_balance: balances.get(to),
        }
    }
}
