pub mod amount;
pub mod atm;
pub mod csv;
pub mod engine;
pub mod model;
pub mod receipt;

pub use amount::{Amount, AmountError};
pub use atm::{Atm, Outcome, Settlement};
pub use engine::{Account, Balances, Bank, BankApi, ErrorKind, Severity};
pub use model::{Action, BalanceKind, PaymentMethod, Pin, Request};
pub use receipt::Receipt;
