use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::amount::{Amount, AmountError};
use crate::atm::Settlement;
use crate::engine::Account;
use crate::model::{Action, PaymentMethod, Pin, Request};

/// Errors that can occur when reading or writing csv files
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("failed to open {path}: {source}")]
    Open { path: String, source: csv::Error },

    #[error("line {line}: failed to parse row: {source}")]
    Parse { line: usize, source: csv::Error },

    #[error("line {line}: unrecognized action '{action}'")]
    UnrecognizedAction { line: usize, action: String },

    #[error("line {line}: {action} missing amount")]
    MissingAmount { line: usize, action: String },

    #[error("line {line}: {source}")]
    InvalidAmount { line: usize, source: AmountError },

    #[error("line {line}: pay_phone missing phone number")]
    MissingPhone { line: usize },

    #[error("line {line}: unrecognized payment method '{payment}'")]
    UnrecognizedPayment { line: usize, payment: String },

    #[error("{path}: no account row")]
    MissingAccount { path: String },

    #[error("{path}: expected a single account row")]
    TooManyAccounts { path: String },

    #[error("failed to write csv row: {0}")]
    Write(#[from] csv::Error),

    #[error("failed to flush output: {0}")]
    Flush(#[from] io::Error),
}

#[derive(Debug, Deserialize)]
struct RequestRow {
    card_id: String,
    pin: Pin,
    action: String,
    amount: Option<f64>,
    phone: Option<String>,
    payment: Option<String>,
}

#[derive(Debug, Serialize)]
struct OutputRow {
    ticket: usize,
    status: &'static str,
    critical: Option<bool>,
    message: String,
    cash: String,
    deposit: String,
    card: String,
    phone: String,
}

/// Only headers are trimmed: card ids and phone numbers are compared exactly.
fn reader(path: &Path) -> Result<csv::Reader<std::fs::File>, CsvError> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(|source| CsvError::Open {
            path: path.display().to_string(),
            source,
        })
}

/// Read the single account served by the ATM
pub fn read_account(path: impl AsRef<Path>) -> Result<Account, CsvError> {
    let path = path.as_ref();
    let mut rows = reader(path)?.into_deserialize::<Account>();

    let account = rows
        .next()
        .ok_or_else(|| CsvError::MissingAccount {
            path: path.display().to_string(),
        })?
        .map_err(|source| CsvError::Parse { line: 2, source })?;

    if rows.next().is_some() {
        return Err(CsvError::TooManyAccounts {
            path: path.display().to_string(),
        });
    }

    Ok(account)
}

/// Read ATM requests from a csv file, each tagged with its line number
pub fn read_requests(
    path: impl AsRef<Path>,
) -> Result<impl Iterator<Item = Result<(usize, Request), CsvError>>, CsvError> {
    let reader = reader(path.as_ref())?;

    Ok(reader
        .into_deserialize::<RequestRow>()
        .enumerate()
        .map(|(idx, result)| {
            let line = idx + 2; // 1-indexed, skip header
            let row = result.map_err(|source| CsvError::Parse { line, source })?;
            parse_request(line, row).map(|request| (line, request))
        }))
}

fn parse_request(line: usize, row: RequestRow) -> Result<Request, CsvError> {
    let amount = |action: &str| -> Result<Amount, CsvError> {
        let value = row.amount.ok_or_else(|| CsvError::MissingAmount {
            line,
            action: action.to_string(),
        })?;
        Amount::try_from_float(value).map_err(|source| CsvError::InvalidAmount { line, source })
    };

    let mut payment = None;
    let action = match row.action.as_str() {
        "card_balance" => Action::RequestCardBalance,
        "deposit_balance" => Action::RequestDepositBalance,
        "withdraw_deposit" => Action::WithdrawFromDeposit(amount("withdraw_deposit")?),
        "withdraw_card" => Action::WithdrawFromCard(amount("withdraw_card")?),
        "deposit_to_deposit" => Action::DepositToDeposit(amount("deposit_to_deposit")?),
        "deposit_to_card" => Action::DepositToCard(amount("deposit_to_card")?),
        "pay_phone" => {
            let phone = row.phone.clone().ok_or(CsvError::MissingPhone { line })?;
            payment = match row.payment.as_deref() {
                None => None,
                Some("cash") => Some(PaymentMethod::Cash(amount("pay_phone")?)),
                Some("card") => Some(PaymentMethod::Card(amount("pay_phone")?)),
                Some(other) => {
                    return Err(CsvError::UnrecognizedPayment {
                        line,
                        payment: other.to_string(),
                    });
                }
            };
            Action::PayPhone(phone)
        }
        other => {
            return Err(CsvError::UnrecognizedAction {
                line,
                action: other.to_string(),
            });
        }
    };

    Ok(Request {
        card_id: row.card_id,
        pin: row.pin,
        action,
        payment,
    })
}

/// Write settled requests in csv format
pub fn write_settlements<'a>(
    writer: impl io::Write,
    settlements: impl IntoIterator<Item = &'a Settlement>,
) -> Result<(), CsvError> {
    let mut writer = csv::Writer::from_writer(writer);

    for settlement in settlements {
        let (status, critical, message) = match &settlement.outcome {
            Ok(receipt) => ("ok", None, receipt.to_string()),
            Err(e) => ("failed", Some(e.is_critical()), e.to_string()),
        };
        let balances = settlement.balances;
        writer.serialize(OutputRow {
            ticket: settlement.ticket,
            status,
            critical,
            message,
            cash: balances.cash.to_string(),
            deposit: balances.deposit.to_string(),
            card: balances.card.to_string(),
            phone: balances.phone.to_string(),
        })?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Balances, ErrorKind};
    use crate::model::BalanceKind;
    use crate::receipt::Receipt;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const REQUEST_HEADER: &str = "card_id,pin,action,amount,phone,payment\n";

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn requests(rows: &str) -> Vec<Result<(usize, Request), CsvError>> {
        let file = write_csv(&format!("{REQUEST_HEADER}{rows}"));
        read_requests(file.path()).unwrap().collect()
    }

    // Account

    #[test]
    fn read_account_row() {
        let file = write_csv(
            "name,card_id,pin,phone,cash,deposit,card,phone_balance\n\
             Jan Kowalski,4409 7788 9321 8700,5678,+48567897464,500,1000,300,13.25\n",
        );
        let account = read_account(file.path()).unwrap();
        assert_eq!(account.name, "Jan Kowalski");
        assert_eq!(account.card_id, "4409 7788 9321 8700");
        assert_eq!(account.pin, 5678);
        assert_eq!(account.phone, "+48567897464");
        assert_eq!(account.cash, Amount::from_float(500.0));
        assert_eq!(account.deposit, Amount::from_float(1000.0));
        assert_eq!(account.card, Amount::from_float(300.0));
        assert_eq!(account.phone_balance, Amount::from_float(13.25));
    }

    #[test]
    fn read_account_without_rows_fails() {
        let file = write_csv("name,card_id,pin,phone,cash,deposit,card,phone_balance\n");
        let err = read_account(file.path()).unwrap_err();
        assert!(matches!(err, CsvError::MissingAccount { .. }));
    }

    #[test]
    fn read_account_with_two_rows_fails() {
        let file = write_csv(
            "name,card_id,pin,phone,cash,deposit,card,phone_balance\n\
             A,1,1,1,0,0,0,0\n\
             B,2,2,2,0,0,0,0\n",
        );
        let err = read_account(file.path()).unwrap_err();
        assert!(matches!(err, CsvError::TooManyAccounts { .. }));
    }

    #[test]
    fn read_account_with_out_of_range_balance_fails() {
        let file = write_csv(
            "name,card_id,pin,phone,cash,deposit,card,phone_balance\n\
             A,1,1,1,NaN,0,0,0\n",
        );
        let err = read_account(file.path()).unwrap_err();
        assert!(matches!(err, CsvError::Parse { line: 2, .. }));

        let file = write_csv(
            "name,card_id,pin,phone,cash,deposit,card,phone_balance\n\
             A,1,1,1,0,1e300,0,0\n",
        );
        let err = read_account(file.path()).unwrap_err();
        assert!(matches!(err, CsvError::Parse { line: 2, .. }));
    }

    #[test]
    fn read_account_missing_file_fails() {
        let err = read_account("does/not/exist.csv").unwrap_err();
        assert!(matches!(err, CsvError::Open { .. }));
    }

    // Requests

    #[test]
    fn read_withdrawal() {
        let results = requests("4409 7788 9321 8700,5678,withdraw_deposit,1000,,\n");
        assert_eq!(results.len(), 1);

        let (line, request) = results.into_iter().next().unwrap().unwrap();
        assert_eq!(line, 2);
        assert_eq!(request.card_id, "4409 7788 9321 8700");
        assert_eq!(request.pin, 5678);
        assert_eq!(
            request.action,
            Action::WithdrawFromDeposit(Amount::from_float(1000.0))
        );
        assert_eq!(request.payment, None);
    }

    #[test]
    fn read_balance_inquiries_without_amount() {
        let results = requests("1,1,card_balance,,,\n1,1,deposit_balance,,,\n");
        let actions: Vec<_> = results
            .into_iter()
            .map(|r| r.unwrap().1.action)
            .collect();
        assert_eq!(
            actions,
            vec![Action::RequestCardBalance, Action::RequestDepositBalance]
        );
    }

    #[test]
    fn read_pay_phone_with_and_without_payment() {
        let results = requests(
            "1,1,pay_phone,15.5,+48567897464,card\n\
             1,1,pay_phone,,+48567897464,\n",
        );

        let (_, by_card) = results[0].as_ref().unwrap();
        assert_eq!(by_card.action, Action::PayPhone("+48567897464".to_string()));
        assert_eq!(
            by_card.payment,
            Some(PaymentMethod::Card(Amount::from_float(15.5)))
        );

        let (line, no_payment) = results[1].as_ref().unwrap();
        assert_eq!(*line, 3);
        assert_eq!(no_payment.payment, None);
    }

    #[test]
    fn read_with_spaced_headers() {
        let file = write_csv(
            "card_id, pin, action, amount, phone, payment\n1,1,deposit_to_card,10.0,,\n",
        );
        let results: Vec<_> = read_requests(file.path()).unwrap().collect();
        assert_eq!(results.len(), 1);
        assert!(results[0].is_ok());
    }

    #[test]
    fn fields_are_not_trimmed() {
        let results = requests("4409 7788 9321 8700 ,1,pay_phone,,+48567897464 ,\n");
        let (_, request) = results[0].as_ref().unwrap();
        assert_eq!(request.card_id, "4409 7788 9321 8700 ");
        assert_eq!(request.action, Action::PayPhone("+48567897464 ".to_string()));
    }

    #[test]
    fn read_pins_outside_u32() {
        let results = requests("1,-1,card_balance,,,\n1,4294967296,card_balance,,,\n");
        let pins: Vec<Pin> = results.into_iter().map(|r| r.unwrap().1.pin).collect();
        assert_eq!(pins, vec![-1, 4_294_967_296]);
    }

    #[test]
    fn payment_is_ignored_for_other_actions() {
        let results = requests(
            "1,1,withdraw_card,10,,cash\n\
             1,1,card_balance,,,card\n\
             1,1,deposit_balance,,,cheque\n",
        );
        let parsed: Vec<Request> = results.into_iter().map(|r| r.unwrap().1).collect();
        assert_eq!(
            parsed[0].action,
            Action::WithdrawFromCard(Amount::from_float(10.0))
        );
        assert!(parsed.iter().all(|request| request.payment.is_none()));
    }

    #[test]
    fn read_returns_error_for_invalid_amount() {
        let results = requests(
            "1,1,withdraw_card,NaN,,\n\
             1,1,deposit_to_card,inf,,\n\
             1,1,pay_phone,1e16,+48,cash\n",
        );
        for (idx, result) in results.iter().enumerate() {
            let line = idx + 2;
            assert!(
                matches!(result, Err(CsvError::InvalidAmount { line: l, .. }) if *l == line),
                "line {line}: {result:?}"
            );
        }
    }

    #[test]
    fn read_returns_error_for_unknown_action() {
        let results = requests("1,1,transfer,10,,\n");
        let err = results[0].as_ref().unwrap_err();
        assert!(matches!(err, CsvError::UnrecognizedAction { line: 2, .. }));
    }

    #[test]
    fn read_returns_error_for_missing_amount() {
        let results = requests("1,1,withdraw_card,,,\n1,1,pay_phone,,+48,cash\n");
        assert!(matches!(
            results[0].as_ref().unwrap_err(),
            CsvError::MissingAmount { line: 2, .. }
        ));
        assert!(matches!(
            results[1].as_ref().unwrap_err(),
            CsvError::MissingAmount { line: 3, .. }
        ));
    }

    #[test]
    fn read_returns_error_for_missing_phone_and_bad_payment() {
        let results = requests("1,1,pay_phone,10,,cash\n1,1,pay_phone,10,+48,cheque\n");
        assert!(matches!(
            results[0].as_ref().unwrap_err(),
            CsvError::MissingPhone { line: 2 }
        ));
        assert!(matches!(
            results[1].as_ref().unwrap_err(),
            CsvError::UnrecognizedPayment { line: 3, .. }
        ));
    }

    #[test]
    fn read_returns_error_for_bad_pin() {
        let results = requests("1,abc,card_balance,,,\n");
        assert!(matches!(
            results[0].as_ref().unwrap_err(),
            CsvError::Parse { line: 2, .. }
        ));
    }

    // Output

    #[test]
    fn write_ok_and_failed_rows() {
        let balances = Balances {
            cash: Amount::from_float(1500.0),
            deposit: Amount::ZERO,
            card: Amount::from_float(300.0),
            phone: Amount::from_float(13.25),
        };
        let settlements = vec![
            Settlement {
                ticket: 2,
                outcome: Ok(Receipt::Transfer {
                    amount: Amount::from_float(1000.0),
                    from: BalanceKind::Deposit,
                    to: BalanceKind::Cash,
                    from_balance: Amount::ZERO,
                    to_balance: Amount::from_float(1500.0),
                }),
                balances,
            },
            Settlement {
                ticket: 3,
                outcome: Err(ErrorKind::EmptyDepositBalance),
                balances,
            },
        ];

        let mut out = Vec::new();
        write_settlements(&mut out, &settlements).unwrap();
        let out = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(
            lines[0],
            "ticket,status,critical,message,cash,deposit,card,phone"
        );
        assert_eq!(
            lines[1],
            "2,ok,,\"withdrew 1000.0000 from deposit; deposit 0.0000, cash 1500.0000\",1500.0000,0.0000,300.0000,13.2500"
        );
        assert_eq!(
            lines[2],
            "3,failed,false,balance of the bank deposit is empty,1500.0000,0.0000,300.0000,13.2500"
        );
    }
}
