use std::io;
use std::path::PathBuf;
use std::process;

use atm_eng::csv::{read_account, read_requests, write_settlements};
use atm_eng::{Atm, Bank};
use clap::Parser;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Replay a script of ATM requests against a single account
#[derive(Parser, Debug)]
#[command(name = "atm-eng", version, about, long_about = None)]
struct Cli {
    /// Account csv file (name,card_id,pin,phone,cash,deposit,card,phone_balance)
    #[arg(long, value_name = "FILE")]
    account: PathBuf,

    /// Requests csv file (card_id,pin,action,amount,phone,payment)
    #[arg(value_name = "REQUESTS")]
    requests: PathBuf,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(LevelFilter::WARN.into()))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.requests.extension().is_none_or(|ext| ext != "csv") {
        warn!(path = %cli.requests.display(), "input file seems to not be a csv file");
    }

    let account = read_account(&cli.account).unwrap_or_else(|e| fail(e));
    let requests = read_requests(cli.requests.clone()).unwrap_or_else(|e| fail(e));

    let mut atm = Atm::new(Bank::new(account));
    info!(holder = %atm.bank().account().name, "account loaded");
    let (request_sender, request_receiver) = tokio::sync::mpsc::channel(16);

    tokio::spawn(async move {
        for result in requests {
            match result {
                Ok(request) => {
                    if request_sender.send(request).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("{e}");
                }
            }
        }
    });

    let settlements = atm.run(ReceiverStream::new(request_receiver)).await;
    let account = atm.into_bank().into_account();
    info!(
        holder = %account.name,
        settled = settlements.len(),
        balances = ?account.balances(),
        "session finished"
    );

    if let Err(e) = write_settlements(io::stdout().lock(), &settlements) {
        fail(e);
    }
}

fn fail(e: impl std::fmt::Display) -> ! {
    error!("{e}");
    process::exit(1);
}
