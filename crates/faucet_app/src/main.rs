mod page;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use faucet_chain::{ClaimError, CoinClaim, Faucet};
use faucet_core::config::FaucetConfig;
use faucet_core::logging;
use page::Command;

fn load_config() -> Result<FaucetConfig> {
    match std::env::args().nth(1) {
        Some(path) => FaucetConfig::load_from_path(&PathBuf::from(path)),
        None => FaucetConfig::load(),
    }
}

/// Print toasts that have not been shown yet.
fn flush_notifications(faucet: &Faucet) {
    let toasts = faucet.notifications().lock().take_unread();
    for toast in &toasts {
        println!("{}", page::render_notification(toast));
    }
}

/// Run a claim in the background so the page keeps accepting input.
fn spawn_claim(faucet: &Faucet, claim: Arc<CoinClaim>) {
    let notifications = faucet.notifications().clone();
    tokio::spawn(async move {
        match claim.claim().await {
            Err(e @ (ClaimError::NotConnected | ClaimError::AlreadyPending(_))) => println!("{e}"),
            _ => {
                let toasts = notifications.lock().take_unread();
                for toast in &toasts {
                    println!("{}", page::render_notification(toast));
                }
            }
        }
    });
}

async fn handle(faucet: &Faucet, command: Command) -> Result<bool> {
    match command {
        Command::Quit => return Ok(false),
        Command::Help => println!("{}", page::HELP),
        Command::Refresh => println!("{}", page::render_page(faucet)),
        Command::Wallets => {
            let options = faucet.session().wallets().await;
            println!("{}", page::render_wallets(&options));
        }
        Command::Connect(n) => {
            let options = faucet.session().wallets().await;
            match options.get(n - 1) {
                Some(option) => match faucet.session().connect(&option.name).await {
                    Ok(session) => {
                        println!("Connected {}", page::connect_button_label(&session))
                    }
                    Err(e) => println!("Could not connect {}: {e}", option.name),
                },
                None => println!("No wallet number {n}"),
            }
        }
        Command::Disconnect => {
            faucet.session().disconnect().await;
            println!("[{}]", page::connect_button_label(&faucet.session().current()));
        }
        Command::Claim(n) => match faucet.claims().get(n - 1).cloned() {
            Some(claim) if claim.is_pending() => {
                println!("{} is already in progress", claim.label())
            }
            Some(claim) if !claim.is_enabled() => println!("Connect a wallet to claim"),
            Some(claim) => {
                println!("{}: waiting for wallet...", claim.label());
                spawn_claim(faucet, claim);
            }
            None => println!("No coin number {n}"),
        },
    }
    Ok(true)
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config()?;
    let _guard = match logging::init_logging(&config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Logging disabled: {e}");
            None
        }
    };
    info!(node = %config.node_url, publisher = %config.publisher_address, "starting faucet");

    let mut faucet = Faucet::from_config(config);
    if let Err(e) = faucet.mount().await {
        warn!("starting without coins: {e}");
        println!("Could not load coins: {e}");
    }
    println!("{}", page::render_page(&faucet));
    println!("Type `help` for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let keep_running = match page::parse_command(&line) {
            Ok(command) => handle(&faucet, command).await?,
            Err(msg) => {
                println!("{msg}");
                true
            }
        };
        flush_notifications(&faucet);
        if !keep_running {
            break;
        }
    }

    faucet.session().disconnect().await;
    info!("faucet stopped");
    Ok(())
}
