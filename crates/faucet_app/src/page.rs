//! Text rendering of the faucet page and parsing of user commands.

use faucet_chain::{CoinClaim, Faucet, WalletOption, WalletSession};
use faucet_core::{AppNotification, NotificationType};

pub const HEADER: &str = "Faucet: Claim test coins";
pub const CONNECT_LABEL: &str = "Connect to claim 💡";

pub const HELP: &str = "\
Commands:
  wallets        list wallets
  connect <n>    connect wallet number n
  disconnect     disconnect the active wallet
  claim <n>      claim coin number n
  refresh        redraw the page
  help           show this help
  quit           exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Wallets,
    Connect(usize),
    Disconnect,
    Claim(usize),
    Refresh,
    Help,
    Quit,
}

fn parse_index(arg: Option<&str>, usage: &str) -> Result<usize, String> {
    match arg.map(str::parse::<usize>) {
        Some(Ok(n)) if n > 0 => Ok(n),
        _ => Err(format!("usage: {usage}")),
    }
}

/// Parse one input line. Indices are 1-based as shown on the page.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        return Ok(Command::Refresh);
    };
    let arg = parts.next();

    match verb.to_lowercase().as_str() {
        "wallets" | "w" => Ok(Command::Wallets),
        "connect" | "c" => parse_index(arg, "connect <n>").map(Command::Connect),
        "disconnect" | "d" => Ok(Command::Disconnect),
        "claim" => parse_index(arg, "claim <n>").map(Command::Claim),
        "refresh" | "r" => Ok(Command::Refresh),
        "help" | "h" | "?" => Ok(Command::Help),
        "quit" | "q" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command: {other} (try `help`)")),
    }
}

pub fn connect_button_label(session: &WalletSession) -> String {
    match session.short_address() {
        Some(short) if session.connected => short,
        _ => CONNECT_LABEL.to_string(),
    }
}

pub fn render_wallets(options: &[WalletOption]) -> String {
    if options.is_empty() {
        return "No wallets configured.".into();
    }
    let mut out = String::from("Connect Wallet");
    for (i, option) in options.iter().enumerate() {
        out.push_str(&format!("\n  [{}] {}", i + 1, option.name));
        if !option.ready_state.is_installed() {
            out.push_str(&format!(" ({}, disabled)", option.ready_state));
        }
    }
    out
}

pub fn render_claim_button(index: usize, claim: &CoinClaim) -> String {
    let mut line = format!("  [{}] {}  {}", index + 1, claim.logo_path(), claim.label());
    if claim.is_pending() {
        line.push_str("  (loading...)");
    } else if !claim.is_enabled() {
        line.push_str("  (disabled)");
    }
    line
}

pub fn render_notification(notification: &AppNotification) -> String {
    let marker = match notification.notification_type {
        NotificationType::Success => "[ok]",
        NotificationType::Error => "[error]",
        NotificationType::Warning => "[warn]",
        NotificationType::Info => "[info]",
    };
    let mut out = match &notification.title {
        Some(title) => format!("{marker} {title} {}", notification.message),
        None => format!("{marker} {}", notification.message),
    };
    if let Some(link) = &notification.link {
        out.push_str(&format!("\n        {}: {}", link.label, link.url));
    }
    out
}

pub fn render_page(faucet: &Faucet) -> String {
    let session = faucet.session().current();
    let mut out = format!("{HEADER}    [{}]\n", connect_button_label(&session));

    if faucet.claims().is_empty() {
        out.push_str("  No coins available.");
    } else {
        let buttons: Vec<String> = faucet
            .claims()
            .iter()
            .enumerate()
            .map(|(i, claim)| render_claim_button(i, claim))
            .collect();
        out.push_str(&buttons.join("\n"));
    }
    out
}
