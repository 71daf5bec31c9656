//! Assisterr Daily Claim
//!
//! Logs in every wallet from the accounts file and claims daily points,
//! repeating every 12 hours until interrupted.

mod countdown;
mod style;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use assisterr_claim::{AccountScheduler, AccountsFile, AssisterrClient, Config, KeySource};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use countdown::SpinnerCountdown;
use style::*;

const BANNER: &str = r#"
               _     __
 ___ ____ ___ (_)__ / /____ ________
/ _ `(_-<(_-</ (_-</ __/ -_) __/ __/
\_,_/___/___/_/___/\__/\__/_/ /_/
"#;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "assisterr-claim")]
#[command(version)]
#[command(
    about = "Assisterr daily claim - log in wallets and claim points every 12 hours",
    long_about = None
)]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if let Err(e) = run(cli).await {
        print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    print_banner();

    let config = Config::load_from(&cli.config)?;

    let source = AccountsFile::new(&config.accounts.path);
    let accounts = source.list_accounts().context("Error reading accounts")?;
    print_info(&format!(
        "Found {} accounts in {} to process...",
        accounts.len(),
        source.path().display()
    ));
    println!();

    let api = Arc::new(AssisterrClient::new(config.http.timeout())?);
    let mut scheduler =
        AccountScheduler::new(api, accounts).with_display(Box::new(SpinnerCountdown::default()));

    tokio::select! {
        _ = scheduler.run_forever() => {}
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for shutdown signal")?;
            println!();
            info!("Shutdown signal received, stopping");
        }
    }

    print_success("Stopped");
    Ok(())
}

fn print_banner() {
    println!("{}", console::style(BANNER).cyan());
    print_rule();
    println!(
        "  {} {}",
        console::style("Assisterr Daily Claim").bold(),
        console::style(format!("v{}", VERSION)).dim()
    );
    print_rule();
    println!();
}
