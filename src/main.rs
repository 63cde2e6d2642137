mod config;
mod core;
mod error;
mod github;
mod lists;
mod output;
mod rpc;
mod signals;
mod wellknown;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::core::scan::Scanner;
use crate::error::ScanError;
use crate::lists::CuratedLists;
use crate::rpc::XrplRpc;
use crate::rpc::web::HttpProbe;

#[derive(Parser)]
#[command(name = "xrglass", version, about = "Heuristic trust verdicts for XRP Ledger wallets and domains")]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, default_value = "xrglass.toml")]
    config: PathBuf,
    /// Print the JSON API envelope instead of a text summary
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Score an XRP Ledger account
    Wallet { address: String },
    /// Score a project domain (HTTPS and xrp.toml)
    Domain { domain: String },
    /// Advisory check for lookalike (typosquat) domains
    Lookalike { url: String },
}

fn exit_code(err: &ScanError) -> ExitCode {
    match err {
        ScanError::InvalidAddress(_) | ScanError::InvalidDomain(_) => ExitCode::from(2),
        ScanError::Unavailable(_) => ExitCode::from(3),
    }
}

fn emit<T: Serialize>(json: bool, envelope: &T, text: impl FnOnce() -> String) -> ExitCode {
    if !json {
        println!("{}", text());
        return ExitCode::SUCCESS;
    }
    match output::to_json(envelope) {
        Ok(body) => {
            println!("{body}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("failed to encode response: {e}");
            ExitCode::FAILURE
        }
    }
}

fn fail(json: bool, err: &ScanError) -> ExitCode {
    if json {
        if let Ok(body) = output::to_json(&output::error_envelope(err)) {
            println!("{body}");
        }
    } else {
        eprintln!("{}", output::render_error(err));
    }
    exit_code(err)
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("xrglass=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config).with_env();
    tracing::debug!("Config: {:?}", config);

    let client = match rpc::build_client(&config.http.user_agent) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("failed to build HTTP client: {e}");
            return ExitCode::FAILURE;
        }
    };
    let ledger = XrplRpc::with_client(
        client.clone(),
        config.ledger.endpoints.clone(),
        config.ledger.timeout(),
    );
    let web = HttpProbe::with_client(client, config.http.timeout());
    let scanner = Scanner::new(
        ledger,
        web,
        CuratedLists::from_config(&config.lists),
        config.lists.known_domains.clone(),
    );

    match cli.command {
        Command::Wallet { address } => match scanner.scan_wallet(&address).await {
            Ok(report) => emit(cli.json, &output::scan_envelope(&report), || {
                output::render_scan(&report)
            }),
            Err(e) => fail(cli.json, &e),
        },
        Command::Domain { domain } => match scanner.scan_domain(&domain).await {
            Ok(report) => emit(cli.json, &output::scan_envelope(&report), || {
                output::render_scan(&report)
            }),
            Err(e) => fail(cli.json, &e),
        },
        Command::Lookalike { url } => match scanner.scan_lookalike(&url).await {
            Ok(report) => emit(cli.json, &output::lookalike_envelope(&report), || {
                output::render_lookalike(&report)
            }),
            Err(e) => fail(cli.json, &e),
        },
    }
}
