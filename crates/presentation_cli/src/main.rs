//! newscast
//!
//! Finds today's newsletter issues in a mailbox, turns them into spoken-word
//! podcasts and mails them back.

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;
use infrastructure::{AppConfig, LoggingConfig, init_logging};

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            install_logging(&LoggingConfig::default(), cli.verbose);
            eprintln!("❌ {e}");
            return ExitCode::from(commands::EXIT_CONFIG);
        },
    };
    install_logging(&config.logging, cli.verbose);

    match dispatch(cli.command, &config).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ {e:#}");
            ExitCode::from(commands::exit_code_for(&e))
        },
    }
}

async fn dispatch(command: Commands, config: &AppConfig) -> anyhow::Result<ExitCode> {
    match command {
        Commands::Run {
            profiles,
            all,
            no_send,
        } => commands::run(config, &profiles, all, no_send).await,
        Commands::Check => commands::check(config).await,
        Commands::Profiles => Ok(commands::profiles(config)),
        Commands::Extract { file, profile } => {
            commands::extract(config, &file, profile.as_deref()).await
        },
    }
}

fn install_logging(logging: &LoggingConfig, verbosity: u8) {
    if let Err(e) = init_logging(logging, verbosity) {
        eprintln!("⚠️  Logging disabled: {e}");
    }
}
