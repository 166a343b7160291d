//! Command-line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Newsletter-to-podcast pipeline
#[derive(Debug, Parser)]
#[command(name = "newscast")]
#[command(author, version, about = "Turn email newsletters into podcasts", long_about = None)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (defaults to ./config.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Turn today's newsletters into podcasts
    ///
    /// Example: newscast run --profile mando
    /// Example: newscast run --all --no-send
    Run {
        /// Profile to process, repeatable; runs in the order given
        #[arg(short, long = "profile", value_name = "NAME", conflicts_with = "all")]
        profiles: Vec<String>,

        /// Process every enabled profile in configuration order
        #[arg(long)]
        all: bool,

        /// Write the artifacts but do not send anything
        #[arg(long)]
        no_send: bool,
    },

    /// Check connectivity to the mail servers and API credentials
    Check,

    /// List configured newsletter profiles
    Profiles,

    /// Build a script from a saved .eml file without touching the network
    ///
    /// Example: newscast extract --file issue.eml --profile mando
    Extract {
        /// RFC 822 message file
        #[arg(short, long)]
        file: PathBuf,

        /// Profile whose style shapes the script
        #[arg(short, long)]
        profile: Option<String>,
    },
}
