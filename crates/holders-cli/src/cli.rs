use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "holders",
    about = "Shareholder ledger with a replicated read model",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server (and the replication consumer in async mode)
    Serve(ServeArgs),
    /// Print the effective configuration with secrets masked
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Address to listen on, overriding the configuration
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// Replicate inline on the write path
    #[arg(long, conflicts_with = "asynchronous")]
    pub sync: bool,
    /// Replicate through the message channel
    #[arg(long = "async")]
    pub asynchronous: bool,
}

impl ServeArgs {
    /// The replication mode requested on the command line, if any.
    pub fn synchronous(&self) -> Option<bool> {
        match (self.sync, self.asynchronous) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

#[derive(Args)]
pub struct ConfigArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
