use colored::Colorize;

use holders_server::{AppConfig, HoldersServer};

use crate::cli::{Cli, Command, ConfigArgs, OutputFormat, ServeArgs};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::Config(args) => cmd_config(args, cli.format),
    }
}

/// Effective configuration for `serve`: file, then environment, then flags.
fn serve_config(args: &ServeArgs) -> anyhow::Result<AppConfig> {
    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.server.bind_addr = bind;
    }
    if let Some(synchronous) = args.synchronous() {
        config.replication.synchronous = synchronous;
    }
    Ok(config)
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = serve_config(&args)?;
    let mode = if config.replication.synchronous { "sync" } else { "async" };
    println!(
        "{} holders server on {} ({} replication, exchange {})",
        "✓".green().bold(),
        config.server.bind_addr.to_string().bold(),
        mode.yellow(),
        config.broker.exchange.cyan()
    );

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(HoldersServer::new(config).serve())?;
    Ok(())
}

fn cmd_config(args: ConfigArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = AppConfig::load(args.config.as_deref())?.redacted();
    match format {
        OutputFormat::Text => print!("{}", config.to_toml()?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
    }
    Ok(())
}
