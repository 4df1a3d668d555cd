use std::io::{self, BufWriter, Write};

use anyhow::Result;
use clap::Parser;
use equity_cli::{AppConfig, Cli, commands, logging};
use tracing::debug;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config first: it decides where logs go.
    let config = AppConfig::load(cli.config.as_deref())?;
    logging::init_logging(&config.logging, cli.verbose)?;
    match &config.source {
        Some(path) => debug!(path = %path.display(), "loaded configuration"),
        None => debug!("no configuration file; using defaults"),
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    commands::run(&cli.command, &config, &mut out)?;
    out.flush()?;
    Ok(())
}
