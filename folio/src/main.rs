use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use folio::cli::Cli;
use folio::{commands, default_log_filter, Folio};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let mut folio = Folio::connect(cli.endpoint.as_deref(), Duration::from_secs(cli.timeout_secs))?;
    commands::dispatch(cli.command, &mut folio).await
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_log_filter(verbose, quiet)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
