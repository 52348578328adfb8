mod cmd;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// gsn: small developer tools. `gsn csr` generates a key, a CSR and a self-signed certificate envelope.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: cmd::Command,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    cmd::run(cli.command)
}
