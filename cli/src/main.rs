//! sgschema command-line tool
//!
//! Usage:
//!   sgschema reduce raw.json schema.yaml
//!   sgschema merge merged.json base.json site/ user.yaml
//!   sgschema entity '$Publish' --schema merged.json
//!   sgschema field Task '$parent.Shot.$status' --schema merged.json

use anyhow::Result;
use clap::Parser;
use sgschema_cli::{Cli, run};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let stdout = std::io::stdout();
    run(cli, &mut stdout.lock())
}
