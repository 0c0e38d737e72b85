//! # uimap
//!
//! Scan a recorded accessibility tree and print the label of every
//! meaningful control next to the locator that addresses it.
//!
//! ## Architecture
//!
//! This is Layer 4 - the binary that ties together:
//! - uimap-core: Core types and configuration
//! - uimap-driver: Recorded trees replayed through the driver boundary
//! - uimap-session: Scanning and the component cache

use uimap::{load_config, render, render_schema, scan, Command};

fn main() -> anyhow::Result<()> {
    let command = Command::parse(std::env::args().skip(1))?;
    let options = match command {
        Command::Schema => {
            println!("{}", render_schema()?);
            return Ok(());
        }
        Command::Scan(options) => options,
    };

    let config = load_config(options.config.as_deref())?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.session.log_level)),
        )
        .init();

    tracing::info!("uimap v{} scanning {}", env!("CARGO_PKG_VERSION"), options.tree.display());

    let map = scan(&options, config).map_err(|e| {
        tracing::error!("Scan failed: {:#}", e);
        e
    })?;
    print!("{}", render(&map, options.format)?);

    Ok(())
}
