//! fsprobe CLI entry point

use anyhow::{Context, Result};
use fsprobe::config::{self, cli::Cli, validator};
use fsprobe::suite;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging(cli.debug);
    cli.validate()?;

    println!("fsprobe v{}", env!("CARGO_PKG_VERSION"));

    let config = config::load(&cli)?;
    validator::validate_config(cli.suite, &config).context("Configuration validation failed")?;
    tracing::debug!(?config, "effective configuration");

    suite::run(cli.suite, &config)?;
    Ok(())
}

/// Log to stderr; `RUST_LOG` wins over the `--debug` default
fn init_logging(debug: bool) {
    let default_filter = if debug { "fsprobe=debug" } else { "fsprobe=warn" };

    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|expr| EnvFilter::try_new(expr).ok())
        .unwrap_or_else(|| EnvFilter::new(default_filter));

    let _ = fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
