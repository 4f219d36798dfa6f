//! Entry point for the Payroll Engine binary.
//!
//! Running this binary will start an HTTP server that exposes the
//! payroll engine.  The bind address is taken from
//! `PAYROLL_BIND_ADDR` and the payroll rates from the JSON file named
//! by `PAYROLL_CONFIG_PATH`; both may be placed in a `.env` file.
//! Log verbosity follows `RUST_LOG` (default `info`).

use payroll_engine::{api, config::Settings};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_line_number(true)
        .init();

    let settings = Settings::from_env()?;
    let payroll_config = settings.payroll_config()?;
    if let Err(err) = api::serve(settings.bind_addr, payroll_config).await {
        tracing::error!(error = %err, "server terminated");
        return Err(err);
    }
    Ok(())
}
