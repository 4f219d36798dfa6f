//! Process settings and payroll configuration loading.
//!
//! Settings come from the environment (optionally seeded from a
//! `.env` file).  The payroll rates are read from a JSON file when
//! `PAYROLL_CONFIG_PATH` is set; any field missing from the file keeps
//! its [`PayrollConfig::default`] value.

use crate::error::{PayrollError, Result};
use crate::models::PayrollConfig;
use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    pub payroll_config_path: Option<PathBuf>,
}

impl Settings {
    /// Reads `PAYROLL_BIND_ADDR` and `PAYROLL_CONFIG_PATH`.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let addr = env::var("PAYROLL_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = addr.parse().map_err(|_| PayrollError::BindAddress(addr.clone()))?;
        let payroll_config_path = env::var_os("PAYROLL_CONFIG_PATH").map(PathBuf::from);

        Ok(Self {
            bind_addr,
            payroll_config_path,
        })
    }

    /// The payroll configuration snapshot the server starts with.
    pub fn payroll_config(&self) -> Result<PayrollConfig> {
        match &self.payroll_config_path {
            Some(path) => load_payroll_config(path),
            None => {
                info!("PAYROLL_CONFIG_PATH not set, using default payroll rates");
                Ok(PayrollConfig::default())
            }
        }
    }
}

/// Loads a [`PayrollConfig`] from a JSON file.
pub fn load_payroll_config(path: &Path) -> Result<PayrollConfig> {
    info!(path = %path.display(), "loading payroll configuration");
    let data = std::fs::read_to_string(path).map_err(|source| PayrollError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| PayrollError::Config {
        path: path.to_path_buf(),
        source,
    })
}
