//! Server config loader (strict parsing).
//!
//! Sources, in order: built-in defaults, the YAML file named by
//! `REQMETER_CONFIG` (if set), then the `PORT` env var.

pub mod schema;

use std::fs;

use reqmeter_core::error::{MeterError, Result};

pub use schema::{MetricsSection, ServerConfig, ServerSection, UnmatchedPaths};

pub const CONFIG_ENV: &str = "REQMETER_CONFIG";
pub const PORT_ENV: &str = "PORT";

pub fn load_from_file(path: &str) -> Result<ServerConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| MeterError::Config(format!("read config {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ServerConfig> {
    let cfg: ServerConfig = serde_yaml::from_str(s)
        .map_err(|e| MeterError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Resolve config from the process environment.
pub fn load_from_env() -> Result<ServerConfig> {
    let mut cfg = match std::env::var(CONFIG_ENV) {
        Ok(path) if !path.is_empty() => load_from_file(&path)?,
        _ => ServerConfig::default(),
    };
    apply_port_override(&mut cfg, std::env::var(PORT_ENV).ok().as_deref())?;
    cfg.validate()?;
    Ok(cfg)
}

/// An unset or empty `PORT` keeps the configured port.
pub fn apply_port_override(cfg: &mut ServerConfig, raw: Option<&str>) -> Result<()> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(());
    };
    cfg.server.port = raw
        .parse()
        .map_err(|_| MeterError::Config(format!("{PORT_ENV} must be a port number, got {raw:?}")))?;
    Ok(())
}
