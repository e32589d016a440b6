use std::fmt;
use std::net::SocketAddr;

use anyhow::{bail, Context, Result};
use pawscue_admin_session::SECRET_ENV_VAR;

use crate::db::DbConfig;

pub const PASSWORD_ENV_VAR: &str = "ADMIN_PASSWORD";
pub const MAPBOX_TOKEN_ENV_VAR: &str = "MAPBOX_ACCESS_TOKEN";

/// Where reports are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    /// Process-local; everything is lost on restart.
    Memory,
}

impl StoreBackend {
    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "postgres" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => bail!("PAWSCUE_STORE must be 'postgres' or 'memory', got '{other}'"),
        }
    }
}

/// Service configuration, read from the environment.
///
/// Holds secrets, so `Debug` is written by hand and redacts them.
#[derive(Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub log_level: String,
    pub dev_mode: bool,
    /// Production deployments mark the session cookie `Secure`.
    pub production: bool,
    pub store: StoreBackend,
    pub database: DbConfig,
    pub cookie_secret: String,
    pub admin_password: String,
    pub mapbox_access_token: Option<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("listen_addr", &self.listen_addr)
            .field("log_level", &self.log_level)
            .field("dev_mode", &self.dev_mode)
            .field("production", &self.production)
            .field("store", &self.store)
            .field("cookie_secret", &"<redacted>")
            .field("admin_password", &"<redacted>")
            .field("mapbox_access_token", &self.mapbox_access_token.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

fn flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn required(name: &str) -> Result<String> {
    let value = std::env::var(name).with_context(|| format!("{name} must be set"))?;
    if value.is_empty() {
        bail!("{name} must not be empty");
    }
    Ok(value)
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let listen_addr = std::env::var("PAWSCUE_LISTEN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .context("PAWSCUE_LISTEN_ADDR is not a socket address")?;

        let log_level = std::env::var("PAWSCUE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let dev_mode = flag("PAWSCUE_DEV");

        let production = std::env::var("PAWSCUE_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let store = StoreBackend::parse(&std::env::var("PAWSCUE_STORE").unwrap_or_default())?;

        let mapbox_access_token = std::env::var(MAPBOX_TOKEN_ENV_VAR)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        Ok(Self {
            listen_addr,
            log_level,
            dev_mode,
            production,
            store,
            database: DbConfig::from_env(),
            cookie_secret: required(SECRET_ENV_VAR)?,
            admin_password: required(PASSWORD_ENV_VAR)?,
            mapbox_access_token,
        })
    }
}
