use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::warn;

const DEV_SECRET: &str = "it's a secret";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub secret_key: String,
    pub static_dir: PathBuf,
}

impl ServerConfig {
    /// Read `WARBLER_*` variables, falling back to development defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = match get("WARBLER_PORT") {
            Some(port) => port
                .parse()
                .with_context(|| format!("WARBLER_PORT is not a port number: {port:?}"))?,
            None => 5000,
        };

        let secret_key = get("WARBLER_SECRET_KEY").unwrap_or_else(|| {
            warn!("WARBLER_SECRET_KEY not set, using the development secret");
            DEV_SECRET.into()
        });

        Ok(Self {
            host: get("WARBLER_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            db_path: get("WARBLER_DB_PATH")
                .unwrap_or_else(|| "warbler.db".into())
                .into(),
            secret_key,
            static_dir: get("WARBLER_STATIC_DIR")
                .unwrap_or_else(|| "static".into())
                .into(),
        })
    }
}
