//! Server settings
//!
//! Read through the `config` crate: built-in defaults, overridden by
//! `SERVER_*` environment variables (`SERVER_HOST`, `SERVER_PORT`).

use std::net::SocketAddr;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn load() -> Result<Self> {
        ::config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 7000)?
            .add_source(::config::Environment::with_prefix("SERVER").try_parsing(true))
            .build()
            .context("failed to read server settings")?
            .try_deserialize()
            .context("invalid server settings")
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn defaults_listen_on_port_7000() {
        unsafe {
            std::env::remove_var("SERVER_HOST");
            std::env::remove_var("SERVER_PORT");
        }

        let config = ServerConfig::load().unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 7000);
        assert_eq!(config.addr().unwrap().port(), 7000);
    }

    #[test]
    #[serial]
    fn environment_overrides_defaults() {
        unsafe {
            std::env::set_var("SERVER_HOST", "127.0.0.1");
            std::env::set_var("SERVER_PORT", "8081");
        }

        let config = ServerConfig::load().unwrap();
        assert_eq!(config.addr().unwrap(), "127.0.0.1:8081".parse().unwrap());

        unsafe {
            std::env::remove_var("SERVER_HOST");
            std::env::remove_var("SERVER_PORT");
        }
    }
}
