//! Process configuration, read once at startup.

use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;

use tablebridge_core::{ConfigError, RemoteConfig};
use thiserror::Error;

pub const ENV_BIND_ADDR: &str = "BIND_ADDR";
pub const ENV_STATIC_DIR: &str = "STATIC_DIR";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Error)]
pub enum ServerConfigError {
    #[error(transparent)]
    Remote(#[from] ConfigError),

    #[error("BIND_ADDR `{value}` is not a socket address: {source}")]
    BindAddr {
        value: String,
        source: AddrParseError,
    },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Directory served for paths no route matches.
    pub static_dir: Option<PathBuf>,
    pub remote: RemoteConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ServerConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ServerConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let remote = RemoteConfig::from_lookup(&lookup)?;

        let value = lookup(ENV_BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = value
            .parse()
            .map_err(|source| ServerConfigError::BindAddr { value, source })?;

        let static_dir = lookup(ENV_STATIC_DIR)
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            bind_addr,
            static_dir,
            remote,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn defaults_bind_addr() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("REMOTE_API_URL", "http://localhost:54321"),
            ("REMOTE_API_KEY", "k"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert!(config.static_dir.is_none());
        assert_eq!(config.remote.base_url(), "http://localhost:54321");
    }

    #[test]
    fn reads_bind_addr_and_static_dir() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("REMOTE_API_URL", "http://localhost:54321"),
            ("REMOTE_API_KEY", "k"),
            ("BIND_ADDR", "0.0.0.0:8080"),
            ("STATIC_DIR", "public"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.static_dir, Some(PathBuf::from("public")));
    }

    #[test]
    fn bad_bind_addr_is_reported() {
        let err = ServerConfig::from_lookup(lookup(&[
            ("REMOTE_API_URL", "http://localhost:54321"),
            ("REMOTE_API_KEY", "k"),
            ("BIND_ADDR", "localhost"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ServerConfigError::BindAddr { .. }));
    }

    #[test]
    fn remote_errors_pass_through() {
        let err = ServerConfig::from_lookup(lookup(&[("REMOTE_API_KEY", "k")])).unwrap_err();
        assert_eq!(err.to_string(), "REMOTE_API_URL is not set");
    }
}
