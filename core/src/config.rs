//! Connection settings for the remote table API.
//!
//! `RemoteConfig` is built once at startup and handed to `TableClient::new`;
//! nothing reads the environment after that.

use thiserror::Error;
use url::Url;

use crate::digest::DigestScheme;

pub const ENV_URL: &str = "REMOTE_API_URL";
pub const ENV_KEY: &str = "REMOTE_API_KEY";
pub const ENV_DIGEST: &str = "PASSWORD_DIGEST";
pub const ENV_STRICT: &str = "STRICT_MUTATIONS";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{key} has an invalid value `{value}`: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Where the remote API lives and how to authenticate against it.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    base_url: String,
    api_key: String,
    digest: DigestScheme,
    strict_mutations: bool,
}

impl RemoteConfig {
    /// Validates `base_url` as an http(s) URL and `api_key` as non-empty.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, ConfigError> {
        let parsed = Url::parse(base_url).map_err(|e| ConfigError::Invalid {
            key: ENV_URL,
            value: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                key: ENV_URL,
                value: base_url.to_string(),
                reason: "scheme must be http or https".to_string(),
            });
        }
        if api_key.trim().is_empty() {
            return Err(ConfigError::Missing(ENV_KEY));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.trim().to_string(),
            digest: DigestScheme::default(),
            strict_mutations: false,
        })
    }

    pub fn with_digest(mut self, digest: DigestScheme) -> Self {
        self.digest = digest;
        self
    }

    pub fn with_strict_mutations(mut self, strict: bool) -> Self {
        self.strict_mutations = strict;
        self
    }

    /// Reads the settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the settings through `lookup`, which maps a key to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(ENV_URL).ok_or(ConfigError::Missing(ENV_URL))?;
        let api_key = lookup(ENV_KEY).ok_or(ConfigError::Missing(ENV_KEY))?;
        let mut config = Self::new(&base_url, &api_key)?;

        if let Some(value) = lookup(ENV_DIGEST) {
            config.digest = value.parse().map_err(|reason| ConfigError::Invalid {
                key: ENV_DIGEST,
                value: value.clone(),
                reason,
            })?;
        }
        if let Some(value) = lookup(ENV_STRICT) {
            config.strict_mutations = parse_flag(ENV_STRICT, &value)?;
        }

        Ok(config)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn digest(&self) -> DigestScheme {
        self.digest
    }

    /// Treat update/delete of zero rows as `ApiError::NotFound`.
    pub fn strict_mutations(&self) -> bool {
        self.strict_mutations
    }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}
