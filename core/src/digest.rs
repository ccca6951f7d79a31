//! Password digests used for equality lookups against the `users` table.
//!
//! The digest is unsalted and deterministic because login is a single
//! filtered read (`hashed_password=eq.<digest>`). `Md5` matches the rows the
//! existing deployment already stores; `Sha256` is the migration target.

use std::fmt;
use std::str::FromStr;

use md5::Md5;
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DigestScheme {
    #[default]
    Md5,
    Sha256,
}

impl DigestScheme {
    /// Lowercase hex digest of `password`.
    pub fn digest(self, password: &str) -> String {
        match self {
            DigestScheme::Md5 => hex::encode(Md5::digest(password.as_bytes())),
            DigestScheme::Sha256 => hex::encode(Sha256::digest(password.as_bytes())),
        }
    }
}

impl FromStr for DigestScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md5" => Ok(DigestScheme::Md5),
            "sha256" | "sha-256" => Ok(DigestScheme::Sha256),
            other => Err(format!("unknown digest scheme `{other}`")),
        }
    }
}

impl fmt::Display for DigestScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DigestScheme::Md5 => f.write_str("md5"),
            DigestScheme::Sha256 => f.write_str("sha256"),
        }
    }
}
