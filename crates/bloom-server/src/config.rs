use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = lookup("BLOOM_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("BLOOM_JWT_SECRET is unset or still a placeholder; set it in .env");
        }

        let port = match lookup("BLOOM_PORT") {
            Some(raw) => raw.parse().with_context(|| format!("invalid BLOOM_PORT '{raw}'"))?,
            None => 3000,
        };

        Ok(Self {
            host: lookup("BLOOM_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            db_path: lookup("BLOOM_DB_PATH").unwrap_or_else(|| "bloom.db".into()).into(),
            jwt_secret,
        })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply() {
        let config = Config::from_lookup(lookup(&[("BLOOM_JWT_SECRET", "s3cret")])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.db_path, PathBuf::from("bloom.db"));
        assert_eq!(config.addr().unwrap().to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn placeholder_secret_is_rejected() {
        assert!(Config::from_lookup(lookup(&[])).is_err());
        assert!(Config::from_lookup(lookup(&[("BLOOM_JWT_SECRET", "dev-secret-change-me")])).is_err());
    }

    #[test]
    fn bad_port_is_an_error() {
        let result = Config::from_lookup(lookup(&[
            ("BLOOM_JWT_SECRET", "s3cret"),
            ("BLOOM_PORT", "eighty"),
        ]));
        assert!(result.is_err());
    }
}
