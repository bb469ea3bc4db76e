use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub snapshot_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = get("HUDDLE_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("HUDDLE_JWT_SECRET is unset or still a placeholder; set it in your .env file");
        }

        let db_path = get("HUDDLE_DB_PATH").unwrap_or_else(|| "huddle.db".into()).into();
        let host = get("HUDDLE_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = get("HUDDLE_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("HUDDLE_PORT must be a port number")?;
        let snapshot_interval_secs: u64 = get("HUDDLE_SNAPSHOT_INTERVAL_SECS")
            .unwrap_or_else(|| "5".into())
            .parse()
            .context("HUDDLE_SNAPSHOT_INTERVAL_SECS must be a whole number of seconds")?;

        Ok(Self {
            jwt_secret,
            db_path,
            host,
            port,
            snapshot_interval_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_the_secret_is_set() {
        let config = Config::from_lookup(lookup(&[("HUDDLE_JWT_SECRET", "s3cret")])).unwrap();
        assert_eq!(config.db_path, PathBuf::from("huddle.db"));
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.snapshot_interval_secs, 5);
    }

    #[test]
    fn placeholder_or_missing_secret_is_fatal() {
        assert!(Config::from_lookup(lookup(&[])).is_err());
        assert!(Config::from_lookup(lookup(&[("HUDDLE_JWT_SECRET", "dev-secret-change-me")])).is_err());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_lookup(lookup(&[
            ("HUDDLE_JWT_SECRET", "s3cret"),
            ("HUDDLE_PORT", "8080"),
            ("HUDDLE_SNAPSHOT_INTERVAL_SECS", "30"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.snapshot_interval_secs, 30);

        assert!(Config::from_lookup(lookup(&[("HUDDLE_JWT_SECRET", "s"), ("HUDDLE_PORT", "nope")])).is_err());
    }
}
