use std::env;

use crate::errors::AppError;

const DEFAULT_DATABASE_URL: &str = "sqlite://kashflow.db";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
/// `actix_web::cookie::Key::from` panics below this length.
const MIN_SESSION_KEY_LEN: usize = 64;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub session_key: Vec<u8>,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let session_key = lookup("SESSION_KEY")
            .ok_or_else(|| AppError::ConfigError("SESSION_KEY is not set".to_owned()))?
            .into_bytes();
        if session_key.len() < MIN_SESSION_KEY_LEN {
            return Err(AppError::ConfigError(format!(
                "SESSION_KEY must be at least {} bytes, got {}",
                MIN_SESSION_KEY_LEN,
                session_key.len()
            )));
        }

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| AppError::ConfigError(format!("PORT {:?} is invalid: {}", raw, e)))?,
            None => DEFAULT_PORT,
        };

        Ok(Config {
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_owned()),
            session_key,
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned()),
            port,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply() {
        let key = "k".repeat(64);
        let config = Config::from_lookup(lookup_from(&[("SESSION_KEY", &key)])).unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn session_key_is_required() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }

    #[test]
    fn short_session_key_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("SESSION_KEY", "short")])).unwrap_err();
        assert!(err.to_string().contains("at least 64 bytes"));
    }

    #[test]
    fn overrides_and_bad_port() {
        let key = "k".repeat(64);
        let config = Config::from_lookup(lookup_from(&[
            ("SESSION_KEY", &key),
            ("DATABASE_URL", "sqlite::memory:"),
            ("PORT", "3000"),
        ]))
        .unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.port, 3000);

        let err =
            Config::from_lookup(lookup_from(&[("SESSION_KEY", &key), ("PORT", "http")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
