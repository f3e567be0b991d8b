// Application configuration, loaded from environment variables and CLI flags.

use std::time::Duration;

use thiserror::Error;

use crate::retry::RetryPolicy;

/// Error raised while loading configuration. Always fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    MissingVar(&'static str),
    #[error("invalid value for {name}: {value:?}")]
    InvalidVar { name: &'static str, value: String },
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Document store connection string. Required.
    pub mongodb_uri: String,
    /// Database name within the store.
    pub database: String,
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Cap on list responses. `None` means unbounded.
    pub list_limit: Option<i64>,
    /// Retry policy applied to list reads.
    pub retry: RetryPolicy,
    /// Server selection timeout for the store client, if set.
    pub connect_timeout: Option<Duration>,
}

impl Config {
    /// Load configuration from environment variables and CLI arguments.
    /// A `.env` file in the working directory is honored if present.
    ///
    /// Environment variables:
    /// - `MONGODB_URI` - document store connection string (required)
    /// - `MONGODB_DATABASE` - database name (default: `multimedia_db`)
    /// - `PORT` - HTTP server port (default: 3000)
    /// - `LIST_LIMIT` - max documents per list response, 0 = unbounded (default: 10)
    /// - `RETRY_MAX_ATTEMPTS` - read attempts before giving up (default: 3)
    /// - `RETRY_DELAY_MS` - pause between read attempts (default: 500)
    /// - `CONNECT_TIMEOUT_MS` - store server selection timeout (default: driver default)
    ///
    /// CLI flags:
    /// - `--port <PORT>` - override the port
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let args: Vec<String> = std::env::args().collect();

        let mongodb_uri =
            std::env::var("MONGODB_URI").map_err(|_| ConfigError::MissingVar("MONGODB_URI"))?;

        let database = std::env::var("MONGODB_DATABASE")
            .unwrap_or_else(|_| "multimedia_db".to_string());

        // Port: CLI flag --port takes precedence, then env var, then default
        let port = match Self::parse_cli_value(&args, "--port") {
            Some(v) => v.parse().map_err(|_| ConfigError::InvalidVar {
                name: "--port",
                value: v,
            })?,
            None => env_parse("PORT")?.unwrap_or(3000),
        };

        let list_limit = normalize_limit(env_parse("LIST_LIMIT")?.unwrap_or(10));

        let retry = RetryPolicy {
            max_attempts: env_parse("RETRY_MAX_ATTEMPTS")?.unwrap_or(3),
            delay: Duration::from_millis(env_parse("RETRY_DELAY_MS")?.unwrap_or(500)),
        };

        let connect_timeout = env_parse("CONNECT_TIMEOUT_MS")?.map(Duration::from_millis);

        Ok(Config {
            mongodb_uri,
            database,
            port,
            list_limit,
            retry,
            connect_timeout,
        })
    }

    /// Parse a CLI flag value like `--port 8080`.
    fn parse_cli_value(args: &[String], flag: &str) -> Option<String> {
        args.windows(2).find_map(|pair| {
            if pair[0] == flag {
                Some(pair[1].clone())
            } else {
                None
            }
        })
    }
}

/// Read and parse an optional environment variable.
fn env_parse<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidVar { name, value: raw }),
        Err(_) => Ok(None),
    }
}

/// A non-positive cap disables the limit entirely.
fn normalize_limit(cap: i64) -> Option<i64> {
    if cap > 0 {
        Some(cap)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cli_value() {
        let args: Vec<String> = ["media-vault", "--port", "8080"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            Config::parse_cli_value(&args, "--port"),
            Some("8080".to_string())
        );
        assert_eq!(Config::parse_cli_value(&args, "--missing"), None);
    }

    #[test]
    fn test_normalize_limit() {
        assert_eq!(normalize_limit(10), Some(10));
        assert_eq!(normalize_limit(1), Some(1));
        assert_eq!(normalize_limit(0), None);
        assert_eq!(normalize_limit(-5), None);
    }
}
