// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup and fails
//! fast on invalid values.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Directory holding `users.redb` | `/data` |
//! | `MINT_SERVICE_URL` | Mint service endpoint; minting disabled when unset | Optional |
//! | `MINT_SERVICE_TOKEN` | Bearer token sent to the mint service | Optional |
//! | `MINT_TIMEOUT_SECS` | Mint request timeout | `15` |
//! | `COOKIE_SECURE` | Add `Secure` to the identity cookie | `true` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | Serve HTTPS when both are set | Optional |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Environment variable name for the data directory.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Default data directory.
pub const DEFAULT_DATA_DIR: &str = "/data";

/// File name of the user database inside the data directory.
pub const DATABASE_FILE: &str = "users.redb";

/// Environment variable name for the server bind address.
pub const HOST_ENV: &str = "HOST";

/// Default bind address (all interfaces).
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Environment variable name for the server port.
pub const PORT_ENV: &str = "PORT";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8080;

/// Environment variable name for the mint service endpoint.
pub const MINT_SERVICE_URL_ENV: &str = "MINT_SERVICE_URL";

/// Environment variable name for the mint service bearer token.
pub const MINT_SERVICE_TOKEN_ENV: &str = "MINT_SERVICE_TOKEN";

/// Environment variable name for the mint request timeout (seconds).
pub const MINT_TIMEOUT_SECS_ENV: &str = "MINT_TIMEOUT_SECS";

/// Default mint request timeout.
pub const DEFAULT_MINT_TIMEOUT_SECS: u64 = 15;

/// Environment variable name for the cookie `Secure` flag.
///
/// Only disable for plain-HTTP local development.
pub const COOKIE_SECURE_ENV: &str = "COOKIE_SECURE";

/// Environment variable names for TLS material (PEM files).
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";

/// Environment variable name for the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default `RUST_LOG` filter.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} is not valid: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("{0} and {1} must be set together")]
    Incomplete(&'static str, &'static str),
}

impl ConfigError {
    fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            name,
            reason: reason.into(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Mint service connection settings.
#[derive(Clone)]
pub struct MintServiceConfig {
    pub url: Url,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl fmt::Debug for MintServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MintServiceConfig")
            .field("url", &self.url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsConfig {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub mint: Option<MintServiceConfig>,
    pub cookie_secure: bool,
    pub tls: Option<TlsConfig>,
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match get(PORT_ENV) {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| ConfigError::invalid(PORT_ENV, e.to_string()))?,
            None => DEFAULT_PORT,
        };

        let data_dir = PathBuf::from(get(DATA_DIR_ENV).unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()));

        let timeout = match get(MINT_TIMEOUT_SECS_ENV) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(0) => return Err(ConfigError::invalid(MINT_TIMEOUT_SECS_ENV, "must be positive")),
                Ok(secs) => Duration::from_secs(secs),
                Err(e) => return Err(ConfigError::invalid(MINT_TIMEOUT_SECS_ENV, e.to_string())),
            },
            None => Duration::from_secs(DEFAULT_MINT_TIMEOUT_SECS),
        };

        let mint = match get(MINT_SERVICE_URL_ENV) {
            Some(raw) => {
                let url = Url::parse(&raw)
                    .map_err(|e| ConfigError::invalid(MINT_SERVICE_URL_ENV, e.to_string()))?;
                if !matches!(url.scheme(), "http" | "https") {
                    return Err(ConfigError::invalid(
                        MINT_SERVICE_URL_ENV,
                        "scheme must be http or https",
                    ));
                }
                Some(MintServiceConfig {
                    url,
                    token: get(MINT_SERVICE_TOKEN_ENV),
                    timeout,
                })
            }
            None => None,
        };

        let cookie_secure = match get(COOKIE_SECURE_ENV) {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                ConfigError::invalid(COOKIE_SECURE_ENV, format!("expected true or false, got {raw}"))
            })?,
            None => true,
        };

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsConfig {
                cert_path: PathBuf::from(cert),
                key_path: PathBuf::from(key),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::Incomplete(TLS_CERT_PATH_ENV, TLS_KEY_PATH_ENV)),
        };

        let log_format = match get(LOG_FORMAT_ENV).as_deref() {
            Some("json") => LogFormat::Json,
            Some("pretty") | None => LogFormat::Pretty,
            Some(other) => {
                return Err(ConfigError::invalid(
                    LOG_FORMAT_ENV,
                    format!("expected json or pretty, got {other}"),
                ))
            }
        };

        Ok(Self {
            host,
            port,
            data_dir,
            mint,
            cookie_secure,
            tls,
            log_format,
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::invalid(HOST_ENV, e.to_string()))
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = load(&[]).unwrap();

        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.database_path(), PathBuf::from("/data/users.redb"));
        assert!(config.mint.is_none());
        assert!(config.cookie_secure);
        assert!(config.tls.is_none());
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(
            config.bind_addr().unwrap(),
            "0.0.0.0:8080".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn mint_service_is_parsed() {
        let config = load(&[
            (MINT_SERVICE_URL_ENV, "https://mint.example/api/mint"),
            (MINT_SERVICE_TOKEN_ENV, "secret"),
            (MINT_TIMEOUT_SECS_ENV, "5"),
        ])
        .unwrap();

        let mint = config.mint.unwrap();
        assert_eq!(mint.url.as_str(), "https://mint.example/api/mint");
        assert_eq!(mint.token.as_deref(), Some("secret"));
        assert_eq!(mint.timeout, Duration::from_secs(5));
        assert!(!format!("{mint:?}").contains("secret"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(load(&[(PORT_ENV, "eighty")]).is_err());
        assert!(load(&[(MINT_SERVICE_URL_ENV, "not a url")]).is_err());
        assert!(load(&[(MINT_SERVICE_URL_ENV, "ftp://mint.example")]).is_err());
        assert!(load(&[(MINT_TIMEOUT_SECS_ENV, "0")]).is_err());
        assert!(load(&[(COOKIE_SECURE_ENV, "maybe")]).is_err());
        assert!(load(&[(LOG_FORMAT_ENV, "xml")]).is_err());
    }

    #[test]
    fn tls_paths_must_come_together() {
        assert_eq!(
            load(&[(TLS_CERT_PATH_ENV, "/certs/cert.pem")]).unwrap_err(),
            ConfigError::Incomplete(TLS_CERT_PATH_ENV, TLS_KEY_PATH_ENV)
        );

        let config = load(&[
            (TLS_CERT_PATH_ENV, "/certs/cert.pem"),
            (TLS_KEY_PATH_ENV, "/certs/key.pem"),
        ])
        .unwrap();
        assert!(config.tls.is_some());
    }

    #[test]
    fn empty_values_count_as_unset() {
        let config = load(&[(MINT_SERVICE_URL_ENV, "  "), (COOKIE_SECURE_ENV, "false")]).unwrap();
        assert!(config.mint.is_none());
        assert!(!config.cookie_secure);
    }
}
