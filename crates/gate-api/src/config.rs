//! # Service Configuration
//!
//! Loaded from environment variables at startup:
//!
//! | Variable           | Default     | Meaning                                        |
//! |--------------------|-------------|------------------------------------------------|
//! | `JWT_SECRET`       | (required)  | Current signing secret                         |
//! | `JWT_OLD_SECRETS`  | empty       | Comma-separated retired secrets, newest first  |
//! | `JWT_ISSUER`       | `tokengate` | Issuer written into tokens                     |
//! | `TOKEN_EXPIRES_IN` | `24`        | Token lifetime in whole hours                  |
//! | `PORT`             | `8080`      | HTTP listen port                               |
//! | `USER_DIRECTORY`   | unset       | Path to the JSON user directory                |
//!
//! An empty value is treated the same as an unset one.

use std::fmt;
use std::path::PathBuf;

use gate_token::{TokenConfig, DEFAULT_ISSUER, DEFAULT_LIFETIME_HOURS};
use thiserror::Error;

/// Errors reading configuration from the environment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvConfigError {
    #[error("JWT_SECRET environment variable is required")]
    MissingSecret,

    #[error("invalid {var}: {value:?} ({reason})")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Application configuration.
///
/// Custom `Debug` (via [`TokenConfig`]) redacts secrets.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Token service configuration.
    pub token: TokenConfig,
    /// Optional path to the user directory file.
    pub user_directory: Option<PathBuf>,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("token", &self.token)
            .field("user_directory", &self.user_directory)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, EnvConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, EnvConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let secret = get("JWT_SECRET").ok_or(EnvConfigError::MissingSecret)?;
        let retired_secrets = get("JWT_OLD_SECRETS")
            .map(|raw| parse_secret_list(&raw))
            .unwrap_or_default();
        let issuer = get("JWT_ISSUER").unwrap_or_else(|| DEFAULT_ISSUER.to_string());

        let lifetime_hours = match get("TOKEN_EXPIRES_IN") {
            None => DEFAULT_LIFETIME_HOURS,
            Some(raw) => match raw.parse::<i64>() {
                Ok(h) if h > 0 => h,
                _ => {
                    return Err(EnvConfigError::InvalidValue {
                        var: "TOKEN_EXPIRES_IN",
                        value: raw,
                        reason: "expected a positive whole number of hours",
                    })
                }
            },
        };

        let port = match get("PORT") {
            None => 8080,
            Some(raw) => raw.parse::<u16>().map_err(|_| EnvConfigError::InvalidValue {
                var: "PORT",
                value: raw,
                reason: "expected a TCP port number",
            })?,
        };

        Ok(Self {
            port,
            token: TokenConfig {
                secret,
                retired_secrets,
                issuer,
                lifetime_hours,
            },
            user_directory: get("USER_DIRECTORY").map(PathBuf::from),
        })
    }
}

/// Split a comma-separated secret list, preserving order and skipping blanks.
/// Secrets are not trimmed: whitespace inside a secret is significant.
fn parse_secret_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, EnvConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_apply_with_only_secret() {
        let cfg = load(&[("JWT_SECRET", "s1")]).unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.token.secret, "s1");
        assert!(cfg.token.retired_secrets.is_empty());
        assert_eq!(cfg.token.issuer, "tokengate");
        assert_eq!(cfg.token.lifetime_hours, 24);
        assert!(cfg.user_directory.is_none());
    }

    #[test]
    fn missing_or_empty_secret_is_an_error() {
        assert_eq!(load(&[]).unwrap_err(), EnvConfigError::MissingSecret);
        assert_eq!(
            load(&[("JWT_SECRET", "")]).unwrap_err(),
            EnvConfigError::MissingSecret
        );
    }

    #[test]
    fn old_secrets_keep_order_and_skip_blanks() {
        let cfg = load(&[("JWT_SECRET", "s3"), ("JWT_OLD_SECRETS", "s2,,s1,")]).unwrap();
        assert_eq!(cfg.token.retired_secrets, vec!["s2", "s1"]);
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = load(&[
            ("JWT_SECRET", "s"),
            ("JWT_ISSUER", "svc"),
            ("TOKEN_EXPIRES_IN", "1"),
            ("PORT", "9000"),
            ("USER_DIRECTORY", "/etc/gate/users.json"),
        ])
        .unwrap();
        assert_eq!(cfg.token.issuer, "svc");
        assert_eq!(cfg.token.lifetime_hours, 1);
        assert_eq!(cfg.port, 9000);
        assert_eq!(
            cfg.user_directory,
            Some(PathBuf::from("/etc/gate/users.json"))
        );
    }

    #[test]
    fn invalid_lifetime_rejected() {
        for bad in ["0", "-3", "1.5", "a day"] {
            let err = load(&[("JWT_SECRET", "s"), ("TOKEN_EXPIRES_IN", bad)]).unwrap_err();
            assert!(
                matches!(err, EnvConfigError::InvalidValue { var: "TOKEN_EXPIRES_IN", .. }),
                "input {bad:?}"
            );
        }
    }

    #[test]
    fn oversized_lifetime_fails_service_startup() {
        let cfg = load(&[("JWT_SECRET", "s"), ("TOKEN_EXPIRES_IN", "9999999999999")]).unwrap();
        assert_eq!(cfg.token.lifetime_hours, 9_999_999_999_999);

        let err = gate_token::TokenService::new(cfg.token).unwrap_err();
        assert_eq!(
            err,
            gate_token::ConfigError::InvalidLifetime {
                hours: 9_999_999_999_999
            }
        );
    }

    #[test]
    fn invalid_port_rejected() {
        let err = load(&[("JWT_SECRET", "s"), ("PORT", "70000")]).unwrap_err();
        assert!(matches!(err, EnvConfigError::InvalidValue { var: "PORT", .. }));
    }

    #[test]
    fn debug_redacts_secret() {
        let cfg = load(&[("JWT_SECRET", "very-secret"), ("JWT_OLD_SECRETS", "older")]).unwrap();
        let out = format!("{cfg:?}");
        assert!(!out.contains("very-secret"));
        assert!(!out.contains("older"));
    }
}
