// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once at startup. Any error
//! here is fatal: the server must not start without a usable signing secret.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `WEBOOK_JWT_SECRET` | HS256 signing secret | Required |
//! | `WEBOOK_TOKEN_TTL_SECS` | Token lifetime in seconds, at most one year | `7200` |
//! | `WEBOOK_SESSION_TTL_SECS` | Legacy session lifetime in seconds, at most one year | `86400` |
//! | `WEBOOK_SESSION_COOKIE` | Legacy session cookie name | `webook_session` |
//! | `WEBOOK_AUTH_MODE` | `jwt` or `session` | `jwt` |
//! | `WEBOOK_EXEMPT_PATHS` | Comma-separated paths that skip auth | signup and login routes |
//! | `WEBOOK_CORS_ORIGINS` | Comma-separated extra CORS origins | empty |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::str::FromStr;

use chrono::Duration;

use crate::auth::session::DEFAULT_SESSION_COOKIE;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const JWT_SECRET_ENV: &str = "WEBOOK_JWT_SECRET";
pub const TOKEN_TTL_ENV: &str = "WEBOOK_TOKEN_TTL_SECS";
pub const SESSION_TTL_ENV: &str = "WEBOOK_SESSION_TTL_SECS";
pub const SESSION_COOKIE_ENV: &str = "WEBOOK_SESSION_COOKIE";
pub const AUTH_MODE_ENV: &str = "WEBOOK_AUTH_MODE";
pub const EXEMPT_PATHS_ENV: &str = "WEBOOK_EXEMPT_PATHS";
pub const CORS_ORIGINS_ENV: &str = "WEBOOK_CORS_ORIGINS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 2 * 60 * 60;
pub const DEFAULT_SESSION_TTL_SECS: i64 = 24 * 60 * 60;
/// Upper bound for token and session lifetimes.
pub const MAX_TTL_SECS: i64 = 366 * 24 * 60 * 60;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Routes reachable without a credential.
pub const DEFAULT_EXEMPT_PATHS: &[&str] = &["/users/signup", "/users/login", "/users/login/session"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("signing secret must not be empty")]
    EmptySecret,
    #[error("{var} has invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Which credential the gate verifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// Stateless HS256 bearer tokens
    #[default]
    Jwt,
    /// Legacy server-side sessions keyed by cookie
    Session,
}

impl FromStr for AuthMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "jwt" => Ok(AuthMode::Jwt),
            "session" => Ok(AuthMode::Session),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for AuthMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthMode::Jwt => write!(f, "jwt"),
            AuthMode::Session => write!(f, "session"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Settings consumed by the auth gate and the login endpoints.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthSettings {
    pub mode: AuthMode,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub session_ttl: Duration,
    pub session_cookie: String,
    pub exempt_paths: Vec<String>,
}

impl AuthSettings {
    /// Defaults for everything except the secret.
    pub fn with_secret(jwt_secret: impl Into<String>) -> Self {
        Self {
            mode: AuthMode::Jwt,
            jwt_secret: jwt_secret.into(),
            token_ttl: Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
            session_ttl: Duration::seconds(DEFAULT_SESSION_TTL_SECS),
            session_cookie: DEFAULT_SESSION_COOKIE.to_string(),
            exempt_paths: DEFAULT_EXEMPT_PATHS.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn with_mode(mut self, mode: AuthMode) -> Self {
        self.mode = mode;
        self
    }
}

// The secret stays out of logs.
impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("mode", &self.mode)
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("session_ttl", &self.session_ttl)
            .field("session_cookie", &self.session_cookie)
            .field("exempt_paths", &self.exempt_paths)
            .finish()
    }
}

/// Full process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
    pub cors_origins: Vec<String>,
    pub auth: AuthSettings,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup(JWT_SECRET_ENV).ok_or(ConfigError::Missing(JWT_SECRET_ENV))?;
        if jwt_secret.trim().is_empty() {
            return Err(ConfigError::EmptySecret);
        }

        let mode = match lookup(AUTH_MODE_ENV) {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                var: AUTH_MODE_ENV,
                value,
                reason: "expected 'jwt' or 'session'",
            })?,
            None => AuthMode::default(),
        };

        let port = match lookup(PORT_ENV) {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                var: PORT_ENV,
                value,
                reason: "expected a port number",
            })?,
            None => DEFAULT_PORT,
        };

        let log_format = match lookup(LOG_FORMAT_ENV).as_deref().map(str::trim) {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        let exempt_paths = match lookup(EXEMPT_PATHS_ENV) {
            Some(value) => split_list(&value),
            None => DEFAULT_EXEMPT_PATHS.iter().map(|p| p.to_string()).collect(),
        };

        Ok(Self {
            host: lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            log_format,
            cors_origins: lookup(CORS_ORIGINS_ENV)
                .map(|v| split_list(&v))
                .unwrap_or_default(),
            auth: AuthSettings {
                mode,
                jwt_secret,
                token_ttl: ttl(&lookup, TOKEN_TTL_ENV, DEFAULT_TOKEN_TTL_SECS)?,
                session_ttl: ttl(&lookup, SESSION_TTL_ENV, DEFAULT_SESSION_TTL_SECS)?,
                session_cookie: lookup(SESSION_COOKIE_ENV)
                    .filter(|v| !v.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_SESSION_COOKIE.to_string()),
                exempt_paths,
            },
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn ttl<F>(lookup: &F, var: &'static str, default_secs: i64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(var) else {
        return Ok(Duration::seconds(default_secs));
    };

    match value.trim().parse::<i64>() {
        Ok(secs) if secs > MAX_TTL_SECS => Err(ConfigError::Invalid {
            var,
            value,
            reason: "lifetime exceeds one year",
        }),
        Ok(secs) if secs > 0 => Ok(Duration::seconds(secs)),
        _ => Err(ConfigError::Invalid {
            var,
            value,
            reason: "expected a positive number of seconds",
        }),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config = config(&[(JWT_SECRET_ENV, "AllYourBase")]).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.auth.mode, AuthMode::Jwt);
        assert_eq!(config.auth.token_ttl, Duration::hours(2));
        assert_eq!(config.auth.session_ttl, Duration::hours(24));
        assert_eq!(config.auth.session_cookie, "webook_session");
        assert_eq!(
            config.auth.exempt_paths,
            ["/users/signup", "/users/login", "/users/login/session"]
        );
        assert!(config.cors_origins.is_empty());
    }

    #[test]
    fn missing_or_blank_secret_is_fatal() {
        assert_eq!(config(&[]), Err(ConfigError::Missing(JWT_SECRET_ENV)));
        assert_eq!(config(&[(JWT_SECRET_ENV, "  ")]), Err(ConfigError::EmptySecret));
    }

    #[test]
    fn parses_overrides() {
        let config = config(&[
            (JWT_SECRET_ENV, "s3cret"),
            (HOST_ENV, "127.0.0.1"),
            (PORT_ENV, "9000"),
            (TOKEN_TTL_ENV, "60"),
            (AUTH_MODE_ENV, "Session"),
            (EXEMPT_PATHS_ENV, " /a, /b ,,/c"),
            (CORS_ORIGINS_ENV, "https://webook.example.com"),
            (LOG_FORMAT_ENV, "json"),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:9000");
        assert_eq!(config.auth.token_ttl, Duration::seconds(60));
        assert_eq!(config.auth.mode, AuthMode::Session);
        assert_eq!(config.auth.exempt_paths, ["/a", "/b", "/c"]);
        assert_eq!(config.cors_origins, ["https://webook.example.com"]);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn rejects_non_positive_ttl() {
        for bad in ["0", "-5", "two hours"] {
            let result = config(&[(JWT_SECRET_ENV, "s"), (TOKEN_TTL_ENV, bad)]);
            assert!(
                matches!(result, Err(ConfigError::Invalid { var: TOKEN_TTL_ENV, .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_ttl_beyond_one_year() {
        for var in [TOKEN_TTL_ENV, SESSION_TTL_ENV] {
            let result = config(&[(JWT_SECRET_ENV, "s"), (var, "100000000000000")]);
            assert!(
                matches!(result, Err(ConfigError::Invalid { var: v, .. }) if v == var),
                "{var} should be rejected"
            );
        }

        let max = MAX_TTL_SECS.to_string();
        let config = config(&[(JWT_SECRET_ENV, "s"), (TOKEN_TTL_ENV, &max)]).unwrap();
        assert_eq!(config.auth.token_ttl, Duration::seconds(MAX_TTL_SECS));
    }

    #[test]
    fn rejects_unknown_mode_and_bad_port() {
        let result = config(&[(JWT_SECRET_ENV, "s"), (AUTH_MODE_ENV, "oauth")]);
        assert!(matches!(result, Err(ConfigError::Invalid { var: AUTH_MODE_ENV, .. })));

        let result = config(&[(JWT_SECRET_ENV, "s"), (PORT_ENV, "http")]);
        assert!(matches!(result, Err(ConfigError::Invalid { var: PORT_ENV, .. })));
    }

    #[test]
    fn debug_redacts_secret() {
        let settings = AuthSettings::with_secret("AllYourBase");
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("AllYourBase"));
        assert!(rendered.contains("<redacted>"));
    }
}
