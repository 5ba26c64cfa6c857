//! Connector configuration and its validation.
//!
//! # Design
//! `ConnectorConfig` is the raw, deserialized asset configuration.
//! `ConnectorConfig::validate` turns it into `Settings`, the immutable form
//! the dispatcher works with. Validation checks the base URL shape, refuses
//! targets that resolve into 127.0.0.0/8 and parses the timeout.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, ToSocketAddrs};
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::{Host, Url};

use crate::error::ConfigError;

pub const DEFAULT_TOKEN_NAME: &str = "ph-auth-token";

fn default_token_name() -> String {
    DEFAULT_TOKEN_NAME.to_string()
}

/// Asset configuration as supplied by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectorConfig {
    pub base_url: String,
    #[serde(default = "default_token_name")]
    pub auth_token_name: String,
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub test_path: Option<String>,
    /// Seconds, as a JSON number or a numeric string.
    #[serde(default)]
    pub timeout: Option<Value>,
}

impl ConnectorConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        ConnectorConfig {
            base_url: base_url.into(),
            auth_token_name: default_token_name(),
            auth_token: None,
            username: None,
            password: None,
            test_path: None,
            timeout: None,
        }
    }

    pub fn validate(&self) -> Result<Settings, ConfigError> {
        let base_url = self.base_url.trim_matches('/').to_string();

        let parsed = Url::parse(&base_url).map_err(|_| ConfigError::InvalidBaseUrl(base_url.clone()))?;
        let host = match parsed.host() {
            Some(Host::Domain("")) | None => return Err(ConfigError::InvalidBaseUrl(base_url)),
            Some(host) => host,
        };
        if resolves_to_loopback(&host) {
            return Err(ConfigError::LoopbackTarget);
        }

        let test_path = self.test_path.as_deref().map(ensure_leading_slash);
        let timeout = self.timeout.as_ref().map(parse_timeout).transpose()?;

        Ok(Settings {
            base_url,
            test_path,
            timeout,
            auth: self.auth(),
        })
    }

    fn auth(&self) -> Auth {
        if let Some(token) = self.auth_token.as_deref().filter(|t| !t.is_empty()) {
            return Auth::Token {
                header: self.auth_token_name.clone(),
                value: token.to_string(),
            };
        }
        if let Some(username) = self.username.as_deref().filter(|u| !u.is_empty()) {
            return Auth::Basic {
                username: username.to_string(),
                password: self.password.clone().unwrap_or_default(),
            };
        }
        Auth::None
    }
}

/// Credential injection mode. Token auth wins over basic auth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    None,
    Token { header: String, value: String },
    Basic { username: String, password: String },
}

/// Validated, immutable connector settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Scheme, host and optional path, without leading or trailing `/`.
    pub base_url: String,
    /// Always starts with `/` when present.
    pub test_path: Option<String>,
    pub timeout: Option<Duration>,
    pub auth: Auth,
}

impl Settings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Settings {
            base_url: base_url.into(),
            test_path: None,
            timeout: None,
            auth: Auth::None,
        }
    }
}

pub fn ensure_leading_slash(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// True when `host` is, or resolves first to, an IPv4 address in
/// 127.0.0.0/8. Hosts that fail to resolve are not considered loopback.
pub fn resolves_to_loopback(host: &Host<&str>) -> bool {
    let address = match host {
        Host::Ipv4(ip) => Some(*ip),
        Host::Ipv6(_) => None,
        Host::Domain(name) => first_ipv4(name),
    };
    address.is_some_and(|ip| ip.octets()[0] == 127)
}

fn first_ipv4(name: &str) -> Option<Ipv4Addr> {
    match (name, 0).to_socket_addrs() {
        Ok(addrs) => addrs
            .map(|addr: SocketAddr| addr.ip())
            .find_map(|ip| match ip {
                IpAddr::V4(v4) => Some(v4),
                IpAddr::V6(_) => None,
            }),
        Err(err) => {
            debug!(host = name, error = %err, "hostname did not resolve");
            None
        }
    }
}

fn parse_timeout(value: &Value) -> Result<Duration, ConfigError> {
    let seconds = match value {
        Value::Number(number) => match number.as_u64() {
            Some(seconds) => Some(seconds),
            None => number
                .as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f.trunc() as u64),
        },
        Value::String(text) => text.trim().parse::<u64>().ok(),
        _ => None,
    };
    seconds
        .map(Duration::from_secs)
        .ok_or(ConfigError::InvalidTimeout)
}
