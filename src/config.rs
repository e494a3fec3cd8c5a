use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use envconfig::Envconfig;
use thiserror::Error;

#[derive(Envconfig, Clone, Debug)]
pub struct Config {
    #[envconfig(from = "DEBUG_HOST", default = "0.0.0.0")]
    pub host: String,

    #[envconfig(from = "DEBUG_PORT", default = "8084")]
    pub port: u16,

    #[envconfig(from = "SHUTDOWN_TIMEOUT", default = "30s")]
    pub shutdown_timeout: EnvDuration,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Env(#[from] envconfig::Error),

    #[error("invalid bind host: {0}")]
    Host(String),
}

impl Config {
    /// Produce the socket address for the health listener.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = IpAddr::from_str(&self.host).map_err(|_| ConfigError::Host(self.host.clone()))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Duration read from the environment: `500ms`, `30s`, `2m`, or a bare
/// number of seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvDuration(pub Duration);

#[derive(Debug, PartialEq, Eq, Error)]
#[error("invalid duration: {0:?}")]
pub struct ParseEnvDurationError(String);

impl FromStr for EnvDuration {
    type Err = ParseEnvDurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || ParseEnvDurationError(s.to_string());

        let (digits, millis_per_unit) = if let Some(n) = s.strip_suffix("ms") {
            (n, 1)
        } else if let Some(n) = s.strip_suffix('s') {
            (n, 1_000)
        } else if let Some(n) = s.strip_suffix('m') {
            (n, 60_000)
        } else {
            (s, 1_000)
        };

        let value = digits.trim().parse::<u64>().map_err(|_| invalid())?;
        value
            .checked_mul(millis_per_unit)
            .map(|ms| EnvDuration(Duration::from_millis(ms)))
            .ok_or_else(invalid)
    }
}

impl From<EnvDuration> for Duration {
    fn from(value: EnvDuration) -> Self {
        value.0
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
