//! Server configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use typo_royale_transport::DEFAULT_READY_MESSAGE;

/// Port used when `PORT` is unset or invalid.
pub const DEFAULT_PORT: u16 = 3000;

/// Settings for a [`TypoRoyaleServer`](crate::TypoRoyaleServer).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the listener binds to.
    pub bind_addr: String,

    /// Pause between the last score submission of a round and the
    /// automatic advance.
    pub round_advance_delay: Duration,

    /// Close connections that send nothing for this long. `None` keeps
    /// idle connections open indefinitely.
    pub idle_timeout: Option<Duration>,

    /// Body of the plain-HTTP readiness response.
    pub ready_message: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: format!("0.0.0.0:{DEFAULT_PORT}"),
            round_advance_delay: Duration::from_secs(3),
            idle_timeout: None,
            ready_message: DEFAULT_READY_MESSAGE.to_string(),
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by the process environment.
    ///
    /// - `PORT`: listening port on all interfaces
    /// - `IDLE_TIMEOUT_SECS`: idle connection timeout, `0` disables it
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables from `lookup`.
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup("PORT") {
            match raw.trim().parse::<u16>() {
                Ok(port) => config.bind_addr = format!("0.0.0.0:{port}"),
                Err(e) => tracing::warn!(value = %raw, error = %e, "invalid PORT, using default"),
            }
        }

        if let Some(raw) = lookup("IDLE_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(0) => config.idle_timeout = None,
                Ok(secs) => config.idle_timeout = Some(Duration::from_secs(secs)),
                Err(e) => tracing::warn!(
                    value = %raw,
                    error = %e,
                    "invalid IDLE_TIMEOUT_SECS, idle timeout disabled"
                ),
            }
        }

        config
    }
}
