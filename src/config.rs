//! Configuration and settings management
//!
//! Loads settings from config files and environment variables and defines the
//! retry constants used when nothing is configured.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::destination::Destination;
use crate::format::FormatMode;
use crate::message::RetryPolicy;

/// Cumulative recoverable failures before a message is dropped
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Margin added to an active flood-control wait
pub const DEFAULT_THROTTLE_MARGIN_SECS: u64 = 1;
/// Pause after a network error
pub const DEFAULT_NETWORK_BACKOFF_SECS: u64 = 1;

/// Application settings loaded from environment variables
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DispatchSettings {
    /// Telegram Bot API token
    pub telegram_token: String,

    /// Chat id or `@channel` the relay binary sends to
    pub target_chat: Option<String>,

    /// Retry ceiling per message
    #[serde(default = "default_max_retries")]
    pub dispatch_max_retries: u32,
    /// Extra seconds waited after a flood-control deadline
    #[serde(default = "default_throttle_margin_secs")]
    pub dispatch_throttle_margin_secs: u64,
    /// Seconds to pause after a network error
    #[serde(default = "default_network_backoff_secs")]
    pub dispatch_network_backoff_secs: u64,

    /// Rendering mode for relayed text; plain when unset
    #[serde(default = "default_format")]
    pub default_format: Option<FormatMode>,
}

const fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

const fn default_throttle_margin_secs() -> u64 {
    DEFAULT_THROTTLE_MARGIN_SECS
}

const fn default_network_backoff_secs() -> u64 {
    DEFAULT_NETWORK_BACKOFF_SECS
}

#[allow(clippy::unnecessary_wraps)]
const fn default_format() -> Option<FormatMode> {
    Some(FormatMode::Html)
}

/// Builds the layered configuration source.
///
/// # Errors
///
/// Returns a `ConfigError` if a present source cannot be read.
pub fn build_config() -> Result<Config, ConfigError> {
    let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

    Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
        // Not checked into git
        .add_source(File::with_name("config/local").required(false))
        // Eg.. `APP__DISPATCH_MAX_RETRIES=5 ./target/tg-dispatch`
        .add_source(Environment::with_prefix("APP").separator("__").try_parsing(true))
        // Bare env vars; UPPER_SNAKE_CASE maps to snake_case, empty means unset
        .add_source(
            Environment::default()
                .ignore_empty(true)
                .try_parsing(true),
        )
        .build()
}

impl DispatchSettings {
    /// Create new settings by loading from environment and files
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tg_dispatch::config::DispatchSettings;
    ///
    /// let settings = DispatchSettings::new().expect("Failed to load configuration");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails.
    pub fn new() -> Result<Self, ConfigError> {
        build_config()?.try_deserialize()
    }

    /// Retry policy derived from the `dispatch_*` settings
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.dispatch_max_retries,
            throttle_margin: Duration::from_secs(self.dispatch_throttle_margin_secs),
            network_backoff: Duration::from_secs(self.dispatch_network_backoff_secs),
        }
    }

    /// Parsed `target_chat`, if configured and non-blank
    #[must_use]
    pub fn target_destination(&self) -> Option<Destination> {
        self.target_chat
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|s| s.parse().ok())
    }
}
