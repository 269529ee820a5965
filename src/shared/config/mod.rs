//! Application configuration
//!
//! `AppConfig` is deserializable from TOML (every field has a default) and
//! can be assembled with `AppConfig::builder()`. The server overlays
//! environment variables on top, see `backend::server::config`.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Secret used when none is configured outside production
pub const DEV_JWT_SECRET: &str = "taskhub-dev-secret-change-me";

/// Deployment mode; production switches cookies to `Secure; SameSite=None`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Deployment {
    #[default]
    Development,
    Production,
}

impl Deployment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// What the hub does when a subscriber's outbound queue is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Discard the oldest queued message to make room
    #[default]
    DropOldest,
    /// Close the subscriber
    Disconnect,
}

impl std::str::FromStr for OverflowPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "drop_oldest" => Ok(Self::DropOldest),
            "disconnect" => Ok(Self::Disconnect),
            other => Err(ConfigError::Invalid("HUB_OVERFLOW", other.to_string())),
        }
    }
}

/// Broadcast hub tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Per-subscriber outbound queue length
    pub subscriber_capacity: usize,
    pub overflow: OverflowPolicy,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            subscriber_capacity: 256,
            overflow: OverflowPolicy::DropOldest,
        }
    }
}

/// Which routes require a verified session.
///
/// Revisions of the web client disagree on whether creating and reordering
/// tasks needs a session, so those are switches. The rest are fixed by the API
/// contract but still declared here so the router reads one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteAuthTable {
    pub create_task: bool,
    pub list_tasks: bool,
    pub update_task: bool,
    pub delete_task: bool,
    pub reorder_tasks: bool,
    pub create_user: bool,
    pub user_role: bool,
    pub live_updates: bool,
}

impl Default for RouteAuthTable {
    fn default() -> Self {
        Self {
            create_task: true,
            list_tasks: true,
            update_task: true,
            delete_task: true,
            reorder_tasks: true,
            create_user: false,
            user_role: true,
            live_updates: false,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub port: u16,
    pub deployment: Deployment,
    pub jwt_secret: String,
    pub session_cookie: String,
    /// Session lifetime in seconds
    pub session_ttl_secs: u64,
    pub cors_origins: Vec<String>,
    pub database_url: Option<String>,
    /// Upper bound on a single store call, in milliseconds
    pub store_timeout_ms: u64,
    pub hub: HubConfig,
    pub routes: RouteAuthTable,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            deployment: Deployment::Development,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            session_cookie: "token".to_string(),
            session_ttl_secs: 24 * 60 * 60,
            cors_origins: vec!["http://localhost:5173".to_string()],
            database_url: None,
            store_timeout_ms: 5_000,
            hub: HubConfig::default(),
            routes: RouteAuthTable::default(),
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::MissingValue("JWT_SECRET"));
        }
        if self.deployment.is_production() && self.jwt_secret == DEV_JWT_SECRET {
            return Err(ConfigError::MissingValue("JWT_SECRET"));
        }
        if self.session_cookie.is_empty() {
            return Err(ConfigError::MissingValue("session_cookie"));
        }
        if self.hub.subscriber_capacity == 0 {
            return Err(ConfigError::Invalid("HUB_SUBSCRIBER_CAPACITY", "0".to_string()));
        }
        if self.store_timeout_ms == 0 {
            return Err(ConfigError::Invalid("STORE_TIMEOUT_MS", "0".to_string()));
        }
        Ok(())
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn deployment(mut self, deployment: Deployment) -> Self {
        self.config.deployment = deployment;
        self
    }

    pub fn jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.jwt_secret = secret.into();
        self
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.config.database_url = Some(url.into());
        self
    }

    pub fn store_timeout_ms(mut self, millis: u64) -> Self {
        self.config.store_timeout_ms = millis;
        self
    }

    pub fn hub(mut self, hub: HubConfig) -> Self {
        self.config.hub = hub;
        self
    }

    pub fn routes(mut self, routes: RouteAuthTable) -> Self {
        self.config.routes = routes;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("failed to parse config file: {0}")]
    Parse(String),
}
