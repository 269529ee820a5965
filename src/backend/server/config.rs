/**
 * Server Configuration
 *
 * Loads `AppConfig` and opens the stores it names.
 *
 * # Configuration Sources
 *
 * Later sources win:
 *
 * 1. Built-in defaults
 * 2. TOML file at `TASKHUB_CONFIG`, if set
 * 3. Environment variables (`.env` is loaded by the binary)
 *
 * | Variable                  | Field                      |
 * |---------------------------|----------------------------|
 * | `SERVER_PORT`             | `port`                     |
 * | `APP_ENV`                 | `deployment`               |
 * | `JWT_SECRET`              | `jwt_secret`               |
 * | `DATABASE_URL`            | `database_url`             |
 * | `CORS_ORIGINS`            | `cors_origins` (comma list)|
 * | `STORE_TIMEOUT_MS`        | `store_timeout_ms`         |
 * | `HUB_SUBSCRIBER_CAPACITY` | `hub.subscriber_capacity`  |
 * | `HUB_OVERFLOW`            | `hub.overflow`             |
 * | `AUTH_CREATE_TASK`        | `routes.create_task`       |
 * | `AUTH_REORDER_TASKS`      | `routes.reorder_tasks`     |
 * | `AUTH_LIVE_UPDATES`       | `routes.live_updates`      |
 *
 * # Database
 *
 * Without `DATABASE_URL`, or if connecting fails, the server runs on the
 * in-memory stores and says so in the log.
 */

use sqlx::PgPool;
use std::str::FromStr;
use std::sync::Arc;

use crate::backend::store::{MemoryTaskStore, MemoryUserStore, PgTaskStore, PgUserStore, TaskStore, UserStore};
use crate::shared::config::{AppConfig, ConfigError, Deployment, OverflowPolicy};

/// Path of the optional TOML config file
pub const CONFIG_PATH_VAR: &str = "TASKHUB_CONFIG";

/// Load configuration from file and environment, then validate it
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let mut config = match std::env::var(CONFIG_PATH_VAR) {
        Ok(path) => {
            let source = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::Parse(format!("{}: {}", path, e)))?;
            tracing::info!("Loaded configuration file {}", path);
            AppConfig::from_toml_str(&source)?
        }
        Err(_) => AppConfig::default(),
    };

    apply_env(&mut config)?;
    config.validate()?;
    Ok(config)
}

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parse_env<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    env(name)
        .map(|raw| raw.trim().parse::<T>().map_err(|_| ConfigError::Invalid(name, raw)))
        .transpose()
}

fn parse_flag(name: &'static str) -> Result<Option<bool>, ConfigError> {
    env(name)
        .map(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid(name, raw)),
        })
        .transpose()
}

/// Overlay environment variables onto `config`
pub fn apply_env(config: &mut AppConfig) -> Result<(), ConfigError> {
    if let Some(port) = parse_env::<u16>("SERVER_PORT")? {
        config.port = port;
    }
    if let Some(mode) = env("APP_ENV") {
        config.deployment = match mode.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Deployment::Production,
            _ => Deployment::Development,
        };
    }
    if let Some(secret) = env("JWT_SECRET") {
        config.jwt_secret = secret;
    }
    if let Some(url) = env("DATABASE_URL") {
        config.database_url = Some(url);
    }
    if let Some(origins) = env("CORS_ORIGINS") {
        config.cors_origins = origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();
    }
    if let Some(millis) = parse_env::<u64>("STORE_TIMEOUT_MS")? {
        config.store_timeout_ms = millis;
    }
    if let Some(capacity) = parse_env::<usize>("HUB_SUBSCRIBER_CAPACITY")? {
        config.hub.subscriber_capacity = capacity;
    }
    if let Some(raw) = env("HUB_OVERFLOW") {
        config.hub.overflow = raw.parse::<OverflowPolicy>()?;
    }
    if let Some(flag) = parse_flag("AUTH_CREATE_TASK")? {
        config.routes.create_task = flag;
    }
    if let Some(flag) = parse_flag("AUTH_REORDER_TASKS")? {
        config.routes.reorder_tasks = flag;
    }
    if let Some(flag) = parse_flag("AUTH_LIVE_UPDATES")? {
        config.routes.live_updates = flag;
    }
    Ok(())
}

/// Task and user stores chosen by configuration
pub type Stores = (Arc<dyn TaskStore>, Arc<dyn UserStore>);

/// Open the PostgreSQL stores, or fall back to memory
pub async fn load_stores(config: &AppConfig) -> Stores {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set. Tasks and users are kept in memory only.");
        return memory_stores();
    };

    tracing::info!("Connecting to database...");
    let pool = match PgPool::connect(database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {:?}", e);
            tracing::warn!("Falling back to in-memory stores.");
            return memory_stores();
        }
    };

    tracing::info!("Running database migrations...");
    if let Err(e) = sqlx::migrate!().run(&pool).await {
        tracing::error!("Failed to run database migrations: {}", e);
        tracing::warn!("Continuing without migrations - database might not be up to date");
    }

    (
        Arc::new(PgTaskStore::new(pool.clone())),
        Arc::new(PgUserStore::new(pool)),
    )
}

fn memory_stores() -> Stores {
    (Arc::new(MemoryTaskStore::new()), Arc::new(MemoryUserStore::new()))
}
