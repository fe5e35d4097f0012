//! Workscribe configuration management using Figment
//!
//! Configuration is layered: built-in defaults, then files discovered in
//! `.workscribe/workscribe.{toml,yaml,yml,json}`, then an optional explicit file,
//! then `WORKSCRIBE_*` environment variables.
//!
//! ```no_run
//! use workscribe_config::load_configuration;
//!
//! let config = load_configuration()?;
//! println!("database at {}", config.store.path.display());
//! # Ok::<(), workscribe_config::ConfigError>(())
//! ```
//!
//! ## Example TOML Configuration
//!
//! ```toml
//! [store]
//! path = ".workscribe/workscribe.db"
//! lock_timeout_ms = 5000
//! max_retries = 3
//! retry_backoff_ms = 50
//!
//! [ordering]
//! gap = 1000
//! min_gap = 10
//!
//! [notifications]
//! channel_capacity = 64
//! ```
//!
//! Environment variables use `__` between section and key, for example
//! `WORKSCRIBE_STORE__LOCK_TIMEOUT_MS=250`.

mod error;
mod provider;
mod types;

pub use error::{ConfigError, ConfigResult};
pub use provider::{
    load_configuration, ConfigFormat, ConfigProvider, CONFIG_DIR_NAME, CONFIG_FILE_STEM,
    ENV_PREFIX,
};
pub use types::{NotificationConfig, OrderingConfig, StoreConfig, TrackerConfig, DEFAULT_DB_PATH};
