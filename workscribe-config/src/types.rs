//! Strongly typed configuration sections

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default location of the tracker database, relative to the working directory
pub const DEFAULT_DB_PATH: &str = ".workscribe/workscribe.db";

/// Top-level configuration for the tracker
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub store: StoreConfig,
    pub ordering: OrderingConfig,
    pub notifications: NotificationConfig,
}

impl TrackerConfig {
    /// Check cross-field constraints that serde cannot express
    pub fn validate(&self) -> ConfigResult<()> {
        if self.ordering.gap <= 0 {
            return Err(ConfigError::invalid_value(
                "ordering.gap",
                format!("must be positive, got {}", self.ordering.gap),
            ));
        }
        // A midpoint strictly between two neighbours needs at least 2 units of room.
        if self.ordering.min_gap < 2 {
            return Err(ConfigError::invalid_value(
                "ordering.min_gap",
                format!("must be at least 2, got {}", self.ordering.min_gap),
            ));
        }
        if self.ordering.min_gap > self.ordering.gap {
            return Err(ConfigError::invalid_value(
                "ordering.min_gap",
                format!(
                    "must not exceed ordering.gap ({}), got {}",
                    self.ordering.gap, self.ordering.min_gap
                ),
            ));
        }
        if self.notifications.channel_capacity == 0 {
            return Err(ConfigError::invalid_value(
                "notifications.channel_capacity",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Relational store settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the SQLite database file
    pub path: PathBuf,
    /// How long a writer waits for the exclusive lock before reporting contention
    pub lock_timeout_ms: u64,
    /// Retries performed by the operation processor on retryable errors
    pub max_retries: u32,
    /// Base delay between retries; attempt `n` waits `n * retry_backoff_ms`
    pub retry_backoff_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DB_PATH),
            lock_timeout_ms: 5_000,
            max_retries: 3,
            retry_backoff_ms: 50,
        }
    }
}

/// Sparse integer ordering constants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderingConfig {
    /// Distance between consecutive siblings after append or rebalance
    pub gap: i64,
    /// Neighbour distance below which a move triggers a rebalance
    pub min_gap: i64,
}

impl Default for OrderingConfig {
    fn default() -> Self {
        Self {
            gap: 1000,
            min_gap: 10,
        }
    }
}

/// Live notification push settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Buffered pushes per connected recipient before pushes are dropped
    pub channel_capacity: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 64,
        }
    }
}
