//! TrackerContext - access to the store, ordering rules and live channels
//!
//! The context provides access, not logic. Commands do all the work.

use crate::error::Result;
use crate::notification::Notifier;
use crate::ordering::OrderingRules;
use crate::store::Database;
use std::path::PathBuf;
use workscribe_config::{StoreConfig, TrackerConfig};

/// Context passed to every command
pub struct TrackerContext {
    db: Database,
    notifier: Notifier,
    ordering: OrderingRules,
    config: TrackerConfig,
}

impl TrackerContext {
    /// Validate `config`, open the database and create an empty connection registry
    pub fn open(config: TrackerConfig) -> Result<Self> {
        config.validate()?;
        let db = Database::open(&config.store)?;
        Ok(Self {
            db,
            notifier: Notifier::new(config.notifications.channel_capacity),
            ordering: OrderingRules::from(config.ordering),
            config,
        })
    }

    /// Open with default settings and the database at `path`
    pub fn open_at(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open(TrackerConfig {
            store: StoreConfig {
                path: path.into(),
                ..StoreConfig::default()
            },
            ..TrackerConfig::default()
        })
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn ordering(&self) -> OrderingRules {
        self.ordering
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }
}
