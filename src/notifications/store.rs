//! Persistence port for the notification feed. The centre keeps the
//! authoritative list in memory and writes through after every mutation;
//! a store failure never breaks the feed.

use std::fs;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::notification::Notification;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("notification store io: {0}")]
    Io(#[from] std::io::Error),

    #[error("notification store encoding: {0}")]
    Encoding(#[from] serde_json::Error),
}

pub trait NotificationStore: Send + Sync {
    fn load(&self) -> Result<Vec<Notification>, StoreError>;
    fn save(&self, notifications: &[Notification]) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

/// Stores the feed as a single JSON document on disk.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }
}

impl NotificationStore for JsonFileStore {
    fn load(&self) -> Result<Vec<Notification>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn save(&self, notifications: &[Notification]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let raw = serde_json::to_string_pretty(notifications)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}
