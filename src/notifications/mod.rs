//! In-memory notification feed with write-through persistence.

pub mod store;

use chrono::Utc;
use log::warn;
use uuid::Uuid;

use crate::models::notification::{NewNotification, Notification, NotificationFeed};
use crate::notifications::store::NotificationStore;

/// The feed keeps at most this many entries; older ones fall off the end.
pub const MAX_NOTIFICATIONS: usize = 50;

pub struct NotificationCenter {
    notifications: Vec<Notification>,
    store: Box<dyn NotificationStore>,
}

impl NotificationCenter {
    /// Builds the centre from whatever the store already holds. A broken
    /// store is logged and the feed starts empty.
    pub fn new(store: Box<dyn NotificationStore>) -> Self {
        let mut notifications = match store.load() {
            Ok(list) => list,
            Err(err) => {
                warn!("Failed to load stored notifications: {}", err);
                Vec::new()
            }
        };
        notifications.truncate(MAX_NOTIFICATIONS);

        NotificationCenter {
            notifications,
            store,
        }
    }

    /// Prepends a new entry and evicts the oldest once the cap is reached.
    pub fn add(&mut self, new: NewNotification) -> Notification {
        let notification = Notification {
            id: Uuid::new_v4().to_string(),
            kind: new.kind,
            title: new.title,
            message: new.message,
            timestamp: Utc::now().timestamp_millis(),
            read: false,
            action_url: new.action_url,
        };

        self.notifications.insert(0, notification.clone());
        self.notifications.truncate(MAX_NOTIFICATIONS);
        self.persist();

        notification
    }

    /// Returns false when no entry carries the given id.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.notifications.len();
        self.notifications.retain(|n| n.id != id);

        if self.notifications.len() == before {
            return false;
        }
        self.persist();
        true
    }

    pub fn mark_as_read(&mut self, id: &str) -> bool {
        match self.notifications.iter_mut().find(|n| n.id == id) {
            Some(notification) => {
                notification.read = true;
                self.persist();
                true
            }
            None => false,
        }
    }

    pub fn mark_all_as_read(&mut self) {
        for notification in &mut self.notifications {
            notification.read = true;
        }
        self.persist();
    }

    pub fn clear_all(&mut self) {
        self.notifications.clear();
        if let Err(err) = self.store.clear() {
            warn!("Failed to clear notification store: {}", err);
        }
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Unread count is always derived from the current list, so eviction
    /// of an unread entry lowers it as well.
    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }

    pub fn feed(&self) -> NotificationFeed {
        NotificationFeed {
            notifications: self.notifications.clone(),
            unread_count: self.unread_count(),
        }
    }

    fn persist(&self) {
        if let Err(err) = self.store.save(&self.notifications) {
            warn!("Failed to persist notifications: {}", err);
        }
    }
}
