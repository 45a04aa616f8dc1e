use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{NotificationPayload, NotificationScheduler, ScheduleId};
use crate::error::{NotifyError, StorageError};
use crate::storage::KeyValueStore;

pub const PENDING_KEY: &str = "notify.pending";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingNotification {
    pub id: ScheduleId,
    pub deadline: DateTime<Utc>,
    pub payload: NotificationPayload,
}

/// Scheduler for hosts without a notification centre: the pending request is
/// kept in the key-value store, and the host asks for it once it is due.
pub struct StoredNotificationScheduler<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> StoredNotificationScheduler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn pending(&self) -> Result<Option<PendingNotification>, StorageError> {
        let Some(raw) = self.store.get(PENDING_KEY)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StorageError::Corrupt {
                key: PENDING_KEY.into(),
                message: e.to_string(),
            })
    }

    /// The pending notification if its deadline has arrived.
    pub fn due(&self, now: DateTime<Utc>) -> Result<Option<PendingNotification>, StorageError> {
        Ok(self.pending()?.filter(|p| p.deadline <= now))
    }

    /// Like [`Self::due`], but removes the notification so it is delivered
    /// once.
    pub fn take_due(
        &mut self,
        now: DateTime<Utc>,
    ) -> Result<Option<PendingNotification>, StorageError> {
        let due = self.due(now)?;
        if due.is_some() {
            self.store.remove(PENDING_KEY)?;
        }
        Ok(due)
    }
}

impl<S: KeyValueStore> NotificationScheduler for StoredNotificationScheduler<S> {
    fn schedule(
        &mut self,
        deadline: DateTime<Utc>,
        payload: &NotificationPayload,
    ) -> Result<ScheduleId, NotifyError> {
        let pending = PendingNotification {
            id: ScheduleId::timer_complete(),
            deadline,
            payload: payload.clone(),
        };
        let raw = serde_json::to_string(&pending)
            .map_err(|e| NotifyError::Refused(e.to_string()))?;
        self.store.set(PENDING_KEY, &raw)?;
        debug!(id = %pending.id, %deadline, "notification scheduled");
        Ok(pending.id)
    }

    fn cancel(&mut self) {
        if let Err(e) = self.store.remove(PENDING_KEY) {
            warn!("failed to cancel pending notification: {e}");
        }
    }
}
