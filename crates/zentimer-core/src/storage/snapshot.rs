//! Crash-recovery records for the live session.
//!
//! A running session is stored as its deadline (the only thing needed to
//! recompute remaining time) plus the duration and start instant. A paused
//! session is stored separately as its frozen remaining time.

use chrono::{DateTime, Duration, Utc};

use super::KeyValueStore;
use crate::error::StorageError;

pub const DEADLINE_KEY: &str = "timer.deadline";
pub const DURATION_KEY: &str = "timer.durationSeconds";
pub const STARTED_AT_KEY: &str = "timer.startedAt";
pub const PAUSED_REMAINING_KEY: &str = "timer.paused.remainingSeconds";
pub const PAUSED_DURATION_KEY: &str = "timer.paused.durationSeconds";

const MAX_DURATION_SECS: u32 = 99 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistedSnapshot {
    pub deadline: DateTime<Utc>,
    pub duration_secs: u32,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PausedRecord {
    pub remaining_secs: u32,
    pub duration_secs: u32,
}

/// Load the running-session snapshot.
///
/// Absence of `timer.deadline` means there is nothing to restore. A missing
/// duration falls back to `fallback_duration_secs`; a missing start instant
/// is taken as `deadline - duration`.
pub fn load_snapshot(
    store: &dyn KeyValueStore,
    fallback_duration_secs: u32,
) -> Result<Option<PersistedSnapshot>, StorageError> {
    let Some(raw_deadline) = store.get(DEADLINE_KEY)? else {
        return Ok(None);
    };
    let deadline = parse_timestamp(DEADLINE_KEY, &raw_deadline)?;

    let duration_secs = match store.get(DURATION_KEY)? {
        Some(raw) => parse_duration(DURATION_KEY, &raw)?,
        None => fallback_duration_secs,
    };

    let started_at = match store.get(STARTED_AT_KEY)? {
        Some(raw) => parse_timestamp(STARTED_AT_KEY, &raw)?,
        None => deadline - Duration::seconds(duration_secs as i64),
    };

    Ok(Some(PersistedSnapshot {
        deadline,
        duration_secs,
        started_at,
    }))
}

pub fn save_snapshot(
    store: &dyn KeyValueStore,
    snapshot: &PersistedSnapshot,
) -> Result<(), StorageError> {
    store.set_many(&[
        (DEADLINE_KEY, snapshot.deadline.to_rfc3339()),
        (DURATION_KEY, snapshot.duration_secs.to_string()),
        (STARTED_AT_KEY, snapshot.started_at.to_rfc3339()),
    ])
}

pub fn clear_snapshot(store: &dyn KeyValueStore) -> Result<(), StorageError> {
    store.remove_many(&[DEADLINE_KEY, DURATION_KEY, STARTED_AT_KEY])
}

pub fn load_paused(store: &dyn KeyValueStore) -> Result<Option<PausedRecord>, StorageError> {
    let Some(raw_remaining) = store.get(PAUSED_REMAINING_KEY)? else {
        return Ok(None);
    };
    let Some(raw_duration) = store.get(PAUSED_DURATION_KEY)? else {
        return Err(StorageError::Corrupt {
            key: PAUSED_DURATION_KEY.into(),
            message: "missing while a paused remaining time is stored".into(),
        });
    };

    let duration_secs = parse_duration(PAUSED_DURATION_KEY, &raw_duration)?;
    let remaining_secs: u32 = raw_remaining.trim().parse().map_err(|_| StorageError::Corrupt {
        key: PAUSED_REMAINING_KEY.into(),
        message: format!("'{raw_remaining}' is not a number of seconds"),
    })?;
    if remaining_secs == 0 || remaining_secs > duration_secs {
        return Err(StorageError::Corrupt {
            key: PAUSED_REMAINING_KEY.into(),
            message: format!("{remaining_secs}s is outside 1..={duration_secs}"),
        });
    }

    Ok(Some(PausedRecord {
        remaining_secs,
        duration_secs,
    }))
}

pub fn save_paused(store: &dyn KeyValueStore, record: &PausedRecord) -> Result<(), StorageError> {
    store.set_many(&[
        (PAUSED_REMAINING_KEY, record.remaining_secs.to_string()),
        (PAUSED_DURATION_KEY, record.duration_secs.to_string()),
    ])
}

pub fn clear_paused(store: &dyn KeyValueStore) -> Result<(), StorageError> {
    store.remove_many(&[PAUSED_REMAINING_KEY, PAUSED_DURATION_KEY])
}

fn parse_timestamp(key: &str, raw: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| StorageError::Corrupt {
            key: key.into(),
            message: format!("invalid timestamp '{raw}': {err}"),
        })
}

fn parse_duration(key: &str, raw: &str) -> Result<u32, StorageError> {
    let secs: u32 = raw.trim().parse().map_err(|_| StorageError::Corrupt {
        key: key.into(),
        message: format!("'{raw}' is not a number of seconds"),
    })?;
    if secs < 60 || secs > MAX_DURATION_SECS || secs % 60 != 0 {
        return Err(StorageError::Corrupt {
            key: key.into(),
            message: format!("{secs}s is not a whole-minute duration between 1 and 99 minutes"),
        });
    }
    Ok(secs)
}
