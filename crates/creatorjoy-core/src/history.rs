//! Boost history.
//!
//! History is append-only and owned by the generation workflow: each
//! successful (and some failed-but-logged) webhook runs leave one record
//! under `history/{id}`. The generator in this crate never writes here. The
//! workflow reaches [`HistoryStore::record`] through the server's ingestion
//! route; everything else is read-side: newest-first listing, the most
//! recent boost, and counts since a point in time.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use creatorjoy_storage::StorageBackend;
use tracing::{debug, warn};

use crate::clock::MonotonicClock;
use crate::error::HistoryError;
use crate::models::{BoostHistory, HistoryEntry, NewBoostRecord};
use crate::style::StyleStore;

const PREFIX: &str = "history/";

/// Number of entries returned by [`HistoryStore::recent`] when the caller
/// has no preference.
pub const DEFAULT_RECENT_LIMIT: usize = 10;

fn key(id: &str) -> String {
    format!("{PREFIX}{id}")
}

/// Read access to boost history, plus the workflow's ingestion path.
pub struct HistoryStore {
    storage: Arc<dyn StorageBackend>,
    clock: MonotonicClock,
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore").finish_non_exhaustive()
    }
}

impl HistoryStore {
    /// Create a store over the given backend.
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            storage,
            clock: MonotonicClock::new(),
        }
    }

    /// Every record, newest `generated_at` first.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Storage` if the backend fails and
    /// `HistoryError::Internal` if a stored document is unreadable.
    pub async fn list(&self) -> Result<Vec<BoostHistory>, HistoryError> {
        let entries = self.storage.scan(PREFIX).await?;
        let mut records = entries
            .iter()
            .map(|(k, v)| {
                serde_json::from_slice::<BoostHistory>(v).map_err(|e| HistoryError::Internal {
                    reason: format!("corrupt history document '{k}': {e}"),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        records.sort_by(|a, b| {
            b.generated_at
                .cmp(&a.generated_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(records)
    }

    /// The newest `limit` records.
    ///
    /// # Errors
    ///
    /// Same as [`list`](Self::list).
    pub async fn recent(&self, limit: usize) -> Result<Vec<BoostHistory>, HistoryError> {
        let mut records = self.list().await?;
        records.truncate(limit);
        Ok(records)
    }

    /// The most recent record, or `None` when nothing has been generated yet.
    ///
    /// # Errors
    ///
    /// Same as [`list`](Self::list).
    pub async fn last_boost(&self) -> Result<Option<BoostHistory>, HistoryError> {
        Ok(self.list().await?.into_iter().next())
    }

    /// Number of records generated at or after `since`.
    ///
    /// # Errors
    ///
    /// Same as [`list`](Self::list).
    pub async fn count_since(&self, since: DateTime<Utc>) -> Result<usize, HistoryError> {
        Ok(self
            .list()
            .await?
            .iter()
            .filter(|r| r.generated_at >= since)
            .count())
    }

    /// Number of records from the seven days before `now`.
    ///
    /// # Errors
    ///
    /// Same as [`list`](Self::list).
    pub async fn boosts_this_week(&self, now: DateTime<Utc>) -> Result<usize, HistoryError> {
        self.count_since(now - Duration::days(7)).await
    }

    /// Append a record submitted by the generation workflow.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Validation` if `style_id` is blank, or
    /// `HistoryError::Storage` if the write fails.
    pub async fn record(&self, new: NewBoostRecord) -> Result<BoostHistory, HistoryError> {
        if new.style_id.trim().is_empty() {
            return Err(HistoryError::Validation {
                reason: "style_id is required".to_owned(),
            });
        }

        let generated_at = match new.generated_at {
            Some(ts) => ts,
            None => self.clock.now().await,
        };
        let record = BoostHistory {
            id: uuid::Uuid::new_v4().to_string(),
            style_id: new.style_id,
            idea: new.idea,
            script: new.script,
            cta: new.cta,
            generated_at,
        };

        let data = serde_json::to_vec(&record).map_err(|e| HistoryError::Internal {
            reason: format!("serialization failed: {e}"),
        })?;
        self.storage.put(&key(&record.id), &data).await?;

        debug!(history_id = %record.id, style_id = %record.style_id, "boost recorded");
        Ok(record)
    }

    /// Remove a record. Removing an id that does not exist succeeds.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Storage` if the backend fails.
    pub async fn delete(&self, id: &str) -> Result<(), HistoryError> {
        self.storage.delete(&key(id)).await?;
        debug!(history_id = %id, "boost record deleted");
        Ok(())
    }

    /// Every record joined with its style's current name.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError` if history cannot be read. A failure to read the
    /// styles degrades to unnamed entries rather than failing the listing.
    pub async fn list_with_style_names(
        &self,
        styles: &StyleStore,
    ) -> Result<Vec<HistoryEntry>, HistoryError> {
        let records = self.list().await?;
        Ok(join_style_names(records, styles).await)
    }

    /// The newest `limit` records joined with their style names.
    ///
    /// # Errors
    ///
    /// Same as [`list_with_style_names`](Self::list_with_style_names).
    pub async fn recent_with_style_names(
        &self,
        styles: &StyleStore,
        limit: usize,
    ) -> Result<Vec<HistoryEntry>, HistoryError> {
        let records = self.recent(limit).await?;
        Ok(join_style_names(records, styles).await)
    }
}

async fn join_style_names(records: Vec<BoostHistory>, styles: &StyleStore) -> Vec<HistoryEntry> {
    let names: HashMap<String, String> = match styles.list().await {
        Ok(profiles) => profiles.into_iter().map(|p| (p.id, p.name)).collect(),
        Err(e) => {
            warn!(error = %e, "could not load style names for history");
            HashMap::new()
        }
    };

    records
        .into_iter()
        .map(|record| {
            let style_name = names.get(&record.style_id).cloned();
            HistoryEntry { record, style_name }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::NewStyle;
    use creatorjoy_storage::{MemoryBackend, StorageError};

    fn make_stores() -> (StyleStore, HistoryStore) {
        let backend: Arc<dyn StorageBackend> = Arc::new(MemoryBackend::new());
        (
            StyleStore::new(Arc::clone(&backend)),
            HistoryStore::new(backend),
        )
    }

    fn at(ts: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(ts).unwrap().with_timezone(&Utc)
    }

    fn record_at(style_id: &str, idea: &str, ts: &str) -> NewBoostRecord {
        NewBoostRecord {
            style_id: style_id.to_owned(),
            idea: Some(idea.to_owned()),
            script: Some(format!("script for {idea}")),
            cta: Some("Follow for more".to_owned()),
            generated_at: Some(at(ts)),
        }
    }

    #[tokio::test]
    async fn list_orders_newest_first() {
        let (_, history) = make_stores();
        history.record(record_at("s", "middle", "2026-03-02T10:00:00Z")).await.unwrap();
        history.record(record_at("s", "oldest", "2026-03-01T10:00:00Z")).await.unwrap();
        history.record(record_at("s", "newest", "2026-03-03T10:00:00Z")).await.unwrap();

        let ideas: Vec<_> = history
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.idea.unwrap())
            .collect();
        assert_eq!(ideas, vec!["newest", "middle", "oldest"]);
    }

    #[tokio::test]
    async fn recent_truncates_to_limit() {
        let (_, history) = make_stores();
        for day in 1..=5 {
            history
                .record(record_at("s", &format!("day {day}"), &format!("2026-03-0{day}T08:00:00Z")))
                .await
                .unwrap();
        }
        let recent = history.recent(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].idea.as_deref(), Some("day 5"));
        assert_eq!(recent[1].idea.as_deref(), Some("day 4"));
        assert_eq!(history.recent(DEFAULT_RECENT_LIMIT).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn last_boost_on_empty_history_is_none() {
        let (_, history) = make_stores();
        assert_eq!(history.last_boost().await.unwrap(), None);
    }

    #[tokio::test]
    async fn last_boost_is_newest_record() {
        let (_, history) = make_stores();
        history.record(record_at("s", "old", "2026-01-01T00:00:00Z")).await.unwrap();
        let newest = history.record(record_at("s", "new", "2026-02-01T00:00:00Z")).await.unwrap();
        assert_eq!(history.last_boost().await.unwrap(), Some(newest));
    }

    #[tokio::test]
    async fn count_since_is_inclusive() {
        let (_, history) = make_stores();
        history.record(record_at("s", "before", "2026-03-01T11:59:59Z")).await.unwrap();
        history.record(record_at("s", "exact", "2026-03-01T12:00:00Z")).await.unwrap();
        history.record(record_at("s", "after", "2026-03-05T00:00:00Z")).await.unwrap();

        assert_eq!(history.count_since(at("2026-03-01T12:00:00Z")).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn boosts_this_week_counts_last_seven_days() {
        let (_, history) = make_stores();
        let now = at("2026-03-10T12:00:00Z");
        history.record(record_at("s", "too old", "2026-03-03T11:00:00Z")).await.unwrap();
        history.record(record_at("s", "edge", "2026-03-03T12:00:00Z")).await.unwrap();
        history.record(record_at("s", "yesterday", "2026-03-09T12:00:00Z")).await.unwrap();

        assert_eq!(history.boosts_this_week(now).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn record_assigns_id_and_timestamp() {
        let (_, history) = make_stores();
        let record = history
            .record(NewBoostRecord {
                style_id: "s".to_owned(),
                ..NewBoostRecord::default()
            })
            .await
            .unwrap();
        assert!(!record.id.is_empty());
        assert!(record.generated_at <= Utc::now());
        assert_eq!(record.idea, None);
    }

    #[tokio::test]
    async fn record_requires_style_id() {
        let (_, history) = make_stores();
        let err = history.record(NewBoostRecord::default()).await.unwrap_err();
        assert!(matches!(err, HistoryError::Validation { .. }));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (_, history) = make_stores();
        let r = history.record(record_at("s", "x", "2026-03-01T00:00:00Z")).await.unwrap();
        history.delete(&r.id).await.unwrap();
        history.delete(&r.id).await.unwrap();
        assert!(history.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_style_orphans_its_history() {
        let (styles, history) = make_stores();
        let kept = styles.create(NewStyle::with_script("Kept", "a")).await.unwrap();
        let gone = styles.create(NewStyle::with_script("Gone", "b")).await.unwrap();
        history.record(record_at(&kept.id, "one", "2026-03-01T00:00:00Z")).await.unwrap();
        history.record(record_at(&gone.id, "two", "2026-03-02T00:00:00Z")).await.unwrap();

        styles.delete(&gone.id).await.unwrap();

        let entries = history.list_with_style_names(&styles).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].record.style_id, gone.id);
        assert_eq!(entries[0].style_name, None);
        assert_eq!(entries[1].style_name.as_deref(), Some("Kept"));
    }

    #[tokio::test]
    async fn recent_with_style_names_limits_and_joins() {
        let (styles, history) = make_stores();
        let style = styles.create(NewStyle::with_script("Hooky", "a")).await.unwrap();
        for day in 1..=3 {
            history
                .record(record_at(&style.id, "idea", &format!("2026-03-0{day}T00:00:00Z")))
                .await
                .unwrap();
        }
        let entries = history.recent_with_style_names(&styles, 1).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].style_name.as_deref(), Some("Hooky"));
    }

    /// Style storage that is down; history storage stays healthy.
    struct StylesDown;

    #[async_trait::async_trait]
    impl StorageBackend for StylesDown {
        async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
            Err(StorageError::Read {
                key: key.to_owned(),
                reason: "connection refused".to_owned(),
            })
        }
        async fn put(&self, key: &str, _value: &[u8]) -> Result<(), StorageError> {
            Err(StorageError::Write {
                key: key.to_owned(),
                reason: "connection refused".to_owned(),
            })
        }
        async fn delete(&self, key: &str) -> Result<(), StorageError> {
            Err(StorageError::Delete {
                key: key.to_owned(),
                reason: "connection refused".to_owned(),
            })
        }
        async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
            Err(StorageError::List {
                prefix: prefix.to_owned(),
                reason: "connection refused".to_owned(),
            })
        }
    }

    #[tokio::test]
    async fn style_name_lookup_failure_leaves_entries_unnamed() {
        let styles = StyleStore::new(Arc::new(StylesDown));
        let history = HistoryStore::new(Arc::new(MemoryBackend::new()));
        history
            .record(record_at("s1", "idea", "2026-03-01T00:00:00Z"))
            .await
            .unwrap();

        let entries = history.list_with_style_names(&styles).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].style_name, None);
        assert_eq!(entries[0].record.style_id, "s1");
    }

    #[test]
    fn history_entry_serializes_flat_with_style_name() {
        let entry = HistoryEntry {
            record: BoostHistory {
                id: "h1".to_owned(),
                style_id: "s1".to_owned(),
                idea: Some("idea".to_owned()),
                script: None,
                cta: None,
                generated_at: at("2026-03-01T00:00:00Z"),
            },
            style_name: Some("Tech Writer".to_owned()),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["id"], "h1");
        assert_eq!(json["style_name"], "Tech Writer");
        assert!(json.get("record").is_none());
    }
}
