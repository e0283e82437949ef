//! Style profile store.
//!
//! Profiles are JSON documents under `styles/{id}` in the storage backend.
//! The store validates input, assigns ids and creation timestamps, merges
//! partial updates, and answers the two aggregate queries the dashboard
//! needs (how many profiles, and whether any is usable for generation).

use std::sync::Arc;

use creatorjoy_storage::StorageBackend;
use tracing::debug;

use crate::clock::MonotonicClock;
use crate::error::StyleError;
use crate::models::{NewStyle, ScriptSamples, StylePatch, StyleProfile};

const PREFIX: &str = "styles/";

/// CRUD over style profiles.
pub struct StyleStore {
    storage: Arc<dyn StorageBackend>,
    clock: MonotonicClock,
}

impl std::fmt::Debug for StyleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StyleStore").finish_non_exhaustive()
    }
}

fn key(id: &str) -> String {
    format!("{PREFIX}{id}")
}

fn check_name(name: &str) -> Result<(), StyleError> {
    if name.trim().is_empty() {
        return Err(StyleError::Validation {
            reason: "name is required".to_owned(),
        });
    }
    Ok(())
}

fn check_scripts(scripts: &ScriptSamples) -> Result<(), StyleError> {
    if scripts.is_empty() {
        return Err(StyleError::Validation {
            reason: "at least one script sample is required".to_owned(),
        });
    }
    Ok(())
}

fn decode(key: &str, data: &[u8]) -> Result<StyleProfile, StyleError> {
    serde_json::from_slice(data).map_err(|e| StyleError::Internal {
        reason: format!("corrupt style document '{key}': {e}"),
    })
}

impl StyleStore {
    /// Create a store over the given backend.
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            storage,
            clock: MonotonicClock::new(),
        }
    }

    async fn save(&self, profile: &StyleProfile) -> Result<(), StyleError> {
        let data = serde_json::to_vec(profile).map_err(|e| StyleError::Internal {
            reason: format!("serialization failed: {e}"),
        })?;
        self.storage.put(&key(&profile.id), &data).await?;
        Ok(())
    }

    /// List every profile, most recently created first.
    ///
    /// # Errors
    ///
    /// Returns `StyleError::Storage` if the backend fails and
    /// `StyleError::Internal` if a stored document is unreadable.
    pub async fn list(&self) -> Result<Vec<StyleProfile>, StyleError> {
        let entries = self.storage.scan(PREFIX).await?;
        let mut profiles = entries
            .iter()
            .map(|(k, v)| decode(k, v))
            .collect::<Result<Vec<_>, _>>()?;
        profiles.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(profiles)
    }

    /// Fetch one profile.
    ///
    /// # Errors
    ///
    /// Returns `StyleError::NotFound` if no profile has this id.
    pub async fn get(&self, id: &str) -> Result<StyleProfile, StyleError> {
        let key = key(id);
        let data = self
            .storage
            .get(&key)
            .await?
            .ok_or_else(|| StyleError::NotFound { id: id.to_owned() })?;
        decode(&key, &data)
    }

    /// Validate and persist a new profile.
    ///
    /// # Errors
    ///
    /// Returns `StyleError::Validation` if the name is blank or every script
    /// slot is blank.
    pub async fn create(&self, new: NewStyle) -> Result<StyleProfile, StyleError> {
        check_name(&new.name)?;
        check_scripts(&new.scripts)?;

        let mut scripts = new.scripts;
        scripts.normalize();

        let profile = StyleProfile {
            id: uuid::Uuid::new_v4().to_string(),
            name: new.name.trim().to_owned(),
            scripts,
            created_at: self.clock.now().await,
            summary: new.summary,
        };
        self.save(&profile).await?;

        debug!(style_id = %profile.id, "style profile created");
        Ok(profile)
    }

    /// Merge a partial update into an existing profile.
    ///
    /// `id` and `created_at` never change.
    ///
    /// # Errors
    ///
    /// Returns `StyleError::NotFound` if the id is unknown, or
    /// `StyleError::Validation` if the merged profile would have a blank name
    /// or no scripts left.
    pub async fn update(&self, id: &str, patch: StylePatch) -> Result<StyleProfile, StyleError> {
        let mut profile = self.get(id).await?;

        if let Some(name) = patch.name {
            check_name(&name)?;
            profile.name = name.trim().to_owned();
        }
        profile.scripts.apply(patch.scripts);
        check_scripts(&profile.scripts)?;
        profile.summary.apply(patch.summary);

        self.save(&profile).await?;
        debug!(style_id = %id, "style profile updated");
        Ok(profile)
    }

    /// Remove a profile. Removing an id that does not exist succeeds.
    ///
    /// History rows that reference the profile are left in place.
    ///
    /// # Errors
    ///
    /// Returns `StyleError::Storage` if the backend fails.
    pub async fn delete(&self, id: &str) -> Result<(), StyleError> {
        self.storage.delete(&key(id)).await?;
        debug!(style_id = %id, "style profile deleted");
        Ok(())
    }

    /// Total number of profiles.
    ///
    /// # Errors
    ///
    /// Returns `StyleError::Storage` if the backend fails.
    pub async fn count(&self) -> Result<usize, StyleError> {
        Ok(self.storage.count(PREFIX).await?)
    }

    /// Whether at least one profile exists to generate with. Summary fields
    /// play no part: any stored profile passed validation on the way in.
    ///
    /// # Errors
    ///
    /// Returns `StyleError::Storage` if the backend fails.
    pub async fn has_usable_profile(&self) -> Result<bool, StyleError> {
        Ok(self.count().await? > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::StyleSummary;
    use creatorjoy_storage::{MemoryBackend, StorageError};

    fn make_store() -> StyleStore {
        StyleStore::new(Arc::new(MemoryBackend::new()))
    }

    /// A backend whose every call fails, standing in for a lost connection.
    struct UnreachableBackend;

    #[async_trait::async_trait]
    impl StorageBackend for UnreachableBackend {
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

    // ── create ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn create_tech_writer_scenario() {
        let store = make_store();
        let before = store.count().await.unwrap();

        let created = store
            .create(NewStyle::with_script("Tech Writer", "Hello world"))
            .await
            .unwrap();

        assert!(!created.id.is_empty());
        assert_eq!(store.count().await.unwrap(), before + 1);
        let listed = store.list().await.unwrap();
        assert_eq!(listed[0].name, "Tech Writer");
        assert_eq!(listed[0].id, created.id);
    }

    #[tokio::test]
    async fn create_rejects_blank_name() {
        let store = make_store();
        for name in ["", "   "] {
            let err = store
                .create(NewStyle::with_script(name, "sample"))
                .await
                .unwrap_err();
            assert!(matches!(err, StyleError::Validation { .. }));
        }
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn create_rejects_profile_without_scripts() {
        let store = make_store();
        let err = store
            .create(NewStyle {
                name: "Empty".to_owned(),
                scripts: ScriptSamples {
                    script_5: Some("  ".to_owned()),
                    ..ScriptSamples::default()
                },
                summary: StyleSummary::default(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StyleError::Validation { .. }));
    }

    #[tokio::test]
    async fn create_accepts_script_in_any_slot() {
        let store = make_store();
        let created = store
            .create(NewStyle {
                name: "Last slot".to_owned(),
                scripts: ScriptSamples {
                    script_10: Some("only sample".to_owned()),
                    ..ScriptSamples::default()
                },
                summary: StyleSummary::default(),
            })
            .await
            .unwrap();
        assert_eq!(created.scripts.script_10.as_deref(), Some("only sample"));
        assert_eq!(created.summary, StyleSummary::default());
    }

    #[tokio::test]
    async fn newest_profile_lists_first() {
        let store = make_store();
        let mut ids = Vec::new();
        for i in 0..5 {
            let p = store
                .create(NewStyle::with_script(format!("style {i}"), "text"))
                .await
                .unwrap();
            ids.push(p.id);
        }
        ids.reverse();

        let listed: Vec<String> = store.list().await.unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(listed, ids);
    }

    // ── get / update ─────────────────────────────────────────────────

    #[tokio::test]
    async fn get_unknown_id_is_not_found() {
        let store = make_store();
        let err = store.get("missing").await.unwrap_err();
        assert!(matches!(err, StyleError::NotFound { ref id } if id == "missing"));
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let store = make_store();
        let err = store
            .update("missing", StylePatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StyleError::NotFound { .. }));
    }

    #[tokio::test]
    async fn update_merges_fields_and_keeps_identity() {
        let store = make_store();
        let created = store
            .create(NewStyle::with_script("Original", "first sample"))
            .await
            .unwrap();

        let updated = store
            .update(
                &created.id,
                StylePatch {
                    name: Some("Renamed".to_owned()),
                    scripts: ScriptSamples {
                        script_2: Some("second sample".to_owned()),
                        ..ScriptSamples::default()
                    },
                    summary: StyleSummary {
                        tone: Some("warm".to_owned()),
                        common_phrases: Some(vec!["let's go".to_owned()]),
                        ..StyleSummary::default()
                    },
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.scripts.script_1.as_deref(), Some("first sample"));
        assert_eq!(updated.scripts.script_2.as_deref(), Some("second sample"));
        assert_eq!(updated.summary.tone.as_deref(), Some("warm"));
        assert_eq!(store.get(&created.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn update_cannot_remove_last_script() {
        let store = make_store();
        let created = store
            .create(NewStyle::with_script("Solo", "only one"))
            .await
            .unwrap();

        let err = store
            .update(
                &created.id,
                StylePatch {
                    scripts: ScriptSamples {
                        script_1: Some(String::new()),
                        ..ScriptSamples::default()
                    },
                    ..StylePatch::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StyleError::Validation { .. }));
        assert_eq!(store.get(&created.id).await.unwrap(), created);
    }

    // ── delete / count ───────────────────────────────────────────────

    #[tokio::test]
    async fn delete_removes_profile_from_list() {
        let store = make_store();
        let a = store.create(NewStyle::with_script("A", "a")).await.unwrap();
        let b = store.create(NewStyle::with_script("B", "b")).await.unwrap();

        store.delete(&a.id).await.unwrap();

        let listed = store.list().await.unwrap();
        assert!(listed.iter().all(|p| p.id != a.id));
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, b.id);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = make_store();
        let a = store.create(NewStyle::with_script("A", "a")).await.unwrap();
        store.delete(&a.id).await.unwrap();
        store.delete(&a.id).await.unwrap();
        store.delete("never-existed").await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn count_tracks_list_length() {
        let store = make_store();
        let mut ids = Vec::new();
        for i in 0..4 {
            let p = store
                .create(NewStyle::with_script(format!("s{i}"), "x"))
                .await
                .unwrap();
            ids.push(p.id);
            assert_eq!(store.count().await.unwrap(), store.list().await.unwrap().len());
        }
        for id in &ids[..2] {
            store.delete(id).await.unwrap();
            assert_eq!(store.count().await.unwrap(), store.list().await.unwrap().len());
        }
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn usable_profile_needs_no_summary() {
        let store = make_store();
        assert!(!store.has_usable_profile().await.unwrap());
        store.create(NewStyle::with_script("Bare", "x")).await.unwrap();
        assert!(store.has_usable_profile().await.unwrap());
    }

    // ── failures ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn backend_failure_surfaces_as_storage_error() {
        let store = StyleStore::new(Arc::new(UnreachableBackend));
        assert!(matches!(
            store.list().await.unwrap_err(),
            StyleError::Storage(StorageError::List { .. })
        ));
        assert!(matches!(
            store.count().await.unwrap_err(),
            StyleError::Storage(_)
        ));
        assert!(matches!(
            store.create(NewStyle::with_script("A", "a")).await.unwrap_err(),
            StyleError::Storage(StorageError::Write { .. })
        ));
    }

    #[tokio::test]
    async fn corrupt_document_is_internal_error() {
        let backend = Arc::new(MemoryBackend::new());
        backend.put("styles/bad", b"not json").await.unwrap();
        let store = StyleStore::new(backend);
        assert!(matches!(
            store.list().await.unwrap_err(),
            StyleError::Internal { .. }
        ));
    }
}
