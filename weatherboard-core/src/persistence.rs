//! Storage port for the favorites record.
//!
//! Loading never fails: a missing or unreadable record is an empty set. Saving may fail,
//! and callers decide what to do with the error.

use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::{fmt::Debug, io::ErrorKind, path::PathBuf};

use crate::model::FavoritesSet;

#[async_trait]
pub trait PersistenceAdapter: Send + Sync + Debug {
    async fn load(&self) -> FavoritesSet;

    async fn save(&self, favorites: &FavoritesSet) -> Result<()>;
}

/// The favorites list as a JSON array in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl PersistenceAdapter for JsonFileStore {
    async fn load(&self) -> FavoritesSet {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return FavoritesSet::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read favorites");
                return FavoritesSet::new();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(favorites) => favorites,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Ignoring malformed favorites record"
                );
                FavoritesSet::new()
            }
        }
    }

    async fn save(&self, favorites: &FavoritesSet) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create favorites directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string(favorites).context("Failed to serialize favorites")?;

        tokio::fs::write(&self.path, json)
            .await
            .with_context(|| format!("Failed to write favorites file: {}", self.path.display()))?;

        Ok(())
    }
}

/// Keeps the record in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    record: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a raw record, as if it had been written by an earlier session.
    pub fn with_record(raw: impl Into<String>) -> Self {
        Self { record: Mutex::new(Some(raw.into())) }
    }

    pub fn record(&self) -> Option<String> {
        self.record.lock().clone()
    }
}

#[async_trait]
impl PersistenceAdapter for MemoryStore {
    async fn load(&self) -> FavoritesSet {
        let Some(raw) = self.record() else {
            return FavoritesSet::new();
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Ignoring malformed favorites record");
            FavoritesSet::new()
        })
    }

    async fn save(&self, favorites: &FavoritesSet) -> Result<()> {
        let json = serde_json::to_string(favorites).context("Failed to serialize favorites")?;
        *self.record.lock() = Some(json);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("favorites.json"));

        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn malformed_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("favorites.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(store.load().await.is_empty());

        std::fs::write(&path, r#"{"cities": ["Paris"]}"#).unwrap();
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn save_creates_parents_and_load_reads_back_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("data").join("favorites.json"));
        let favorites: FavoritesSet = ["Rabat", "Paris", "Oslo"].into_iter().collect();

        store.save(&favorites).await.unwrap();
        let loaded = store.load().await;

        assert_eq!(loaded.iter().collect::<Vec<_>>(), vec!["Rabat", "Paris", "Oslo"]);
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, r#"["Rabat","Paris","Oslo"]"#);
    }

    #[tokio::test]
    async fn save_into_a_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        let err = store.save(&FavoritesSet::new()).await.unwrap_err();
        assert!(err.to_string().contains("Failed to write favorites file"));
    }

    #[tokio::test]
    async fn memory_store_treats_garbage_as_absent() {
        let store = MemoryStore::with_record("42");
        assert!(store.load().await.is_empty());

        let favorites: FavoritesSet = ["Fes"].into_iter().collect();
        store.save(&favorites).await.unwrap();
        assert_eq!(store.record().as_deref(), Some(r#"["Fes"]"#));
        assert_eq!(store.load().await, favorites);
    }
}
