use parking_lot::Mutex;
use std::sync::Arc;

use crate::{model::FavoritesSet, persistence::PersistenceAdapter};

/// Favorited cities, held in memory and written through on every change.
#[derive(Debug)]
pub struct FavoritesStore {
    set: Mutex<FavoritesSet>,
    adapter: Arc<dyn PersistenceAdapter>,
    /// Held from mutation through save so writes land in mutation order.
    write: tokio::sync::Mutex<()>,
}

impl FavoritesStore {
    /// Read the stored set once.
    pub async fn load(adapter: Arc<dyn PersistenceAdapter>) -> Self {
        let set = adapter.load().await;
        tracing::debug!(count = set.len(), "Loaded favorites");
        Self { set: Mutex::new(set), adapter, write: tokio::sync::Mutex::new(()) }
    }

    /// Add or remove `city` and persist the result.
    ///
    /// The in-memory change stands even if the write fails.
    pub async fn toggle(&self, city: &str) -> FavoritesSet {
        let _write = self.write.lock().await;
        let updated = {
            let mut set = self.set.lock();
            let added = set.toggle(city);
            tracing::debug!(city = %city, added, "Toggled favorite");
            set.clone()
        };

        if let Err(e) = self.adapter.save(&updated).await {
            tracing::warn!(error = %format!("{e:#}"), "Failed to persist favorites");
        }

        updated
    }

    pub fn contains(&self, city: &str) -> bool {
        self.set.lock().contains(city)
    }

    pub fn snapshot(&self) -> FavoritesSet {
        self.set.lock().clone()
    }
}
