//! The Spark checklist: seeded prompts, completion toggles, chapter gating.

use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::catalog::SPARK_CATALOG;
use crate::error::Error;
use crate::models::{SparkCategory, SparkItem};
use crate::services::docstore::collections;
use crate::services::DocumentStore;
use crate::signal::{SignalHub, UiSignal};

/// Manager for the Spark checklist screens
pub struct SparkManager {
    store: Arc<dyn DocumentStore>,
    signals: SignalHub,
    user_id: Option<String>,
    entitled: bool,
    items: Vec<SparkItem>,
    last_error: Option<String>,
}

impl SparkManager {
    pub fn new(store: Arc<dyn DocumentStore>, signals: SignalHub) -> Self {
        Self {
            store,
            signals,
            user_id: None,
            entitled: false,
            items: Vec::new(),
            last_error: None,
        }
    }

    /// The checklist in catalog order
    pub fn items(&self) -> &[SparkItem] {
        &self.items
    }

    /// Items belonging to one chapter, in catalog order
    pub fn chapter(&self, category: SparkCategory) -> Vec<&SparkItem> {
        self.items.iter().filter(|i| i.category == category).collect()
    }

    /// The most recent error message, for inline display
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Mirror of the entitlement flag, injected by the shell
    pub fn set_entitled(&mut self, entitled: bool) {
        self.entitled = entitled;
    }

    /// Whether the user may toggle items in this chapter
    pub fn is_unlocked(&self, category: SparkCategory) -> bool {
        category.is_free() || self.entitled
    }

    /// Load the user's checklist, seeding it from the catalog on first use.
    ///
    /// Seeding only happens when the store comes back empty, so calling this
    /// repeatedly never duplicates items.
    pub async fn fetch(&mut self, user_id: &str) -> Result<(), Error> {
        let docs = match self.store.fetch_all(user_id, collections::SPARK_ITEMS).await {
            Ok(docs) => docs,
            Err(err) => {
                self.last_error = Some(err.to_string());
                return Err(err.into());
            }
        };

        self.user_id = Some(user_id.to_string());
        self.last_error = None;

        if docs.is_empty() {
            self.items = self.seed(user_id).await?;
        } else {
            let mut items: Vec<SparkItem> =
                docs.into_iter().filter_map(Self::decode_item).collect();
            items.sort_by_key(|i| i.position);
            self.items = items;
        }
        Ok(())
    }

    /// Project the catalog into fresh per-user items and persist each one.
    ///
    /// Individual write failures are logged and skipped; the item still
    /// exists locally and will be re-seeded on the next empty fetch.
    async fn seed(&self, user_id: &str) -> Result<Vec<SparkItem>, Error> {
        info!("seeding spark checklist for {user_id}");
        let items: Vec<SparkItem> = SPARK_CATALOG
            .iter()
            .enumerate()
            .map(|(position, (category, prompt))| SparkItem {
                id: Uuid::new_v4(),
                prompt: prompt.to_string(),
                category: *category,
                position: position as u32,
                completed: false,
            })
            .collect();

        for item in &items {
            let doc = serde_json::to_value(item)?;
            if let Err(err) = self
                .store
                .put(user_id, collections::SPARK_ITEMS, &item.id.to_string(), doc)
                .await
            {
                warn!("failed to persist seeded item {}: {err}", item.id);
            }
        }
        Ok(items)
    }

    fn decode_item(doc: Value) -> Option<SparkItem> {
        match serde_json::from_value(doc) {
            Ok(item) => Some(item),
            Err(err) => {
                warn!("skipping undecodable spark item: {err}");
                None
            }
        }
    }

    /// Toggle an item's completion.
    ///
    /// Locked chapters raise the paywall signal and change nothing. Allowed
    /// toggles flip locally and persist best-effort in the background.
    pub fn toggle(&mut self, id: Uuid) -> Result<bool, Error> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| Error::UnknownId(id.to_string()))?;

        if !(item.category.is_free() || self.entitled) {
            self.signals.emit(UiSignal::PaywallPrompt);
            return Err(Error::PaywallRequired);
        }

        item.completed = !item.completed;

        if let Some(user_id) = &self.user_id {
            match serde_json::to_value(&*item) {
                Ok(doc) => {
                    let store = Arc::clone(&self.store);
                    let user_id = user_id.clone();
                    let doc_id = item.id.to_string();
                    tokio::spawn(async move {
                        if let Err(err) = store
                            .put(&user_id, collections::SPARK_ITEMS, &doc_id, doc)
                            .await
                        {
                            warn!("failed to persist spark toggle for {doc_id}: {err}");
                        }
                    });
                }
                Err(err) => warn!("could not encode spark item {id}: {err}"),
            }
        }

        Ok(item.completed)
    }

    /// Number of completed items
    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|i| i.completed).count()
    }

    /// Total number of items
    pub fn total_count(&self) -> usize {
        self.items.len()
    }

    /// Completion percentage across the whole checklist, 0 when empty
    pub fn completion_percent(&self) -> f64 {
        completion_percent(self.completed_count(), self.total_count())
    }

    /// (completed, total) for one chapter
    pub fn category_progress(&self, category: SparkCategory) -> (usize, usize) {
        let chapter = self.chapter(category);
        let completed = chapter.iter().filter(|i| i.completed).count();
        (completed, chapter.len())
    }

    /// Drop all per-user state on sign-out
    pub fn clear(&mut self) {
        self.user_id = None;
        self.entitled = false;
        self.items.clear();
        self.last_error = None;
    }
}

fn completion_percent(completed: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64 * 100.0
    }
}
