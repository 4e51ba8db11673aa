//! Locally cached saved ideas with compensating removal.

use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

use crate::error::Error;
use crate::models::Idea;
use crate::services::docstore::collections;
use crate::services::DocumentStore;

/// Manager for the saved-ideas screen
pub struct SavedIdeas {
    store: Arc<dyn DocumentStore>,
    user_id: Option<String>,
    saved: Vec<Idea>,
    last_error: Option<String>,
}

impl SavedIdeas {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            user_id: None,
            saved: Vec::new(),
            last_error: None,
        }
    }

    /// The cached saved list, in saved order
    pub fn saved(&self) -> &[Idea] {
        &self.saved
    }

    /// Whether an idea is in the saved list
    pub fn contains(&self, idea_id: &str) -> bool {
        self.saved.iter().any(|i| i.id == idea_id)
    }

    /// The most recent error message, for inline display
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Replace the cache from the store
    pub async fn load(&mut self, user_id: &str) -> Result<(), Error> {
        let docs = match self.store.fetch_all(user_id, collections::SAVED_IDEAS).await {
            Ok(docs) => docs,
            Err(err) => {
                self.last_error = Some(err.to_string());
                return Err(err.into());
            }
        };

        self.user_id = Some(user_id.to_string());
        self.saved = docs.into_iter().filter_map(Self::decode_idea).collect();
        self.last_error = None;
        Ok(())
    }

    fn decode_idea(doc: Value) -> Option<Idea> {
        match serde_json::from_value(doc) {
            Ok(idea) => Some(idea),
            Err(err) => {
                warn!("skipping undecodable saved idea: {err}");
                None
            }
        }
    }

    /// Append an idea to the saved list. Already-saved ideas are a no-op.
    ///
    /// The append is local-first; the store write runs in the background.
    pub fn save(&mut self, idea: Idea) -> Result<(), Error> {
        if self.contains(&idea.id) {
            return Ok(());
        }
        let user_id = self.require_user()?;

        let doc = serde_json::to_value(&idea)?;
        self.saved.push(idea.clone());

        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            if let Err(err) = store
                .put(&user_id, collections::SAVED_IDEAS, &idea.id, doc)
                .await
            {
                warn!("failed to persist saved idea {}: {err}", idea.id);
            }
        });
        Ok(())
    }

    /// Remove an idea, compensating on store failure.
    ///
    /// The local removal is optimistic; if the store delete fails the idea
    /// is re-inserted at its original position and the error surfaced.
    pub async fn remove(&mut self, idea_id: &str) -> Result<(), Error> {
        let user_id = self.require_user()?;

        let index = match self.saved.iter().position(|i| i.id == idea_id) {
            Some(index) => index,
            None => return Ok(()),
        };
        let removed = self.saved.remove(index);

        match self
            .store
            .delete(&user_id, collections::SAVED_IDEAS, idea_id)
            .await
        {
            Ok(()) => {
                self.last_error = None;
                Ok(())
            }
            Err(err) => {
                let position = index.min(self.saved.len());
                self.saved.insert(position, removed);
                self.last_error = Some(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Drop all per-user state on sign-out
    pub fn clear(&mut self) {
        self.user_id = None;
        self.saved.clear();
        self.last_error = None;
    }

    fn require_user(&self) -> Result<String, Error> {
        self.user_id.clone().ok_or(Error::NoSession)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IdeaCategory, IdeaTier};
    use crate::services::memory::MemoryStore;

    fn idea(id: &str) -> Idea {
        Idea {
            id: id.to_string(),
            title: format!("Idea {id}"),
            description: "Something nice".to_string(),
            category: IdeaCategory::AtHome,
            difficulty: 1,
            impressiveness: 2,
            image: None,
            tier: IdeaTier::Free,
        }
    }

    async fn manager() -> (SavedIdeas, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let mut manager = SavedIdeas::new(Arc::clone(&store) as Arc<dyn DocumentStore>);
        manager.load("user-1").await.unwrap();
        (manager, store)
    }

    #[tokio::test]
    async fn save_appends_and_persists() {
        let (mut manager, store) = manager().await;

        manager.save(idea("a")).unwrap();
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }

        assert_eq!(manager.saved().len(), 1);
        assert_eq!(store.len("user-1", collections::SAVED_IDEAS), 1);
    }

    #[tokio::test]
    async fn saving_twice_is_a_no_op() {
        let (mut manager, _) = manager().await;

        manager.save(idea("a")).unwrap();
        manager.save(idea("a")).unwrap();

        assert_eq!(manager.saved().len(), 1);
    }

    #[tokio::test]
    async fn remove_deletes_from_the_store() {
        let (mut manager, store) = manager().await;
        manager.save(idea("a")).unwrap();
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }

        manager.remove("a").await.unwrap();

        assert!(manager.saved().is_empty());
        assert!(store.is_empty("user-1", collections::SAVED_IDEAS));
    }

    #[tokio::test]
    async fn failed_remove_restores_the_original_position() {
        let (mut manager, store) = manager().await;
        manager.save(idea("a")).unwrap();
        manager.save(idea("b")).unwrap();
        manager.save(idea("c")).unwrap();

        store.fail_deletes(true);
        let result = manager.remove("b").await;

        assert!(result.is_err());
        let order: Vec<&str> = manager.saved().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"], "b is back at its original index");
        assert!(manager.last_error().is_some());
    }

    #[tokio::test]
    async fn removing_an_unknown_id_is_a_no_op() {
        let (mut manager, _) = manager().await;
        manager.save(idea("a")).unwrap();

        manager.remove("missing").await.unwrap();

        assert_eq!(manager.saved().len(), 1);
    }

    #[tokio::test]
    async fn load_reflects_ideas_saved_from_the_feed() {
        let store = Arc::new(MemoryStore::new());
        store
            .put(
                "user-1",
                collections::SAVED_IDEAS,
                "a",
                serde_json::to_value(idea("a")).unwrap(),
            )
            .await
            .unwrap();

        let mut manager = SavedIdeas::new(Arc::clone(&store) as Arc<dyn DocumentStore>);
        manager.load("user-1").await.unwrap();

        assert!(manager.contains("a"));
    }
}
