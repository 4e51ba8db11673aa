//! The swipeable date-idea deck.
//!
//! The deck is loaded once from the bundled catalog and never changes within
//! a session; the cursor is the only mutable navigation state. Two edge
//! policies coexist on purpose: the card deck clamps at the ends, the swipe
//! screen wraps around.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::warn;

use crate::catalog;
use crate::models::Idea;
use crate::services::docstore::collections;
use crate::services::DocumentStore;

/// A decoded image ready for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Errors raised by an image decoder
#[derive(Error, Debug, Clone)]
#[error("image decode failed: {0}")]
pub struct ImageDecodeError(pub String);

/// Platform hook that turns bundled image bytes into pixels
pub trait ImageDecoder: Send + Sync + 'static {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, ImageDecodeError>;
}

/// Manager for the idea deck and swipe screens
pub struct IdeaFeed {
    store: Arc<dyn DocumentStore>,
    decoder: Arc<dyn ImageDecoder>,
    ideas: Vec<Idea>,
    cursor: usize,
    image_tx: watch::Sender<Option<DecodedImage>>,
}

impl IdeaFeed {
    /// Build the feed from the bundled catalog
    pub fn new(store: Arc<dyn DocumentStore>, decoder: Arc<dyn ImageDecoder>) -> Self {
        Self::with_ideas(store, decoder, catalog::bundled_ideas())
    }

    /// Build the feed from an explicit idea list
    pub fn with_ideas(
        store: Arc<dyn DocumentStore>,
        decoder: Arc<dyn ImageDecoder>,
        ideas: Vec<Idea>,
    ) -> Self {
        let ideas = if ideas.is_empty() {
            warn!("idea feed constructed empty, using the fallback sample");
            catalog::fallback_ideas()
        } else {
            ideas
        };
        let (image_tx, _) = watch::channel(None);

        Self {
            store,
            decoder,
            ideas,
            cursor: 0,
            image_tx,
        }
    }

    /// Every idea, in deck order
    pub fn ideas(&self) -> &[Idea] {
        &self.ideas
    }

    /// The idea under the cursor
    pub fn current(&self) -> &Idea {
        &self.ideas[self.cursor]
    }

    /// The cursor position
    pub fn index(&self) -> usize {
        self.cursor
    }

    /// Deck navigation: step forward, stopping at the last card
    pub fn advance(&mut self) {
        if self.cursor + 1 < self.ideas.len() {
            self.cursor += 1;
        }
    }

    /// Deck navigation: step back, stopping at the first card
    pub fn retreat(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Swipe navigation: step forward, wrapping past the last card
    pub fn swipe_next(&mut self) {
        self.cursor = (self.cursor + 1) % self.ideas.len();
    }

    /// Swipe navigation: step back, wrapping past the first card
    pub fn swipe_previous(&mut self) {
        self.cursor = (self.cursor + self.ideas.len() - 1) % self.ideas.len();
    }

    /// Record a like for the current idea. Best-effort; nothing is tracked
    /// locally (the saved-items manager owns saved state).
    pub fn like(&self, user_id: &str) {
        self.forward_current(user_id, collections::LIKED_IDEAS);
    }

    /// Bookmark the current idea for the user. Best-effort, mirrored into
    /// the saved-items manager on its next load.
    pub fn save_for(&self, user_id: &str) {
        self.forward_current(user_id, collections::SAVED_IDEAS);
    }

    fn forward_current(&self, user_id: &str, collection: &'static str) {
        let idea = self.current().clone();
        let doc = match serde_json::to_value(&idea) {
            Ok(doc) => doc,
            Err(err) => {
                warn!("could not encode idea {}: {err}", idea.id);
                return;
            }
        };

        let store = Arc::clone(&self.store);
        let user_id = user_id.to_string();
        tokio::spawn(async move {
            if let Err(err) = store.put(&user_id, collection, &idea.id, doc).await {
                warn!("failed to record {collection} for {}: {err}", idea.id);
            }
        });
    }

    /// A shareable one-liner for the current idea
    pub fn share_text(&self) -> String {
        let idea = self.current();
        format!("Date idea: {} - {}", idea.title, idea.description)
    }

    /// Receiver for decoded images; holds the latest decode result
    pub fn images(&self) -> watch::Receiver<Option<DecodedImage>> {
        self.image_tx.subscribe()
    }

    /// Decode image bytes off the UI task and publish the result.
    ///
    /// Latest request wins; a superseded decode still runs to completion and
    /// is simply overwritten when it lands out of order. The returned handle
    /// can be ignored.
    pub fn decode_image(&self, bytes: Vec<u8>) -> tokio::task::JoinHandle<()> {
        let decoder = Arc::clone(&self.decoder);
        let image_tx = self.image_tx.clone();

        tokio::task::spawn_blocking(move || {
            match decoder.decode(&bytes) {
                Ok(image) => {
                    let _ = image_tx.send(Some(image));
                }
                Err(err) => warn!("idea image decode failed: {err}"),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IdeaCategory, IdeaTier};
    use crate::services::memory::MemoryStore;

    struct StubDecoder;

    impl ImageDecoder for StubDecoder {
        fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, ImageDecodeError> {
            if bytes.is_empty() {
                return Err(ImageDecodeError("empty input".to_string()));
            }
            Ok(DecodedImage {
                width: 1,
                height: 1,
                pixels: bytes.to_vec(),
            })
        }
    }

    fn idea(id: &str) -> Idea {
        Idea {
            id: id.to_string(),
            title: format!("Idea {id}"),
            description: "Something nice".to_string(),
            category: IdeaCategory::Romantic,
            difficulty: 2,
            impressiveness: 3,
            image: None,
            tier: IdeaTier::Free,
        }
    }

    fn feed_with(ids: &[&str]) -> (IdeaFeed, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let feed = IdeaFeed::with_ideas(
            Arc::clone(&store) as Arc<dyn DocumentStore>,
            Arc::new(StubDecoder),
            ids.iter().map(|id| idea(id)).collect(),
        );
        (feed, store)
    }

    #[tokio::test]
    async fn deck_navigation_clamps_at_both_ends() {
        let (mut feed, _) = feed_with(&["a", "b", "c"]);

        feed.retreat();
        assert_eq!(feed.index(), 0);

        feed.advance();
        feed.advance();
        assert_eq!(feed.index(), 2);
        feed.advance();
        assert_eq!(feed.index(), 2, "advance at the last card is a no-op");
    }

    #[tokio::test]
    async fn swipe_navigation_wraps_both_directions() {
        let (mut feed, _) = feed_with(&["a", "b", "c"]);

        feed.swipe_previous();
        assert_eq!(feed.index(), 2);

        feed.swipe_next();
        assert_eq!(feed.index(), 0);

        feed.swipe_next();
        feed.swipe_next();
        feed.swipe_next();
        assert_eq!(feed.index(), 0, "wraps past the end");
    }

    #[tokio::test]
    async fn empty_input_falls_back_to_the_sample() {
        let (feed, _) = feed_with(&[]);
        assert_eq!(feed.ideas().len(), 3);
    }

    #[tokio::test]
    async fn like_and_save_forward_the_current_idea() {
        let (feed, store) = feed_with(&["a", "b"]);

        feed.like("user-1");
        feed.save_for("user-1");
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }

        assert_eq!(store.len("user-1", collections::LIKED_IDEAS), 1);
        assert_eq!(store.len("user-1", collections::SAVED_IDEAS), 1);
    }

    #[tokio::test]
    async fn share_text_names_the_current_idea() {
        let (mut feed, _) = feed_with(&["a", "b"]);
        feed.advance();
        assert!(feed.share_text().contains("Idea b"));
    }

    #[tokio::test]
    async fn decoded_images_publish_on_the_watch_channel() {
        let (feed, _) = feed_with(&["a"]);
        let mut images = feed.images();

        feed.decode_image(vec![1, 2, 3]);
        images.changed().await.unwrap();

        let decoded = images.borrow().clone().unwrap();
        assert_eq!(decoded.pixels, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn failed_decodes_publish_nothing() {
        let (feed, _) = feed_with(&["a"]);
        let images = feed.images();

        feed.decode_image(Vec::new()).await.unwrap();

        assert!(images.borrow().is_none());
    }
}
