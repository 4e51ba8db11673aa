//! Collaborator interfaces and their default implementations.
//!
//! The managers only ever see these traits; the HTTP-backed clients in this
//! module are the production wiring, and [`memory`] holds in-memory stand-ins
//! for tests and offline development.

pub mod commerce;
pub mod docstore;
pub mod identity;
pub mod memory;
pub mod notify;
pub mod settings;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::models::{Entitlement, Product, PurchaseOutcome, UserProfile};
use commerce::CommerceError;
use docstore::StoreError;
use identity::IdentityError;
use notify::NotifyError;

/// The identity collaborator: account creation and session lifecycle
#[async_trait]
pub trait IdentityService: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<UserProfile, IdentityError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<UserProfile, IdentityError>;

    async fn sign_out(&self) -> Result<(), IdentityError>;
}

/// The document store collaborator.
///
/// Documents live in per-user sub-collections and are exchanged as plain
/// JSON values; the schema belongs to the store, not to this crate.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch every document in a user's sub-collection
    async fn fetch_all(&self, user_id: &str, collection: &str) -> Result<Vec<Value>, StoreError>;

    /// Create or replace a document by id
    async fn put(
        &self,
        user_id: &str,
        collection: &str,
        doc_id: &str,
        doc: Value,
    ) -> Result<(), StoreError>;

    /// Delete a document by id
    async fn delete(&self, user_id: &str, collection: &str, doc_id: &str)
        -> Result<(), StoreError>;

    /// Read a boolean flag from the user's root document
    async fn read_flag(&self, user_id: &str, key: &str) -> Result<Option<bool>, StoreError>;

    /// Write a boolean flag on the user's root document
    async fn write_flag(&self, user_id: &str, key: &str, value: bool) -> Result<(), StoreError>;
}

/// The local notification collaborator
#[async_trait]
pub trait NotificationScheduler: Send + Sync {
    /// One-time permission request; returns whether it was granted
    async fn request_permission(&self) -> Result<bool, NotifyError>;

    /// Register a notification under `id`, replacing any prior registration
    /// with the same key
    async fn schedule_at(
        &self,
        id: &str,
        fire_at: DateTime<Utc>,
        title: &str,
        body: &str,
    ) -> Result<(), NotifyError>;

    /// Remove a pending registration; unknown ids are ignored
    async fn cancel(&self, id: &str);
}

/// The commerce collaborator: products, purchases, and entitlements
#[async_trait]
pub trait CommerceGateway: Send + Sync {
    async fn products(&self, ids: &[String]) -> Result<Vec<Product>, CommerceError>;

    async fn purchase(&self, product_id: &str) -> Result<PurchaseOutcome, CommerceError>;

    async fn restore(&self) -> Result<Vec<Entitlement>, CommerceError>;

    async fn current_entitlements(&self) -> Result<Vec<Entitlement>, CommerceError>;
}
