//! In-memory collaborators for tests and offline development

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::models::{Entitlement, Product, PurchaseOutcome, UserProfile};
use crate::services::commerce::CommerceError;
use crate::services::docstore::StoreError;
use crate::services::identity::IdentityError;
use crate::services::{CommerceGateway, DocumentStore, IdentityService};

/// Document store held entirely in memory.
///
/// `fail_puts`/`fail_deletes` make the next matching call return an error,
/// for exercising the managers' failure paths.
#[derive(Default)]
pub struct MemoryStore {
    // keyed by "user_id/collection", docs ordered by insertion id
    collections: Mutex<HashMap<String, BTreeMap<String, Value>>>,
    flags: Mutex<HashMap<String, bool>>,
    fail_puts: AtomicBool,
    fail_deletes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(user_id: &str, collection: &str) -> String {
        format!("{user_id}/{collection}")
    }

    /// Make every subsequent `put` fail until switched back off
    pub fn fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `delete` fail until switched back off
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Number of documents in a user's sub-collection
    pub fn len(&self, user_id: &str, collection: &str) -> usize {
        self.collections
            .lock()
            .expect("store lock poisoned")
            .get(&Self::key(user_id, collection))
            .map(BTreeMap::len)
            .unwrap_or(0)
    }

    /// Whether a user's sub-collection is empty
    pub fn is_empty(&self, user_id: &str, collection: &str) -> bool {
        self.len(user_id, collection) == 0
    }

    fn failure() -> StoreError {
        StoreError::Transport(crate::fetch::FetchError::Status {
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            body: "memory store configured to fail".to_string(),
        })
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn fetch_all(&self, user_id: &str, collection: &str) -> Result<Vec<Value>, StoreError> {
        let collections = self.collections.lock().expect("store lock poisoned");
        Ok(collections
            .get(&Self::key(user_id, collection))
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn put(
        &self,
        user_id: &str,
        collection: &str,
        doc_id: &str,
        doc: Value,
    ) -> Result<(), StoreError> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(Self::failure());
        }
        let mut collections = self.collections.lock().expect("store lock poisoned");
        collections
            .entry(Self::key(user_id, collection))
            .or_default()
            .insert(doc_id.to_string(), doc);
        Ok(())
    }

    async fn delete(
        &self,
        user_id: &str,
        collection: &str,
        doc_id: &str,
    ) -> Result<(), StoreError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(Self::failure());
        }
        let mut collections = self.collections.lock().expect("store lock poisoned");
        if let Some(docs) = collections.get_mut(&Self::key(user_id, collection)) {
            docs.remove(doc_id);
        }
        Ok(())
    }

    async fn read_flag(&self, user_id: &str, key: &str) -> Result<Option<bool>, StoreError> {
        let flags = self.flags.lock().expect("store lock poisoned");
        Ok(flags.get(&format!("{user_id}/{key}")).copied())
    }

    async fn write_flag(&self, user_id: &str, key: &str, value: bool) -> Result<(), StoreError> {
        let mut flags = self.flags.lock().expect("store lock poisoned");
        flags.insert(format!("{user_id}/{key}"), value);
        Ok(())
    }
}

/// Identity collaborator holding accounts in memory
#[derive(Default)]
pub struct MemoryIdentity {
    accounts: Mutex<HashMap<String, (String, UserProfile)>>,
}

impl MemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityService for MemoryIdentity {
    async fn sign_up(&self, email: &str, password: &str) -> Result<UserProfile, IdentityError> {
        let mut accounts = self.accounts.lock().expect("identity lock poisoned");
        if accounts.contains_key(email) {
            return Err(IdentityError::EmailTaken);
        }
        let profile = UserProfile {
            id: format!("user-{}", accounts.len() + 1),
            email: Some(email.to_string()),
        };
        accounts.insert(email.to_string(), (password.to_string(), profile.clone()));
        Ok(profile)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<UserProfile, IdentityError> {
        let accounts = self.accounts.lock().expect("identity lock poisoned");
        match accounts.get(email) {
            Some((stored, profile)) if stored == password => Ok(profile.clone()),
            _ => Err(IdentityError::InvalidCredentials),
        }
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        Ok(())
    }
}

/// Commerce collaborator with a configurable outcome and entitlement set
pub struct StaticCommerce {
    products: Vec<Product>,
    outcome: Mutex<PurchaseOutcome>,
    entitlements: Mutex<Vec<Entitlement>>,
}

impl StaticCommerce {
    pub fn new() -> Self {
        Self {
            products: vec![Product {
                id: "ember.plus.yearly".to_string(),
                title: "Ember Plus".to_string(),
                description: "Every chapter, every idea".to_string(),
                display_price: "$29.99".to_string(),
            }],
            outcome: Mutex::new(PurchaseOutcome::Verified),
            entitlements: Mutex::new(Vec::new()),
        }
    }

    /// Configure the outcome returned by the next purchases
    pub fn set_outcome(&self, outcome: PurchaseOutcome) {
        *self.outcome.lock().expect("commerce lock poisoned") = outcome;
    }

    /// Grant or revoke the subscription entitlement
    pub fn set_entitled(&self, entitled: bool) {
        let mut entitlements = self.entitlements.lock().expect("commerce lock poisoned");
        entitlements.clear();
        if entitled {
            entitlements.push(Entitlement {
                product_id: "ember.plus.yearly".to_string(),
                expires_at: None,
            });
        }
    }
}

impl Default for StaticCommerce {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommerceGateway for StaticCommerce {
    async fn products(&self, ids: &[String]) -> Result<Vec<Product>, CommerceError> {
        Ok(self
            .products
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn purchase(&self, product_id: &str) -> Result<PurchaseOutcome, CommerceError> {
        if !self.products.iter().any(|p| p.id == product_id) {
            return Err(CommerceError::UnknownProduct(product_id.to_string()));
        }
        let outcome = *self.outcome.lock().expect("commerce lock poisoned");
        if outcome == PurchaseOutcome::Verified {
            self.set_entitled(true);
        }
        Ok(outcome)
    }

    async fn restore(&self) -> Result<Vec<Entitlement>, CommerceError> {
        self.current_entitlements().await
    }

    async fn current_entitlements(&self) -> Result<Vec<Entitlement>, CommerceError> {
        Ok(self
            .entitlements
            .lock()
            .expect("commerce lock poisoned")
            .clone())
    }
}
