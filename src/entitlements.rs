//! Subscription state over the commerce collaborator.

use std::sync::Arc;
use tracing::{info, warn};

use crate::error::Error;
use crate::models::{Product, PurchaseOutcome};
use crate::services::settings::{keys, LocalSettings};
use crate::services::CommerceGateway;

/// Manager for the paywall and subscription state
pub struct EntitlementManager {
    commerce: Arc<dyn CommerceGateway>,
    settings: LocalSettings,
    subscribed: bool,
    products: Vec<Product>,
    last_error: Option<String>,
}

impl EntitlementManager {
    pub fn new(commerce: Arc<dyn CommerceGateway>, settings: LocalSettings) -> Self {
        Self {
            commerce,
            settings,
            subscribed: false,
            products: Vec::new(),
            last_error: None,
        }
    }

    /// Whether the user currently holds the subscription entitlement
    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    /// The loaded product listing
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// The most recent error message, for inline display
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Read the mirrored flag without touching the collaborator.
    ///
    /// Used at startup so the paywall state is right before the first
    /// network round-trip completes.
    pub fn load_cached(&mut self) -> bool {
        self.subscribed = self.settings.get_bool(keys::SUBSCRIBED).unwrap_or(false);
        self.subscribed
    }

    /// Re-derive the subscription flag from the current entitlements
    pub async fn refresh(&mut self) -> Result<bool, Error> {
        match self.commerce.current_entitlements().await {
            Ok(entitlements) => {
                self.set_subscribed(!entitlements.is_empty());
                self.last_error = None;
                Ok(self.subscribed)
            }
            Err(err) => {
                self.last_error = Some(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Load the paywall's product listing
    pub async fn load_products(&mut self, ids: &[String]) -> Result<(), Error> {
        match self.commerce.products(ids).await {
            Ok(products) => {
                self.products = products;
                self.last_error = None;
                Ok(())
            }
            Err(err) => {
                self.last_error = Some(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Run a purchase to its terminal state
    pub async fn purchase(&mut self, product_id: &str) -> Result<PurchaseOutcome, Error> {
        match self.commerce.purchase(product_id).await {
            Ok(outcome) => {
                info!("purchase of {product_id} finished: {outcome:?}");
                if outcome == PurchaseOutcome::Verified {
                    self.set_subscribed(true);
                }
                self.last_error = None;
                Ok(outcome)
            }
            Err(err) => {
                self.last_error = Some(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Restore previous purchases
    pub async fn restore(&mut self) -> Result<bool, Error> {
        match self.commerce.restore().await {
            Ok(entitlements) => {
                self.set_subscribed(!entitlements.is_empty());
                self.last_error = None;
                Ok(self.subscribed)
            }
            Err(err) => {
                self.last_error = Some(err.to_string());
                Err(err.into())
            }
        }
    }

    fn set_subscribed(&mut self, subscribed: bool) {
        self.subscribed = subscribed;
        // The mirror is a convenience cache; losing a write only delays the
        // next startup read, so it never fails the caller.
        if let Err(err) = self.settings.set_bool(keys::SUBSCRIBED, subscribed) {
            warn!("could not mirror the subscription flag: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::memory::StaticCommerce;

    fn manager_at(path: &std::path::Path) -> (EntitlementManager, Arc<StaticCommerce>) {
        let commerce = Arc::new(StaticCommerce::new());
        let settings = LocalSettings::open(path).unwrap();
        let manager = EntitlementManager::new(
            Arc::clone(&commerce) as Arc<dyn CommerceGateway>,
            settings,
        );
        (manager, commerce)
    }

    #[tokio::test]
    async fn refresh_derives_the_flag_from_entitlements() {
        let dir = tempfile::tempdir().unwrap();
        let (mut manager, commerce) = manager_at(&dir.path().join("settings.json"));

        assert!(!manager.refresh().await.unwrap());

        commerce.set_entitled(true);
        assert!(manager.refresh().await.unwrap());
        assert!(manager.is_subscribed());
    }

    #[tokio::test]
    async fn the_flag_is_mirrored_for_fast_startup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        {
            let (mut manager, commerce) = manager_at(&path);
            commerce.set_entitled(true);
            manager.refresh().await.unwrap();
        }

        // a fresh manager sees the cached value before any network call
        let (mut fresh, _) = manager_at(&path);
        assert!(fresh.load_cached());
    }

    #[tokio::test]
    async fn verified_purchase_flips_the_flag() {
        let dir = tempfile::tempdir().unwrap();
        let (mut manager, _) = manager_at(&dir.path().join("settings.json"));

        let outcome = manager.purchase("ember.plus.yearly").await.unwrap();

        assert_eq!(outcome, PurchaseOutcome::Verified);
        assert!(manager.is_subscribed());
    }

    #[tokio::test]
    async fn cancelled_purchase_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (mut manager, commerce) = manager_at(&dir.path().join("settings.json"));
        commerce.set_outcome(PurchaseOutcome::Cancelled);

        let outcome = manager.purchase("ember.plus.yearly").await.unwrap();

        assert_eq!(outcome, PurchaseOutcome::Cancelled);
        assert!(!manager.is_subscribed());
    }

    #[tokio::test]
    async fn unknown_product_surfaces_the_collaborator_error() {
        let dir = tempfile::tempdir().unwrap();
        let (mut manager, _) = manager_at(&dir.path().join("settings.json"));

        let result = manager.purchase("ember.plus.lifetime").await;

        assert!(matches!(result, Err(Error::Commerce(_))));
        assert!(manager.last_error().is_some());
    }

    #[tokio::test]
    async fn restore_recovers_the_entitlement() {
        let dir = tempfile::tempdir().unwrap();
        let (mut manager, commerce) = manager_at(&dir.path().join("settings.json"));
        commerce.set_entitled(true);

        assert!(manager.restore().await.unwrap());
        assert!(manager.is_subscribed());
    }

    #[tokio::test]
    async fn load_products_fills_the_listing() {
        let dir = tempfile::tempdir().unwrap();
        let (mut manager, _) = manager_at(&dir.path().join("settings.json"));

        manager
            .load_products(&["ember.plus.yearly".to_string()])
            .await
            .unwrap();

        assert_eq!(manager.products().len(), 1);
        assert_eq!(manager.products()[0].id, "ember.plus.yearly");
    }
}
