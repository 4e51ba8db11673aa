//! Top-level shell: owns the managers and routes between app phases.
//!
//! Managers never talk to each other; this is the one place where session,
//! entitlement, and per-user data flows are stitched together.

use std::sync::Arc;
use tracing::{info, warn};

use crate::entitlements::EntitlementManager;
use crate::error::Error;
use crate::events::EventManager;
use crate::ideas::{IdeaFeed, ImageDecoder};
use crate::models::PurchaseOutcome;
use crate::saved::SavedIdeas;
use crate::services::settings::LocalSettings;
use crate::services::{CommerceGateway, DocumentStore, IdentityService, NotificationScheduler};
use crate::session::SessionManager;
use crate::signal::SignalHub;
use crate::spark::SparkManager;

/// The screen family the shell is currently presenting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppPhase {
    /// Startup, before cached state is loaded
    Splash,
    /// Signed in but onboarding not finished
    Onboarding,
    /// No signed-in user
    SignedOut,
    /// The main tab bar
    Main,
}

/// The injected collaborator set
pub struct Collaborators {
    pub identity: Arc<dyn IdentityService>,
    pub store: Arc<dyn DocumentStore>,
    pub scheduler: Arc<dyn NotificationScheduler>,
    pub commerce: Arc<dyn CommerceGateway>,
    pub decoder: Arc<dyn ImageDecoder>,
    pub settings: LocalSettings,
}

/// Owns every manager and the signal hub
pub struct AppShell {
    signals: SignalHub,
    pub session: SessionManager,
    pub events: EventManager,
    pub spark: SparkManager,
    pub ideas: IdeaFeed,
    pub saved: SavedIdeas,
    pub entitlements: EntitlementManager,
    scheduler: Arc<dyn NotificationScheduler>,
    bootstrapped: bool,
}

impl AppShell {
    pub fn new(collaborators: Collaborators) -> Self {
        let signals = SignalHub::new();

        Self {
            session: SessionManager::new(
                Arc::clone(&collaborators.identity),
                Arc::clone(&collaborators.store),
            ),
            events: EventManager::new(
                Arc::clone(&collaborators.store),
                Arc::clone(&collaborators.scheduler),
                signals.clone(),
            ),
            spark: SparkManager::new(Arc::clone(&collaborators.store), signals.clone()),
            ideas: IdeaFeed::new(
                Arc::clone(&collaborators.store),
                Arc::clone(&collaborators.decoder),
            ),
            saved: SavedIdeas::new(Arc::clone(&collaborators.store)),
            entitlements: EntitlementManager::new(
                Arc::clone(&collaborators.commerce),
                collaborators.settings,
            ),
            scheduler: collaborators.scheduler,
            signals,
            bootstrapped: false,
        }
    }

    /// The shared signal hub, for the view layer to subscribe to
    pub fn signals(&self) -> &SignalHub {
        &self.signals
    }

    /// Which screen family to present
    pub fn phase(&self) -> AppPhase {
        if !self.bootstrapped {
            AppPhase::Splash
        } else if self.session.current_user().is_none() {
            AppPhase::SignedOut
        } else if !self.session.is_onboarded() {
            AppPhase::Onboarding
        } else {
            AppPhase::Main
        }
    }

    /// Load cached state and request notification permission.
    ///
    /// Runs once behind the splash screen; nothing here blocks on the
    /// network.
    pub async fn bootstrap(&mut self) {
        match self.scheduler.request_permission().await {
            Ok(true) => {}
            Ok(false) => info!("notification permission denied"),
            Err(err) => warn!("notification permission request failed: {err}"),
        }

        let cached = self.entitlements.load_cached();
        self.spark.set_entitled(cached);
        self.bootstrapped = true;
    }

    /// Sign in and load the user's data
    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<(), Error> {
        self.session.sign_in(email, password).await?;
        self.activate().await;
        Ok(())
    }

    /// Create an account and load its (empty) data
    pub async fn sign_up(
        &mut self,
        email: &str,
        password: &str,
        confirmation: &str,
    ) -> Result<(), Error> {
        self.session.sign_up(email, password, confirmation).await?;
        self.activate().await;
        Ok(())
    }

    /// Sign out and drop all per-user state
    pub async fn sign_out(&mut self) -> Result<(), Error> {
        self.session.sign_out().await?;
        self.events.clear();
        self.spark.clear();
        self.saved.clear();
        Ok(())
    }

    /// Mark onboarding finished
    pub async fn complete_onboarding(&mut self) -> Result<(), Error> {
        self.session.complete_onboarding().await
    }

    /// Re-derive the entitlement flag and mirror it into the checklist
    pub async fn refresh_entitlements(&mut self) -> Result<bool, Error> {
        let subscribed = self.entitlements.refresh().await?;
        self.spark.set_entitled(subscribed);
        Ok(subscribed)
    }

    /// Purchase a product and, when verified, unlock the checklist
    pub async fn purchase(&mut self, product_id: &str) -> Result<PurchaseOutcome, Error> {
        let outcome = self.entitlements.purchase(product_id).await?;
        self.spark.set_entitled(self.entitlements.is_subscribed());
        Ok(outcome)
    }

    /// Restore purchases and mirror the result into the checklist
    pub async fn restore_purchases(&mut self) -> Result<bool, Error> {
        let subscribed = self.entitlements.restore().await?;
        self.spark.set_entitled(subscribed);
        Ok(subscribed)
    }

    /// Fan the signed-in user id out to the per-user managers.
    ///
    /// Each load is independent; one failing leaves its manager surfacing
    /// the error while the others proceed.
    async fn activate(&mut self) {
        let user_id = match self.session.current_user() {
            Some(user) => user.id.clone(),
            None => return,
        };

        if let Err(err) = self.events.fetch(&user_id).await {
            warn!("loading events failed: {err}");
        }
        if let Err(err) = self.spark.fetch(&user_id).await {
            warn!("loading the checklist failed: {err}");
        }
        if let Err(err) = self.saved.load(&user_id).await {
            warn!("loading saved ideas failed: {err}");
        }
        match self.entitlements.refresh().await {
            Ok(subscribed) => self.spark.set_entitled(subscribed),
            Err(err) => warn!("refreshing entitlements failed: {err}"),
        }
    }
}
