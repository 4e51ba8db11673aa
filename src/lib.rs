//! Ember core library
//!
//! Platform-independent core of the Ember relationship companion app:
//! domain models, the feature managers behind each screen, and HTTP clients
//! for the backend collaborators (identity, document store, commerce).
//!
//! The managers only depend on the collaborator traits in [`services`], so
//! the view layer wires real clients in production and the in-memory
//! implementations in tests and previews.

pub mod catalog;
pub mod config;
pub mod entitlements;
pub mod error;
pub mod events;
pub mod fetch;
pub mod ideas;
pub mod models;
pub mod saved;
pub mod services;
pub mod session;
pub mod shell;
pub mod signal;
pub mod spark;

use reqwest::Client;
use std::sync::Arc;

use crate::config::{BackendConfig, ClientOptions};
use crate::error::Error;
use crate::ideas::ImageDecoder;
use crate::services::commerce::CommerceClient;
use crate::services::docstore::DocStoreClient;
use crate::services::identity::IdentityClient;
use crate::services::notify::LocalNotificationCenter;
use crate::services::settings::LocalSettings;
use crate::shell::{AppShell, Collaborators};

/// Entry point for the Ember backend clients
pub struct Ember {
    config: BackendConfig,
    options: ClientOptions,
    http_client: Client,
}

impl Ember {
    /// Create a new Ember handle with default options
    pub fn new(config: BackendConfig) -> Result<Self, Error> {
        Self::new_with_options(config, ClientOptions::default())
    }

    /// Create a new Ember handle with custom options
    pub fn new_with_options(config: BackendConfig, options: ClientOptions) -> Result<Self, Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        Ok(Self {
            config,
            options,
            http_client,
        })
    }

    /// Client for the identity collaborator
    pub fn identity(&self) -> IdentityClient {
        IdentityClient::new(&self.config, &self.options, self.http_client.clone())
    }

    /// Client for the document store collaborator
    pub fn store(&self) -> DocStoreClient {
        DocStoreClient::new(&self.config, &self.options, self.http_client.clone())
    }

    /// Client for the commerce collaborator
    pub fn commerce(&self) -> CommerceClient {
        CommerceClient::new(&self.config, &self.options, self.http_client.clone())
    }

    /// Assemble the full app shell over this backend.
    ///
    /// Notifications use the in-process center; the platform layer supplies
    /// the image decoder and the settings file location.
    pub fn shell(&self, settings: LocalSettings, decoder: Arc<dyn ImageDecoder>) -> AppShell {
        AppShell::new(Collaborators {
            identity: Arc::new(self.identity()),
            store: Arc::new(self.store()),
            scheduler: Arc::new(LocalNotificationCenter::new()),
            commerce: Arc::new(self.commerce()),
            decoder,
            settings,
        })
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::config::{BackendConfig, ClientOptions};
    pub use crate::error::Error;
    pub use crate::models::*;
    pub use crate::shell::{AppPhase, AppShell, Collaborators};
    pub use crate::signal::UiSignal;
    pub use crate::Ember;
}
