//! Error handling for the Ember core crate

use std::fmt;
use thiserror::Error;

use crate::services::commerce::CommerceError;
use crate::services::docstore::StoreError;
use crate::services::identity::IdentityError;
use crate::services::notify::NotifyError;
use crate::services::settings::SettingsError;

/// Unified error type for the Ember core
#[derive(Error, Debug)]
pub enum Error {
    /// Input rejected before any collaborator was called
    #[error("{0}")]
    Validation(String),

    /// The item's category is locked behind the subscription
    #[error("this chapter is locked")]
    PaywallRequired,

    /// No user is signed in
    #[error("no active session")]
    NoSession,

    /// No entity with the given id
    #[error("unknown id: {0}")]
    UnknownId(String),

    /// Identity collaborator errors
    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Document store errors
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Notification scheduling errors
    #[error("notification error: {0}")]
    Notify(#[from] NotifyError),

    /// Commerce collaborator errors
    #[error("commerce error: {0}")]
    Commerce(#[from] CommerceError),

    /// Local settings errors
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client construction errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl Error {
    /// Create a new validation error
    pub fn validation<T: fmt::Display>(msg: T) -> Self {
        Error::Validation(msg.to_string())
    }
}
