//! HTTP client for the identity collaborator

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tracing::debug;

use crate::config::{BackendConfig, ClientOptions};
use crate::fetch::{Fetch, FetchError};
use crate::models::UserProfile;
use crate::services::IdentityService;

/// Errors surfaced by the identity collaborator
#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("an account with this email already exists")]
    EmailTaken,

    #[error("not signed in")]
    MissingSession,

    #[error(transparent)]
    Transport(#[from] FetchError),
}

/// Session information returned on sign-up and sign-in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
    pub user: UserProfile,
}

/// Identity client backed by the Ember auth endpoint
pub struct IdentityClient {
    url: String,
    key: String,
    client_info: String,
    http_client: Client,
    session: Arc<RwLock<Option<Session>>>,
}

impl IdentityClient {
    pub fn new(config: &BackendConfig, options: &ClientOptions, http_client: Client) -> Self {
        Self {
            url: config.endpoint(),
            key: config.api_key.clone(),
            client_info: options.client_info.clone(),
            http_client,
            session: Arc::new(RwLock::new(None)),
        }
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.url, path)
    }

    fn credentials_body(email: &str, password: &str) -> HashMap<&'static str, String> {
        let mut body = HashMap::new();
        body.insert("email", email.to_string());
        body.insert("password", password.to_string());
        body
    }

    fn store_session(&self, session: Session) {
        let mut current = self.session.write().expect("session lock poisoned");
        *current = Some(session);
    }

    /// The current session, if any
    pub fn session(&self) -> Option<Session> {
        self.session.read().expect("session lock poisoned").clone()
    }

    fn access_token(&self) -> Result<String, IdentityError> {
        self.session()
            .map(|s| s.access_token)
            .ok_or(IdentityError::MissingSession)
    }

    fn map_status(err: FetchError, on_conflict: IdentityError) -> IdentityError {
        match err {
            FetchError::Status { status, .. } if status.as_u16() == 400 || status.as_u16() == 401 => {
                IdentityError::InvalidCredentials
            }
            FetchError::Status { status, .. } if status.as_u16() == 409 || status.as_u16() == 422 => {
                on_conflict
            }
            other => IdentityError::Transport(other),
        }
    }
}

#[async_trait]
impl IdentityService for IdentityClient {
    async fn sign_up(&self, email: &str, password: &str) -> Result<UserProfile, IdentityError> {
        let url = self.auth_url("/signup");
        debug!("signing up {email}");

        let session: Session = Fetch::post(&self.http_client, &url)
            .header("apikey", &self.key)
            .header("X-Client-Info", &self.client_info)
            .json(&Self::credentials_body(email, password))?
            .execute()
            .await
            .map_err(|e| Self::map_status(e, IdentityError::EmailTaken))?;

        let user = session.user.clone();
        self.store_session(session);
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<UserProfile, IdentityError> {
        let url = self.auth_url("/token?grant_type=password");
        debug!("signing in {email}");

        let session: Session = Fetch::post(&self.http_client, &url)
            .header("apikey", &self.key)
            .header("X-Client-Info", &self.client_info)
            .json(&Self::credentials_body(email, password))?
            .execute()
            .await
            .map_err(|e| Self::map_status(e, IdentityError::InvalidCredentials))?;

        let user = session.user.clone();
        self.store_session(session);
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        let url = self.auth_url("/logout");
        let token = self.access_token()?;

        Fetch::post(&self.http_client, &url)
            .header("apikey", &self.key)
            .header("X-Client-Info", &self.client_info)
            .bearer_auth(&token)
            .execute_unit()
            .await?;

        let mut current = self.session.write().expect("session lock poisoned");
        *current = None;
        Ok(())
    }
}
