//! Session lifecycle over the identity collaborator.

use std::sync::Arc;
use tracing::info;

use crate::error::Error;
use crate::models::UserProfile;
use crate::services::docstore::flags;
use crate::services::{DocumentStore, IdentityService};

/// Manager for sign-in, sign-up, sign-out, and the onboarding flag
pub struct SessionManager {
    identity: Arc<dyn IdentityService>,
    store: Arc<dyn DocumentStore>,
    current_user: Option<UserProfile>,
    onboarded: bool,
    last_error: Option<String>,
}

impl SessionManager {
    pub fn new(identity: Arc<dyn IdentityService>, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            identity,
            store,
            current_user: None,
            onboarded: false,
            last_error: None,
        }
    }

    /// The signed-in user, if any
    pub fn current_user(&self) -> Option<&UserProfile> {
        self.current_user.as_ref()
    }

    /// Whether the signed-in user finished onboarding
    pub fn is_onboarded(&self) -> bool {
        self.onboarded
    }

    /// The most recent error message, for inline display
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Sign an existing user in
    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<(), Error> {
        if let Err(err) = validate_credentials(email, password) {
            self.last_error = Some(err.to_string());
            return Err(err);
        }

        match self.identity.sign_in(email, password).await {
            Ok(user) => {
                info!("signed in {}", user.id);
                self.activate(user).await;
                Ok(())
            }
            Err(err) => {
                self.last_error = Some(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Create an account and sign it in
    pub async fn sign_up(
        &mut self,
        email: &str,
        password: &str,
        confirmation: &str,
    ) -> Result<(), Error> {
        let validation = validate_credentials(email, password).and_then(|()| {
            if password != confirmation {
                Err(Error::validation("Passwords do not match"))
            } else {
                Ok(())
            }
        });
        if let Err(err) = validation {
            self.last_error = Some(err.to_string());
            return Err(err);
        }

        match self.identity.sign_up(email, password).await {
            Ok(user) => {
                info!("signed up {}", user.id);
                self.activate(user).await;
                Ok(())
            }
            Err(err) => {
                self.last_error = Some(err.to_string());
                Err(err.into())
            }
        }
    }

    async fn activate(&mut self, user: UserProfile) {
        // A missing or unreadable flag just means onboarding runs again;
        // not worth failing the sign-in over.
        self.onboarded = self
            .store
            .read_flag(&user.id, flags::ONBOARDING_COMPLETE)
            .await
            .unwrap_or(None)
            .unwrap_or(false);
        self.current_user = Some(user);
        self.last_error = None;
    }

    /// Sign the current user out
    pub async fn sign_out(&mut self) -> Result<(), Error> {
        match self.identity.sign_out().await {
            Ok(()) => {
                self.current_user = None;
                self.onboarded = false;
                self.last_error = None;
                Ok(())
            }
            Err(err) => {
                self.last_error = Some(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Mark onboarding finished for the signed-in user
    pub async fn complete_onboarding(&mut self) -> Result<(), Error> {
        let user = self.current_user.as_ref().ok_or(Error::NoSession)?;

        match self
            .store
            .write_flag(&user.id, flags::ONBOARDING_COMPLETE, true)
            .await
        {
            Ok(()) => {
                self.onboarded = true;
                Ok(())
            }
            Err(err) => {
                self.last_error = Some(err.to_string());
                Err(err.into())
            }
        }
    }
}

fn validate_credentials(email: &str, password: &str) -> Result<(), Error> {
    if email.trim().is_empty() {
        return Err(Error::validation("Email cannot be empty"));
    }
    if password.is_empty() {
        return Err(Error::validation("Password cannot be empty"));
    }
    Ok(())
}
