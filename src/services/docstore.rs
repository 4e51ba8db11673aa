//! HTTP client for the per-user document store

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use crate::config::{BackendConfig, ClientOptions};
use crate::fetch::{Fetch, FetchError};
use crate::services::DocumentStore;

/// Names of the per-user sub-collections owned by the app
pub mod collections {
    pub const EVENTS: &str = "events";
    pub const SPARK_ITEMS: &str = "spark_items";
    pub const SAVED_IDEAS: &str = "saved_ideas";
    pub const LIKED_IDEAS: &str = "liked_ideas";
}

/// Keys on the user's root document
pub mod flags {
    pub const ONBOARDING_COMPLETE: &str = "onboarding_complete";
}

/// Errors surfaced by the document store collaborator
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("document not found")]
    NotFound,

    #[error(transparent)]
    Transport(#[from] FetchError),
}

impl StoreError {
    fn from_fetch(err: FetchError) -> Self {
        match err {
            FetchError::Status { status, .. } if status.as_u16() == 404 => StoreError::NotFound,
            other => StoreError::Transport(other),
        }
    }
}

/// Document store client backed by the Ember store endpoint
pub struct DocStoreClient {
    url: String,
    key: String,
    client_info: String,
    http_client: Client,
}

impl DocStoreClient {
    pub fn new(config: &BackendConfig, options: &ClientOptions, http_client: Client) -> Self {
        Self {
            url: config.endpoint(),
            key: config.api_key.clone(),
            client_info: options.client_info.clone(),
            http_client,
        }
    }

    fn user_url(&self, user_id: &str) -> String {
        format!("{}/store/v1/users/{}", self.url, user_id)
    }

    fn collection_url(&self, user_id: &str, collection: &str) -> String {
        format!("{}/{}", self.user_url(user_id), collection)
    }

    fn doc_url(&self, user_id: &str, collection: &str, doc_id: &str) -> String {
        format!("{}/{}", self.collection_url(user_id, collection), doc_id)
    }
}

#[async_trait]
impl DocumentStore for DocStoreClient {
    async fn fetch_all(&self, user_id: &str, collection: &str) -> Result<Vec<Value>, StoreError> {
        let url = self.collection_url(user_id, collection);
        debug!("fetching {collection} for {user_id}");

        Fetch::get(&self.http_client, &url)
            .header("apikey", &self.key)
            .header("X-Client-Info", &self.client_info)
            .execute()
            .await
            .map_err(StoreError::from_fetch)
    }

    async fn put(
        &self,
        user_id: &str,
        collection: &str,
        doc_id: &str,
        doc: Value,
    ) -> Result<(), StoreError> {
        let url = self.doc_url(user_id, collection, doc_id);

        Fetch::put(&self.http_client, &url)
            .header("apikey", &self.key)
            .header("X-Client-Info", &self.client_info)
            .json(&doc)
            .map_err(StoreError::Transport)?
            .execute_unit()
            .await
            .map_err(StoreError::from_fetch)
    }

    async fn delete(
        &self,
        user_id: &str,
        collection: &str,
        doc_id: &str,
    ) -> Result<(), StoreError> {
        let url = self.doc_url(user_id, collection, doc_id);

        Fetch::delete(&self.http_client, &url)
            .header("apikey", &self.key)
            .header("X-Client-Info", &self.client_info)
            .execute_unit()
            .await
            .map_err(StoreError::from_fetch)
    }

    async fn read_flag(&self, user_id: &str, key: &str) -> Result<Option<bool>, StoreError> {
        let url = self.user_url(user_id);

        let doc: Value = match Fetch::get(&self.http_client, &url)
            .header("apikey", &self.key)
            .header("X-Client-Info", &self.client_info)
            .execute()
            .await
            .map_err(StoreError::from_fetch)
        {
            Ok(doc) => doc,
            // A user without a root document simply has no flags set yet.
            Err(StoreError::NotFound) => return Ok(None),
            Err(other) => return Err(other),
        };

        Ok(doc.get(key).and_then(Value::as_bool))
    }

    async fn write_flag(&self, user_id: &str, key: &str, value: bool) -> Result<(), StoreError> {
        let url = self.user_url(user_id);

        Fetch::patch(&self.http_client, &url)
            .header("apikey", &self.key)
            .header("X-Client-Info", &self.client_info)
            .json(&json!({ key: value }))
            .map_err(StoreError::Transport)?
            .execute_unit()
            .await
            .map_err(StoreError::from_fetch)
    }
}
