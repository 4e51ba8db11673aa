//! HTTP client for the commerce collaborator

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::config::{BackendConfig, ClientOptions};
use crate::fetch::{Fetch, FetchError};
use crate::models::{Entitlement, Product, PurchaseOutcome};
use crate::services::CommerceGateway;

/// Errors surfaced by the commerce collaborator
#[derive(Error, Debug)]
pub enum CommerceError {
    #[error("unknown product: {0}")]
    UnknownProduct(String),

    #[error(transparent)]
    Transport(#[from] FetchError),
}

#[derive(Debug, Deserialize)]
struct PurchaseResponse {
    outcome: PurchaseOutcome,
    #[allow(dead_code)]
    transaction_id: Option<String>,
}

/// Commerce client backed by the Ember commerce endpoint
pub struct CommerceClient {
    url: String,
    key: String,
    client_info: String,
    http_client: Client,
}

impl CommerceClient {
    pub fn new(config: &BackendConfig, options: &ClientOptions, http_client: Client) -> Self {
        Self {
            url: config.endpoint(),
            key: config.api_key.clone(),
            client_info: options.client_info.clone(),
            http_client,
        }
    }

    fn commerce_url(&self, path: &str) -> String {
        format!("{}/commerce/v1{}", self.url, path)
    }
}

#[async_trait]
impl CommerceGateway for CommerceClient {
    async fn products(&self, ids: &[String]) -> Result<Vec<Product>, CommerceError> {
        let url = self.commerce_url("/products");

        Fetch::get(&self.http_client, &url)
            .header("apikey", &self.key)
            .header("X-Client-Info", &self.client_info)
            .query("ids", &ids.join(","))
            .execute()
            .await
            .map_err(CommerceError::Transport)
    }

    async fn purchase(&self, product_id: &str) -> Result<PurchaseOutcome, CommerceError> {
        let url = self.commerce_url("/purchase");
        debug!("purchasing {product_id}");

        let response: PurchaseResponse = Fetch::post(&self.http_client, &url)
            .header("apikey", &self.key)
            .header("X-Client-Info", &self.client_info)
            .json(&json!({ "product_id": product_id }))?
            .execute()
            .await
            .map_err(|e| match e {
                FetchError::Status { status, .. } if status.as_u16() == 404 => {
                    CommerceError::UnknownProduct(product_id.to_string())
                }
                other => CommerceError::Transport(other),
            })?;

        Ok(response.outcome)
    }

    async fn restore(&self) -> Result<Vec<Entitlement>, CommerceError> {
        let url = self.commerce_url("/restore");

        Fetch::post(&self.http_client, &url)
            .header("apikey", &self.key)
            .header("X-Client-Info", &self.client_info)
            .execute()
            .await
            .map_err(CommerceError::Transport)
    }

    async fn current_entitlements(&self) -> Result<Vec<Entitlement>, CommerceError> {
        let url = self.commerce_url("/entitlements");

        Fetch::get(&self.http_client, &url)
            .header("apikey", &self.key)
            .header("X-Client-Info", &self.client_info)
            .execute()
            .await
            .map_err(CommerceError::Transport)
    }
}
