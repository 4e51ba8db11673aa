//! HTTP request helper shared by the backend service clients

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use url::Url;

/// Errors raised while building or executing a request
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },
}

/// Helper for building and executing HTTP requests
pub struct FetchBuilder<'a> {
    client: &'a Client,
    url: String,
    method: Method,
    headers: HeaderMap,
    query_params: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

impl<'a> FetchBuilder<'a> {
    /// Create a new FetchBuilder
    pub fn new(client: &'a Client, url: &str, method: Method) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        Self {
            client,
            url: url.to_string(),
            method,
            headers,
            query_params: Vec::new(),
            body: None,
        }
    }

    /// Add a header to the request
    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Add bearer token authentication to the request
    pub fn bearer_auth(self, token: &str) -> Self {
        self.header("Authorization", &format!("Bearer {}", token))
    }

    /// Append a query parameter to the request
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query_params.push((key.to_string(), value.to_string()));
        self
    }

    /// Add a JSON body to the request
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, FetchError> {
        self.body = Some(serde_json::to_vec(body)?);
        Ok(self)
    }

    fn build(&self) -> Result<RequestBuilder, FetchError> {
        let mut url = Url::parse(&self.url)?;

        if !self.query_params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query_params {
                pairs.append_pair(key, value);
            }
        }

        let mut req = self.client.request(self.method.clone(), url.as_str());
        req = req.headers(self.headers.clone());

        if let Some(body) = &self.body {
            req = req.body(body.clone());
        }

        Ok(req)
    }

    async fn send_checked(&self) -> Result<reqwest::Response, FetchError> {
        let response = self.build()?.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        Ok(response)
    }

    /// Execute the request and parse the response as JSON
    pub async fn execute<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
        let response = self.send_checked().await?;
        Ok(response.json::<T>().await?)
    }

    /// Execute the request, checking only the status code
    pub async fn execute_unit(&self) -> Result<(), FetchError> {
        self.send_checked().await?;
        Ok(())
    }
}

/// Helper for creating HTTP requests
pub struct Fetch;

impl Fetch {
    /// Create a GET request
    pub fn get<'a>(client: &'a Client, url: &str) -> FetchBuilder<'a> {
        FetchBuilder::new(client, url, Method::GET)
    }

    /// Create a POST request
    pub fn post<'a>(client: &'a Client, url: &str) -> FetchBuilder<'a> {
        FetchBuilder::new(client, url, Method::POST)
    }

    /// Create a PUT request
    pub fn put<'a>(client: &'a Client, url: &str) -> FetchBuilder<'a> {
        FetchBuilder::new(client, url, Method::PUT)
    }

    /// Create a PATCH request
    pub fn patch<'a>(client: &'a Client, url: &str) -> FetchBuilder<'a> {
        FetchBuilder::new(client, url, Method::PATCH)
    }

    /// Create a DELETE request
    pub fn delete<'a>(client: &'a Client, url: &str) -> FetchBuilder<'a> {
        FetchBuilder::new(client, url, Method::DELETE)
    }
}
