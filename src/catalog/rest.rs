//! REST client for the public country catalog (`restcountries.com`, v3.1 layout).
//!
//! Endpoints:
//! - `GET {base}/all`
//! - `GET {base}/region/{region}`
//! - `GET {base}/name/{query}`
//! - `GET {base}/alpha?codes={csv}`

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::Url;
use serde_json::Value;

use crate::catalog::{CatalogClient, CatalogError, CatalogRequest};

pub const DEFAULT_BASE_URL: &str = "https://restcountries.com/v3.1";

pub struct RestCountriesClient {
    base_url: String,
    client: reqwest::Client,
}

impl RestCountriesClient {
    /// Builds a client. `timeout` bounds each request end to end; `None` waits forever.
    pub fn new(base_url: Option<String>, timeout: Option<Duration>) -> Result<Self, CatalogError> {
        let base_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| CatalogError::Config(e.to_string()))?;

        Ok(Self { base_url, client })
    }

    /// Resolves a request to its full URL.
    pub fn endpoint_url(&self, request: &CatalogRequest) -> Result<Url, CatalogError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| CatalogError::Config(format!("invalid base URL {}: {e}", self.base_url)))?;

        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                CatalogError::Config(format!("base URL cannot carry a path: {}", self.base_url))
            })?;
            segments.pop_if_empty();
            match request {
                CatalogRequest::All => {
                    segments.push("all");
                }
                CatalogRequest::Region(region) => {
                    segments.push("region").push(region.as_str());
                }
                CatalogRequest::Name(query) => {
                    segments.push("name").push(query);
                }
                CatalogRequest::Codes(_) => {
                    segments.push("alpha");
                }
            }
        }

        if let CatalogRequest::Codes(codes) = request {
            url.query_pairs_mut().append_pair("codes", &codes.join(","));
        }

        Ok(url)
    }
}

#[async_trait]
impl CatalogClient for RestCountriesClient {
    fn name(&self) -> &str {
        "restcountries"
    }

    async fn fetch(&self, request: &CatalogRequest) -> Result<Value, CatalogError> {
        let url = self.endpoint_url(request)?;
        info!("Catalog request: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        debug!("Catalog response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let err_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("Catalog API error for {}: {} - {}", request, status, err_body);
            return Err(CatalogError::Api {
                status,
                message: err_body,
            });
        }

        response.json::<Value>().await.map_err(|e| {
            if e.is_decode() {
                CatalogError::Parse(e.to_string())
            } else {
                CatalogError::Network(e.to_string())
            }
        })
    }
}
