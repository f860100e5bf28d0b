use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use super::types::Region;

/// Errors that can occur while talking to the catalog service.
#[derive(Debug, Clone)]
pub enum CatalogError {
    /// Client misconfigured (bad base URL, TLS backend failure).
    Config(String),
    /// Network-level failure (timeout, DNS, connection refused).
    Network(String),
    /// The service answered with a non-success status.
    Api { status: u16, message: String },
    /// The body was not valid JSON.
    Parse(String),
}

impl CatalogError {
    /// The name endpoint answers 404 when nothing matches.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::Api { status: 404, .. })
    }
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Config(msg) => write!(f, "config error: {msg}"),
            CatalogError::Network(msg) => write!(f, "network error: {msg}"),
            CatalogError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            CatalogError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Which piece of directory state a request feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// The main country list (all / region / search).
    List,
    /// The neighbor list of the country being viewed.
    Borders,
}

/// One call against the catalog service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CatalogRequest {
    All,
    Region(Region),
    /// Name search; the query is already sanitized.
    Name(String),
    Codes(Vec<String>),
}

impl CatalogRequest {
    pub fn slot(&self) -> Slot {
        match self {
            CatalogRequest::Codes(_) => Slot::Borders,
            CatalogRequest::All | CatalogRequest::Region(_) | CatalogRequest::Name(_) => Slot::List,
        }
    }
}

impl fmt::Display for CatalogRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogRequest::All => write!(f, "all"),
            CatalogRequest::Region(region) => write!(f, "region/{region}"),
            CatalogRequest::Name(query) => write!(f, "name/{query}"),
            CatalogRequest::Codes(codes) => write!(f, "alpha?codes={}", codes.join(",")),
        }
    }
}

#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Returns the name of the client, for logs.
    fn name(&self) -> &str;

    /// Performs the request and returns the raw decoded payload.
    async fn fetch(&self, request: &CatalogRequest) -> Result<Value, CatalogError>;
}
