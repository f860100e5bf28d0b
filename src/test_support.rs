//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::oneshot;

use crate::catalog::{CatalogClient, CatalogError, CatalogRequest};
use crate::core::directory::{Directory, DirectorySettings};
use crate::core::preferences::Preferences;

struct Scripted {
    result: Result<Value, CatalogError>,
    gate: Option<oneshot::Receiver<()>>,
}

/// A catalog client that answers from a per-request script.
///
/// Responses are consumed in order; the last ungated response for a request
/// keeps answering. Unscripted requests fail with a network error.
#[derive(Default)]
pub struct FakeCatalog {
    script: Mutex<HashMap<CatalogRequest, VecDeque<Scripted>>>,
    calls: Mutex<Vec<CatalogRequest>>,
}

impl FakeCatalog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, request: CatalogRequest, result: Result<Value, CatalogError>) {
        self.push(request, Scripted { result, gate: None });
    }

    /// Scripts a response that is held back until the returned sender fires.
    pub fn respond_gated(
        &self,
        request: CatalogRequest,
        result: Result<Value, CatalogError>,
    ) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.push(request, Scripted { result, gate: Some(rx) });
        tx
    }

    /// Every request received so far, in order.
    pub fn calls(&self) -> Vec<CatalogRequest> {
        self.calls.lock().unwrap().clone()
    }

    fn push(&self, request: CatalogRequest, scripted: Scripted) {
        self.script
            .lock()
            .unwrap()
            .entry(request)
            .or_default()
            .push_back(scripted);
    }

    fn next(&self, request: &CatalogRequest) -> Option<Scripted> {
        let mut script = self.script.lock().unwrap();
        let queue = script.get_mut(request)?;
        match queue.len() {
            0 => None,
            1 if queue[0].gate.is_none() => Some(Scripted {
                result: queue[0].result.clone(),
                gate: None,
            }),
            _ => queue.pop_front(),
        }
    }
}

#[async_trait]
impl CatalogClient for FakeCatalog {
    fn name(&self) -> &str {
        "fake"
    }

    async fn fetch(&self, request: &CatalogRequest) -> Result<Value, CatalogError> {
        self.calls.lock().unwrap().push(request.clone());
        let Some(scripted) = self.next(request) else {
            return Err(CatalogError::Network(format!("no scripted response for {request}")));
        };
        if let Some(gate) = scripted.gate {
            let _ = gate.await;
        }
        scripted.result
    }
}

/// A v3.1-shaped record with the fields the directory cares about.
pub fn country_json(code: &str, name: &str, region: &str) -> Value {
    json!({
        "cca3": code,
        "name": { "common": name, "official": name },
        "region": region,
        "subregion": "",
        "capital": [],
        "population": 1000,
        "flags": { "png": format!("https://flagcdn.com/w320/{}.png", code.to_lowercase()) },
        "borders": []
    })
}

/// Creates a test Directory over `client` with in-memory preferences.
pub fn test_directory(client: Arc<FakeCatalog>) -> Directory {
    Directory::new(client, DirectorySettings::default(), Preferences::in_memory())
}
