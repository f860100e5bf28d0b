//! Session-scoped snapshot of the last full country list.
//!
//! Only `GET /all` results are stored here. Region slices and search results
//! never are, so clearing a search always falls back to the full list.

use std::sync::Arc;

use crate::catalog::Country;

#[derive(Debug, Default, Clone)]
pub struct CountryCache {
    snapshot: Option<Arc<[Country]>>,
}

impl CountryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces whatever was stored before.
    pub fn store(&mut self, countries: Arc<[Country]>) {
        self.snapshot = Some(countries);
    }

    /// The last stored snapshot, `None` until the first full fetch succeeds.
    pub fn retrieve(&self) -> Option<Arc<[Country]>> {
        self.snapshot.clone()
    }
}
