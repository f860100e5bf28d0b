//! # Directory State
//!
//! All mutable state of the country directory in one place.
//!
//! ```text
//! DirectoryState
//! ├── countries: Option<Arc<[Country]>>   // main list (all / region / search)
//! ├── is_loading: bool                    // main list request in flight
//! ├── error: ErrorChannel                 // general failures
//! ├── search_error: ErrorChannel          // "not found"
//! ├── border_error: ErrorChannel          // neighbor lookup failures
//! ├── borders: Option<Arc<[Country]>>     // None = loading or never requested
//! ├── input_value: String                 // raw search box text
//! ├── search_query: String                // last debounced commit
//! ├── selected: Region                    // region picker value
//! ├── cache: CountryCache                 // last full list
//! ├── list_requests / border_requests     // per-slot sequence numbers
//! ├── search_in_flight: bool              // latest list request is a name search
//! └── policy: Policy
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::sync::Arc;

use crate::catalog::{Country, Region, Slot};
use crate::core::cache::CountryCache;

/// An independent error slot with its own flag and banner text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorChannel {
    pub active: bool,
    pub message: String,
}

impl ErrorChannel {
    pub fn raise(&mut self, message: &str) {
        self.active = true;
        self.message = message.to_string();
    }

    pub fn clear(&mut self) {
        self.active = false;
        self.message.clear();
    }
}

/// Monotonic request counter for one state slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestSequence {
    latest: u64,
}

impl RequestSequence {
    /// Hands out the next sequence number, superseding every earlier one.
    pub fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    /// Supersedes all outstanding requests without issuing a new one.
    pub fn supersede(&mut self) {
        self.latest += 1;
    }

    pub fn is_latest(&self, seq: u64) -> bool {
        seq == self.latest
    }
}

/// Behavior switches that resolve known quirks of the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    /// Drop completions that were superseded by a newer request on the same slot.
    /// When false, the last response to arrive wins, even if it is stale.
    pub guard_stale_responses: bool,
    /// Clear the border channel when a later border lookup succeeds.
    pub clear_border_error_on_success: bool,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            guard_stale_responses: true,
            clear_border_error_on_success: true,
        }
    }
}

/// Read-only snapshot handed to consumers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectoryView {
    pub countries: Option<Arc<[Country]>>,
    pub is_loading: bool,
    pub error: ErrorChannel,
    pub search_error: ErrorChannel,
    pub border_error: ErrorChannel,
    pub borders: Option<Arc<[Country]>>,
    pub input_value: String,
    pub search_query: String,
    pub selected: Region,
}

impl DirectoryView {
    pub fn country(&self, code: &str) -> Option<&Country> {
        self.countries
            .as_deref()?
            .iter()
            .find(|c| c.code.eq_ignore_ascii_case(code))
    }
}

#[derive(Debug, Default)]
pub struct DirectoryState {
    pub countries: Option<Arc<[Country]>>,
    pub is_loading: bool,
    pub error: ErrorChannel,
    pub search_error: ErrorChannel,
    pub border_error: ErrorChannel,
    pub borders: Option<Arc<[Country]>>,
    pub input_value: String,
    pub search_query: String,
    pub selected: Region,
    pub cache: CountryCache,
    pub list_requests: RequestSequence,
    pub border_requests: RequestSequence,
    pub search_in_flight: bool,
    pub policy: Policy,
}

impl DirectoryState {
    pub fn new(policy: Policy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    pub fn requests_mut(&mut self, slot: Slot) -> &mut RequestSequence {
        match slot {
            Slot::List => &mut self.list_requests,
            Slot::Borders => &mut self.border_requests,
        }
    }

    pub fn requests(&self, slot: Slot) -> &RequestSequence {
        match slot {
            Slot::List => &self.list_requests,
            Slot::Borders => &self.border_requests,
        }
    }

    pub fn view(&self) -> DirectoryView {
        DirectoryView {
            countries: self.countries.clone(),
            is_loading: self.is_loading,
            error: self.error.clone(),
            search_error: self.search_error.clone(),
            border_error: self.border_error.clone(),
            borders: self.borders.clone(),
            input_value: self.input_value.clone(),
            search_query: self.search_query.clone(),
            selected: self.selected,
        }
    }
}
