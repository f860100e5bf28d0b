//! # Actions
//!
//! Everything that can happen to the directory becomes an `Action`.
//! User picks a region? That's `Action::FilterByRegion(region)`.
//! The catalog answers? That's `Action::Fetched { ticket, result }`.
//!
//! `update()` applies an action to the state and returns the `Effect` the
//! caller must carry out. No I/O happens here.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```

use std::sync::Arc;

use log::{debug, info, warn};
use serde_json::Value;

use crate::catalog::{CatalogError, CatalogRequest, Country, Region, Shape, Slot, normalize};
use crate::core::error::{Channel, DirectoryError, FetchFailure};
use crate::core::state::DirectoryState;

/// A request together with the sequence number it was issued under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub seq: u64,
    pub request: CatalogRequest,
}

#[derive(Debug)]
pub enum Action {
    FetchAll,
    FilterByRegion(Region),
    /// Raw search box text changed (every keystroke).
    InputChanged(String),
    /// Overwrite the raw search box text without scheduling a search.
    SetInput(String),
    /// The debouncer settled on a query.
    QueryCommitted(String),
    FindBorders(Vec<String>),
    SelectRegion(Region),
    Fetched {
        ticket: Ticket,
        result: Result<Value, CatalogError>,
    },
}

#[derive(Debug, PartialEq, Eq)]
pub enum Effect {
    None,
    Fetch(Ticket),
    /// Hand the value to the debouncer.
    ScheduleCommit(String),
    SaveRegion(Region),
}

/// Keeps ASCII letters and spaces; the name endpoint rejects anything else.
pub fn sanitize_query(query: &str) -> String {
    query
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || *c == ' ')
        .collect()
}

pub fn update(state: &mut DirectoryState, action: Action) -> Effect {
    match action {
        Action::FetchAll => fetch_all(state),
        Action::FilterByRegion(region) => {
            state.input_value.clear();
            state.search_error.clear();
            match region {
                Region::All => fetch_all(state),
                region => {
                    state.is_loading = true;
                    issue(state, CatalogRequest::Region(region))
                }
            }
        }
        Action::InputChanged(value) => {
            state.input_value = value.clone();
            Effect::ScheduleCommit(value)
        }
        Action::SetInput(value) => {
            state.input_value = value;
            Effect::None
        }
        Action::QueryCommitted(query) => {
            state.search_query = query;
            if state.search_query.is_empty() || state.input_value.is_empty() {
                restore_from_cache(state);
                return Effect::None;
            }

            let sanitized = sanitize_query(&state.search_query);
            if sanitized.is_empty() {
                // Nothing left to send; the endpoint would only answer 404.
                state.list_requests.supersede();
                state.search_in_flight = false;
                let query = state.search_query.clone();
                fail(state, DirectoryError::SearchNotFound { query });
                return Effect::None;
            }
            state.is_loading = true;
            issue(state, CatalogRequest::Name(sanitized))
        }
        Action::FindBorders(codes) => {
            state.borders = None;
            if codes.is_empty() {
                state.border_requests.supersede();
                state.borders = Some(Arc::from(Vec::<Country>::new()));
                return Effect::None;
            }
            issue(state, CatalogRequest::Codes(codes))
        }
        Action::SelectRegion(region) => {
            state.selected = region;
            Effect::SaveRegion(region)
        }
        Action::Fetched { ticket, result } => {
            let slot = ticket.request.slot();
            let latest = state.requests(slot).is_latest(ticket.seq);
            if latest && slot == Slot::List {
                state.search_in_flight = false;
            }
            if !latest {
                if state.policy.guard_stale_responses {
                    info!(
                        "Discarding stale response for {} (seq {})",
                        ticket.request, ticket.seq
                    );
                    return Effect::None;
                }
                debug!(
                    "Applying out-of-order response for {} (seq {})",
                    ticket.request, ticket.seq
                );
            }
            complete(state, ticket.request, result);
            Effect::None
        }
    }
}

fn fetch_all(state: &mut DirectoryState) -> Effect {
    state.is_loading = true;
    issue(state, CatalogRequest::All)
}

fn issue(state: &mut DirectoryState, request: CatalogRequest) -> Effect {
    let slot = request.slot();
    if slot == Slot::List {
        state.search_in_flight = matches!(request, CatalogRequest::Name(_));
    }
    let seq = state.requests_mut(slot).issue();
    debug!("Issuing {} (seq {})", request, seq);
    Effect::Fetch(Ticket { seq, request })
}

/// Search cleared: back to the full list, without touching the network.
fn restore_from_cache(state: &mut DirectoryState) {
    state.search_error.clear();
    state.countries = state.cache.retrieve();
    if state.policy.guard_stale_responses && state.search_in_flight {
        // A search still in flight must not land on top of the restored list.
        // Region and full-list requests are left to land.
        state.list_requests.supersede();
        state.search_in_flight = false;
        state.is_loading = false;
    }
    debug!(
        "Search cleared, restored {} cached countries",
        state.countries.as_deref().map_or(0, <[Country]>::len)
    );
}

fn complete(state: &mut DirectoryState, request: CatalogRequest, result: Result<Value, CatalogError>) {
    match request {
        CatalogRequest::All => match parse(result, Shape::Listing) {
            Ok(countries) => {
                state.cache.store(countries.clone());
                commit_list(state, countries);
            }
            Err(e) => fail(state, DirectoryError::GeneralFetch(e)),
        },
        CatalogRequest::Region(region) => match parse(result, Shape::Region(region)) {
            Ok(countries) => commit_list(state, countries),
            Err(e) => fail(state, DirectoryError::RegionFetch(e)),
        },
        CatalogRequest::Name(query) => match result {
            Err(e) if e.is_not_found() => fail(state, DirectoryError::SearchNotFound { query }),
            result => match parse(result, Shape::FullSearch) {
                Ok(countries) if countries.is_empty() => {
                    fail(state, DirectoryError::SearchNotFound { query })
                }
                Ok(countries) => {
                    state.search_error.clear();
                    commit_list(state, countries);
                }
                Err(e) => fail(state, DirectoryError::SearchTransport(e)),
            },
        },
        CatalogRequest::Codes(_) => match parse(result, Shape::Borders) {
            Ok(countries) => {
                if state.policy.clear_border_error_on_success {
                    state.border_error.clear();
                }
                state.borders = Some(countries);
            }
            Err(e) => fail(state, DirectoryError::BorderFetch(e)),
        },
    }
}

fn parse(result: Result<Value, CatalogError>, shape: Shape) -> Result<Arc<[Country]>, FetchFailure> {
    let payload = result?;
    Ok(normalize(&payload, shape)?.into())
}

fn commit_list(state: &mut DirectoryState, countries: Arc<[Country]>) {
    info!("Main list now holds {} countries", countries.len());
    state.countries = Some(countries);
    state.is_loading = false;
    state.error.clear();
}

fn fail(state: &mut DirectoryState, error: DirectoryError) {
    warn!("{}", error);
    let message = error.user_message();
    match error.channel() {
        Channel::General => {
            state.is_loading = false;
            state.error.raise(message);
        }
        Channel::Search => {
            state.is_loading = false;
            state.search_error.raise(message);
        }
        Channel::Border => state.border_error.raise(message),
    }
}
