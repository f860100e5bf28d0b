//! # Directory Errors
//!
//! Every failure ends up on exactly one of three independent error channels.
//! Nothing here is fatal: the directory keeps its stale data and shows a banner.

use std::fmt;

use crate::catalog::{CatalogError, FormatError};

pub const GENERAL_FETCH_MESSAGE: &str = "Something went wrong. Try again later.";
pub const REGION_FETCH_MESSAGE: &str = "An error occurred. Try reloading.";
pub const SEARCH_NOT_FOUND_MESSAGE: &str = "Uh oh, country not found.";
pub const SEARCH_TRANSPORT_MESSAGE: &str = "Oops! An error occurred. Try reloading.";
pub const BORDER_FETCH_MESSAGE: &str = "Unable to load border data. Try reloading.";

/// The error slot a failure is reported on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    General,
    Search,
    Border,
}

/// Why a request produced no usable countries.
#[derive(Debug)]
pub enum FetchFailure {
    Catalog(CatalogError),
    Malformed(FormatError),
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchFailure::Catalog(e) => write!(f, "{e}"),
            FetchFailure::Malformed(e) => write!(f, "malformed response: {e}"),
        }
    }
}

impl From<CatalogError> for FetchFailure {
    fn from(e: CatalogError) -> Self {
        FetchFailure::Catalog(e)
    }
}

impl From<FormatError> for FetchFailure {
    fn from(e: FormatError) -> Self {
        FetchFailure::Malformed(e)
    }
}

#[derive(Debug)]
pub enum DirectoryError {
    /// Fetching the full list failed.
    GeneralFetch(FetchFailure),
    /// Fetching a region slice failed. Reported on the general channel.
    RegionFetch(FetchFailure),
    /// Name search matched nothing.
    SearchNotFound { query: String },
    /// Name search failed for any other reason. Reported on the general channel.
    SearchTransport(FetchFailure),
    /// Neighbor lookup failed.
    BorderFetch(FetchFailure),
}

impl DirectoryError {
    pub fn channel(&self) -> Channel {
        match self {
            DirectoryError::GeneralFetch(_)
            | DirectoryError::RegionFetch(_)
            | DirectoryError::SearchTransport(_) => Channel::General,
            DirectoryError::SearchNotFound { .. } => Channel::Search,
            DirectoryError::BorderFetch(_) => Channel::Border,
        }
    }

    /// Banner text shown to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            DirectoryError::GeneralFetch(_) => GENERAL_FETCH_MESSAGE,
            DirectoryError::RegionFetch(_) => REGION_FETCH_MESSAGE,
            DirectoryError::SearchNotFound { .. } => SEARCH_NOT_FOUND_MESSAGE,
            DirectoryError::SearchTransport(_) => SEARCH_TRANSPORT_MESSAGE,
            DirectoryError::BorderFetch(_) => BORDER_FETCH_MESSAGE,
        }
    }
}

impl fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectoryError::GeneralFetch(e) => write!(f, "fetching all countries failed: {e}"),
            DirectoryError::RegionFetch(e) => write!(f, "fetching region failed: {e}"),
            DirectoryError::SearchNotFound { query } => write!(f, "no country matches {query:?}"),
            DirectoryError::SearchTransport(e) => write!(f, "search failed: {e}"),
            DirectoryError::BorderFetch(e) => write!(f, "fetching border countries failed: {e}"),
        }
    }
}

impl std::error::Error for DirectoryError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Shape;

    #[test]
    fn test_search_failures_split_across_channels() {
        let missing = DirectoryError::SearchNotFound { query: "xyz".into() };
        let transport = DirectoryError::SearchTransport(FetchFailure::Catalog(
            CatalogError::Network("refused".into()),
        ));
        assert_eq!(missing.channel(), Channel::Search);
        assert_eq!(transport.channel(), Channel::General);
        assert_eq!(missing.user_message(), SEARCH_NOT_FOUND_MESSAGE);
        assert_eq!(transport.user_message(), SEARCH_TRANSPORT_MESSAGE);
    }

    #[test]
    fn test_border_failures_stay_on_border_channel() {
        let err = DirectoryError::BorderFetch(
            FormatError::NotASequence { shape: Shape::Borders }.into(),
        );
        assert_eq!(err.channel(), Channel::Border);
        assert_eq!(
            err.to_string(),
            "fetching border countries failed: malformed response: borders payload is not a list"
        );
    }
}
