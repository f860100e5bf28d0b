use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Continent-level grouping understood by the catalog service.
/// `All` is the "no filter" sentinel and never reaches the region endpoint.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    #[default]
    All,
    Africa,
    Americas,
    Asia,
    Europe,
    Oceania,
}

impl Region {
    pub const ALL: [Region; 6] = [
        Region::All,
        Region::Africa,
        Region::Americas,
        Region::Asia,
        Region::Europe,
        Region::Oceania,
    ];

    /// The literal used in URLs and persisted preferences.
    pub fn as_str(self) -> &'static str {
        match self {
            Region::All => "all",
            Region::Africa => "africa",
            Region::Americas => "americas",
            Region::Asia => "asia",
            Region::Europe => "europe",
            Region::Oceania => "oceania",
        }
    }

    /// The capitalized form the service uses in a record's `region` field.
    pub fn label(self) -> &'static str {
        match self {
            Region::All => "All",
            Region::Africa => "Africa",
            Region::Americas => "Americas",
            Region::Asia => "Asia",
            Region::Europe => "Europe",
            Region::Oceania => "Oceania",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRegion(pub String);

impl fmt::Display for UnknownRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown region: {:?}", self.0)
    }
}

impl std::error::Error for UnknownRegion {}

impl FromStr for Region {
    type Err = UnknownRegion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Region::ALL
            .into_iter()
            .find(|r| trimmed.eq_ignore_ascii_case(r.as_str()))
            .ok_or_else(|| UnknownRegion(s.to_string()))
    }
}

/// A single catalog entry, rebuilt from scratch on every fetch.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Country {
    /// Three-letter code, unique across the catalog.
    pub code: String,
    pub name: String,
    pub native_name: Option<String>,
    /// Flag image URL (or emoji when the service offers nothing better).
    pub flag: String,
    pub region: String,
    pub subregion: String,
    pub capital: Option<String>,
    pub population: u64,
    pub top_level_domains: Vec<String>,
    pub languages: BTreeSet<String>,
    pub currencies: BTreeSet<String>,
    /// Codes of neighboring countries, resolved on demand.
    pub borders: Vec<String>,
}

impl Country {
    /// A country with only the identity filled in.
    pub fn with_code(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: String::new(),
            native_name: None,
            flag: String::new(),
            region: String::new(),
            subregion: String::new(),
            capital: None,
            population: 0,
            top_level_domains: Vec::new(),
            languages: BTreeSet::new(),
            currencies: BTreeSet::new(),
            borders: Vec::new(),
        }
    }
}
