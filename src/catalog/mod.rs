pub mod client;
pub mod format;
pub mod rest;
pub mod types;

pub use client::{CatalogClient, CatalogError, CatalogRequest, Slot};
pub use format::{FormatError, Shape, normalize};
pub use rest::RestCountriesClient;
pub use types::{Country, Region};
