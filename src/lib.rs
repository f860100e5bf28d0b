//! Terra library exports

pub mod catalog;
pub mod console;
pub mod core;

#[cfg(test)]
pub mod test_support;

pub use catalog::{Country, Region};
pub use self::core::{Directory, DirectorySettings, DirectoryView};
