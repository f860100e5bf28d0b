//! # Core Directory Logic
//!
//! State, actions and the orchestrator for the country directory.
//! Nothing here knows how the data is displayed.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • DirectoryState       │
//!                    │  • Action / update()    │
//!                    │  • Directory (effects)  │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │  catalog   │      │ preferences│      │  console   │
//!     │  (HTTP)    │      │  (disk)    │      │ (consumer) │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: `DirectoryState` and the read-only `DirectoryView`
//! - [`action`]: the `Action` enum and the `update()` reducer
//! - [`directory`]: the `Directory` handle that runs effects
//! - [`error`]: the three error channels and their messages
//! - [`cache`], [`debounce`], [`preferences`], [`config`]

pub mod action;
pub mod cache;
pub mod config;
pub mod debounce;
pub mod directory;
pub mod error;
pub mod preferences;
pub mod state;

pub use directory::{Directory, DirectorySettings};
pub use error::DirectoryError;
pub use state::{DirectoryView, Policy};
