//! # Directory Handle
//!
//! The orchestrator: one `Directory` is created at startup and cloned into
//! every consumer. It runs actions through `update()`, carries out the
//! resulting effects (catalog fetches, debounce scheduling, preference
//! writes) and republishes the state after every step.
//!
//! ```text
//! consumer ──► Directory::filter_by_region()
//!                 │
//!                 ├─ update(state, FilterByRegion) ──► Effect::Fetch(ticket)
//!                 ├─ client.fetch(request).await          (lock released)
//!                 └─ update(state, Fetched { ticket, result })
//!                                         │
//! consumer ◄── watch::Receiver<DirectoryView> ◄┘
//! ```
//!
//! The state lock is never held across an `.await`, so operations may
//! interleave freely; sequence numbers on each ticket keep late responses
//! from overwriting newer ones.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use log::{debug, info};
use tokio::sync::{mpsc, watch};

use crate::catalog::{CatalogClient, CatalogError, Region, RestCountriesClient};
use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::debounce::{DEFAULT_DEBOUNCE, Debouncer};
use crate::core::preferences::Preferences;
use crate::core::state::{DirectoryState, DirectoryView, Policy};

/// Runtime knobs for a `Directory`.
#[derive(Debug, Clone, Copy)]
pub struct DirectorySettings {
    pub debounce: Duration,
    pub policy: Policy,
    pub restore_last_region: bool,
}

impl Default for DirectorySettings {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            policy: Policy::default(),
            restore_last_region: false,
        }
    }
}

impl From<&ResolvedConfig> for DirectorySettings {
    fn from(config: &ResolvedConfig) -> Self {
        Self {
            debounce: config.debounce,
            policy: config.policy,
            restore_last_region: config.restore_last_region,
        }
    }
}

struct Inner {
    client: Arc<dyn CatalogClient>,
    state: Mutex<DirectoryState>,
    updates: watch::Sender<DirectoryView>,
    debouncer: Debouncer<String>,
    preferences: Preferences,
    restore_last_region: bool,
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, DirectoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Clone)]
pub struct Directory {
    inner: Arc<Inner>,
}

impl Directory {
    /// Must be called from within a Tokio runtime: debounced search commits
    /// are delivered by a background task that lives as long as the directory.
    pub fn new(
        client: Arc<dyn CatalogClient>,
        settings: DirectorySettings,
        preferences: Preferences,
    ) -> Self {
        let state = DirectoryState::new(settings.policy);
        let (updates, _) = watch::channel(state.view());
        let (commit_tx, commit_rx) = mpsc::unbounded_channel();

        let inner = Arc::new(Inner {
            client,
            state: Mutex::new(state),
            updates,
            debouncer: Debouncer::new(settings.debounce, commit_tx),
            preferences,
            restore_last_region: settings.restore_last_region,
        });
        spawn_commit_pump(Arc::downgrade(&inner), commit_rx);

        info!(
            "Directory ready (client={}, debounce={:?}, policy={:?})",
            inner.client.name(),
            settings.debounce,
            settings.policy
        );
        Self { inner }
    }

    /// Builds the REST client and preference store described by `config`.
    pub fn from_config(config: &ResolvedConfig) -> Result<Self, CatalogError> {
        let client = RestCountriesClient::new(Some(config.base_url.clone()), config.request_timeout)?;
        Ok(Self::new(
            Arc::new(client),
            DirectorySettings::from(config),
            Preferences::open(config.preferences_path.clone()),
        ))
    }

    // ------------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------------

    pub fn view(&self) -> DirectoryView {
        self.inner.lock_state().view()
    }

    /// A receiver that is notified after every state change.
    pub fn subscribe(&self) -> watch::Receiver<DirectoryView> {
        self.inner.updates.subscribe()
    }

    // ------------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------------

    /// Startup sequence: reset the stored region to `all` and load the full
    /// list, or reapply the stored region when configured to restore it.
    pub async fn initialize(&self) {
        let region = if self.inner.restore_last_region {
            self.load_region()
        } else {
            Region::All
        };
        info!("Initializing directory with region {}", region);
        self.select_region(region).await;
        self.filter_by_region(region).await;
    }

    pub async fn fetch_all(&self) {
        self.run(Action::FetchAll).await;
    }

    pub async fn filter_by_region(&self, region: Region) {
        self.run(Action::FilterByRegion(region)).await;
    }

    /// What the region picker does: remember the choice, then filter by it.
    pub async fn choose_region(&self, region: Region) {
        self.select_region(region).await;
        self.filter_by_region(region).await;
    }

    /// Records a keystroke. The search itself runs once input goes quiet.
    pub async fn input_changed(&self, value: impl Into<String>) {
        self.run(Action::InputChanged(value.into())).await;
    }

    /// Sets the raw search box text without scheduling a search.
    pub async fn set_input_value(&self, value: impl Into<String>) {
        self.run(Action::SetInput(value.into())).await;
    }

    /// Commits `query` immediately, bypassing the debouncer.
    pub async fn search_for_countries(&self, query: impl Into<String>) {
        self.run(Action::QueryCommitted(query.into())).await;
    }

    pub async fn find_border_countries<S: AsRef<str>>(&self, codes: &[S]) {
        let codes = codes
            .iter()
            .map(|c| c.as_ref().trim().to_ascii_uppercase())
            .filter(|c| !c.is_empty())
            .collect();
        self.run(Action::FindBorders(codes)).await;
    }

    pub async fn select_region(&self, region: Region) {
        self.run(Action::SelectRegion(region)).await;
    }

    pub fn save_region(&self, region: Region) {
        self.inner.preferences.save_region(region);
    }

    pub fn load_region(&self) -> Region {
        self.inner.preferences.load_region()
    }

    // ------------------------------------------------------------------------
    // Effect execution
    // ------------------------------------------------------------------------

    /// Debouncer changes happen under the state lock, so timers are armed
    /// and cancelled in the same order as the writes they belong to.
    fn dispatch(&self, action: Action) -> Effect {
        let (effect, view) = {
            let mut state = self.inner.lock_state();
            if matches!(action, Action::FetchAll | Action::FilterByRegion(_)) {
                // A newer list intent; typing from before it must not commit.
                self.inner.debouncer.cancel();
            }
            let effect = match update(&mut state, action) {
                Effect::ScheduleCommit(value) => {
                    self.inner.debouncer.on_change(value);
                    Effect::None
                }
                effect => effect,
            };
            (effect, state.view())
        };
        self.inner.updates.send_replace(view);
        effect
    }

    async fn run(&self, action: Action) {
        let mut next = Some(action);
        while let Some(action) = next.take() {
            next = match self.dispatch(action) {
                // Commits are armed inside dispatch.
                Effect::None | Effect::ScheduleCommit(_) => None,
                Effect::Fetch(ticket) => {
                    let result = self.inner.client.fetch(&ticket.request).await;
                    Some(Action::Fetched { ticket, result })
                }
                Effect::SaveRegion(region) => {
                    self.save_region(region);
                    None
                }
            };
        }
    }
}

/// Turns debounced values into search commits. Holds only a weak reference,
/// so it exits once the last `Directory` handle is dropped.
fn spawn_commit_pump(inner: Weak<Inner>, mut commits: mpsc::UnboundedReceiver<String>) {
    tokio::spawn(async move {
        while let Some(query) = commits.recv().await {
            let Some(inner) = inner.upgrade() else {
                break;
            };
            debug!("Debounced query committed: {:?}", query);
            let directory = Directory { inner };
            // Each commit runs on its own so a slow search never delays the next one.
            tokio::spawn(async move {
                directory.run(Action::QueryCommitted(query)).await;
            });
        }
        debug!("Commit pump stopped");
    });
}
