use std::sync::Arc;

use storage::blob::StoredProgress;
use storage::repository::ProgressRepository;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use tutorial_core::model::{LayerId, ProgressState};

use crate::config::ProgressConfig;
use crate::hydration::{Hydration, HydrationGate};
use crate::persistence::Persister;
use crate::scroll::{SectionOffset, section_in_view};
use crate::view::{ProgressBarView, SectionVisibility};

/// Single source of truth for which sections are unlocked and which one is
/// current.
///
/// Owned by the application scope and shared as `Arc<ProgressStore>`. None of
/// the operations fail: unknown ids are inert, and storage failures only cost
/// durability.
pub struct ProgressStore {
    state: watch::Sender<ProgressState>,
    hydration: HydrationGate,
    persister: Persister,
}

impl ProgressStore {
    /// Loads persisted progress and starts the background writer.
    ///
    /// A missing blob yields `config.initial`; a blob from another schema
    /// version is replaced by the fully unlocked default and written back. An
    /// unreadable backend leaves the store in memory-only mode for the session.
    pub async fn open(repo: Arc<dyn ProgressRepository>, config: ProgressConfig) -> Self {
        let initial = config.initial.state();

        let raw = match repo.load_blob(&config.storage_key).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(
                    key = %config.storage_key,
                    error = %err,
                    "progress storage unavailable; continuing in memory"
                );
                return Self::from_parts(initial, Persister::disabled(config.schema_version));
            }
        };

        let (state, write_back) =
            match StoredProgress::decode(raw.as_deref(), config.schema_version) {
                Ok(StoredProgress::Stale { version }) => {
                    info!(
                        stored_version = version,
                        expected_version = config.schema_version,
                        "discarding progress from another schema version"
                    );
                    (StoredProgress::Stale { version }.resolve(&initial), true)
                }
                Ok(stored) => (stored.resolve(&initial), false),
                Err(err) => {
                    warn!(key = %config.storage_key, error = %err, "ignoring unreadable progress blob");
                    (initial, false)
                }
            };

        let persister = Persister::spawn(repo, config.storage_key, config.schema_version);
        if write_back {
            persister.save(&state);
        }
        Self::from_parts(state, persister)
    }

    /// A store that never touches storage.
    #[must_use]
    pub fn in_memory(config: &ProgressConfig) -> Self {
        Self::from_parts(
            config.initial.state(),
            Persister::disabled(config.schema_version),
        )
    }

    fn from_parts(state: ProgressState, persister: Persister) -> Self {
        let (state, _) = watch::channel(state);
        Self {
            state,
            hydration: HydrationGate::new(),
            persister,
        }
    }

    // ─── Queries ───────────────────────────────────────────────────────────

    #[must_use]
    pub fn is_unlocked(&self, id: LayerId) -> bool {
        self.state.borrow().is_unlocked(id)
    }

    #[must_use]
    pub fn current_layer(&self) -> LayerId {
        self.state.borrow().current()
    }

    #[must_use]
    pub fn unlocked_layers(&self) -> Vec<LayerId> {
        self.state.borrow().unlocked().to_vec()
    }

    #[must_use]
    pub fn snapshot(&self) -> ProgressState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every real state change (never on no-ops).
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ProgressState> {
        self.state.subscribe()
    }

    // ─── Mutations ─────────────────────────────────────────────────────────

    /// Unlocks `id` and makes it current. Already-unlocked and unknown ids are
    /// a no-op.
    pub fn unlock_layer(&self, id: LayerId) {
        if self.mutate(|state| state.unlock(id)) {
            debug!(layer = %id, "layer unlocked");
        }
    }

    /// Moves the current pointer to `id` if it is unlocked.
    pub fn set_current_layer(&self, id: LayerId) {
        if self.mutate(|state| state.set_current(id)) {
            debug!(layer = %id, "current layer changed");
        }
    }

    /// Discards all unlock history; only the entry section stays open.
    pub fn reset_progress(&self) {
        let changed = self.mutate(|state| {
            let before = state.clone();
            state.reset();
            *state != before
        });
        if changed {
            info!("progress reset");
        }
    }

    // The snapshot is queued while the state lock is held, so writes reach
    // storage in mutation order.
    fn mutate(&self, op: impl FnOnce(&mut ProgressState) -> bool) -> bool {
        self.state.send_if_modified(|state| {
            let changed = op(state);
            if changed {
                self.persister.save(state);
            }
            changed
        })
    }

    // ─── Persistence ───────────────────────────────────────────────────────

    /// Waits until every queued write has been attempted.
    pub async fn flush(&self) {
        self.persister.flush().await;
    }

    /// `false` once persistence is unavailable for the rest of the session.
    #[must_use]
    pub fn is_durable(&self) -> bool {
        self.persister.is_durable()
    }

    // ─── Hydration ─────────────────────────────────────────────────────────

    /// Called by the render layer after its first pass. Returns `true` only
    /// the first time.
    pub fn mark_rendered(&self) -> bool {
        let flipped = self.hydration.mark_rendered();
        if flipped {
            debug!("progress hydrated");
        }
        flipped
    }

    #[must_use]
    pub fn hydrated(&self) -> bool {
        self.hydration.is_hydrated()
    }

    #[must_use]
    pub fn view(&self) -> Hydration<ProgressState> {
        self.hydration.gate(|| self.snapshot())
    }

    #[must_use]
    pub fn section_visibility(&self, id: LayerId) -> SectionVisibility {
        SectionVisibility::of(self.view().as_ref(), id)
    }

    #[must_use]
    pub fn progress_bar(&self) -> Option<ProgressBarView> {
        self.view().map(|state| ProgressBarView::from_state(&state)).ready()
    }

    /// Points the current section at the one nearest the top of the viewport.
    ///
    /// Does nothing before hydration. Returns the section picked, if any.
    pub fn track_scroll(
        &self,
        offsets: &[SectionOffset],
        scroll_y: f64,
        viewport_height: f64,
    ) -> Option<LayerId> {
        if !self.hydrated() {
            return None;
        }
        let in_view = section_in_view(offsets, scroll_y, viewport_height, &self.state.borrow())?;
        self.set_current_layer(in_view);
        Some(in_view)
    }
}
