use crate::model::ids::LayerId;
use crate::model::lesson::{ENTRY_LAYER, all_layer_ids, is_known_layer};

/// Which sections a learner may view, and which one is active.
///
/// Invariants held by every constructor and mutation:
/// - `unlocked` is ascending and duplicate-free
/// - the entry section is always unlocked
/// - `current` is a member of `unlocked`
/// - `unlocked` only shrinks through [`ProgressState::reset`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressState {
    unlocked: Vec<LayerId>,
    current: LayerId,
}

impl ProgressState {
    /// Every section open, pointing at the entry section.
    #[must_use]
    pub fn fully_unlocked() -> Self {
        Self {
            unlocked: all_layer_ids(),
            current: ENTRY_LAYER,
        }
    }

    /// Only the entry section open.
    #[must_use]
    pub fn entry_only() -> Self {
        Self {
            unlocked: vec![ENTRY_LAYER],
            current: ENTRY_LAYER,
        }
    }

    /// Rebuilds a state from persisted parts.
    ///
    /// Unknown ids are dropped, the list is sorted and deduplicated, the entry
    /// section is re-added if missing, and a `current` that is not unlocked
    /// falls back to the entry section.
    #[must_use]
    pub fn from_persisted(unlocked: impl IntoIterator<Item = LayerId>, current: LayerId) -> Self {
        let mut ids: Vec<LayerId> = unlocked.into_iter().filter(|id| is_known_layer(*id)).collect();
        ids.push(ENTRY_LAYER);
        ids.sort_unstable();
        ids.dedup();

        let current = if ids.binary_search(&current).is_ok() {
            current
        } else {
            ENTRY_LAYER
        };

        Self {
            unlocked: ids,
            current,
        }
    }

    #[must_use]
    pub fn unlocked(&self) -> &[LayerId] {
        &self.unlocked
    }

    #[must_use]
    pub fn current(&self) -> LayerId {
        self.current
    }

    #[must_use]
    pub fn unlocked_count(&self) -> usize {
        self.unlocked.len()
    }

    #[must_use]
    pub fn is_fully_unlocked(&self) -> bool {
        all_layer_ids().iter().all(|id| self.is_unlocked(*id))
    }

    #[must_use]
    pub fn is_unlocked(&self, id: LayerId) -> bool {
        self.unlocked.binary_search(&id).is_ok()
    }

    /// Unlocks `id` and makes it current.
    ///
    /// Returns `false` without touching anything when `id` is already
    /// unlocked or is not part of the catalogue.
    pub fn unlock(&mut self, id: LayerId) -> bool {
        if !is_known_layer(id) {
            return false;
        }
        match self.unlocked.binary_search(&id) {
            Ok(_) => false,
            Err(pos) => {
                self.unlocked.insert(pos, id);
                self.current = id;
                true
            }
        }
    }

    /// Points `current` at `id` if it is unlocked. Returns whether it moved.
    pub fn set_current(&mut self, id: LayerId) -> bool {
        if !self.is_unlocked(id) || self.current == id {
            return false;
        }
        self.current = id;
        true
    }

    /// Drops all unlock history: only the entry section stays open.
    pub fn reset(&mut self) {
        *self = Self::entry_only();
    }
}

impl Default for ProgressState {
    fn default() -> Self {
        Self::fully_unlocked()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::lesson::LESSON_COUNT;

    fn id(raw: u8) -> LayerId {
        LayerId::new(raw)
    }

    fn assert_invariants(state: &ProgressState) {
        assert!(state.is_unlocked(ENTRY_LAYER));
        assert!(state.is_unlocked(state.current()));
        assert!(state.unlocked().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn default_is_fully_unlocked() {
        let state = ProgressState::default();
        assert!(state.is_unlocked(id(0)));
        assert!(state.is_unlocked(id(5)));
        assert!(state.is_fully_unlocked());
        assert_eq!(state.unlocked_count(), LESSON_COUNT);
        assert_eq!(state.current(), id(0));
    }

    #[test]
    fn reset_leaves_only_entry() {
        let mut state = ProgressState::fully_unlocked();
        state.set_current(id(6));
        state.reset();
        assert_eq!(state.unlocked(), &[id(0)]);
        assert_eq!(state.current(), id(0));
        assert!(!state.is_unlocked(id(3)));
    }

    #[test]
    fn unlock_moves_current_once() {
        let mut state = ProgressState::entry_only();
        assert!(state.unlock(id(1)));
        assert_eq!(state.current(), id(1));

        state.set_current(id(0));
        assert!(!state.unlock(id(1)));
        assert_eq!(state.current(), id(0));
        assert_eq!(state.unlocked(), &[id(0), id(1)]);
    }

    #[test]
    fn unlock_keeps_ascending_order() {
        let mut state = ProgressState::entry_only();
        state.unlock(id(4));
        state.unlock(id(2));
        state.unlock(id(7));
        assert_eq!(state.unlocked(), &[id(0), id(2), id(4), id(7)]);
        assert_eq!(state.current(), id(7));
    }

    #[test]
    fn unknown_ids_are_inert() {
        let mut state = ProgressState::entry_only();
        assert!(!state.unlock(id(42)));
        assert!(!state.is_unlocked(id(42)));
        assert!(!state.set_current(id(42)));
        assert_eq!(state, ProgressState::entry_only());
    }

    #[test]
    fn set_current_is_guarded() {
        let mut state = ProgressState::entry_only();
        assert!(!state.set_current(id(4)));
        assert_eq!(state.current(), id(0));

        state.unlock(id(4));
        state.unlock(id(5));
        assert!(state.set_current(id(4)));
        assert_eq!(state.current(), id(4));
    }

    #[test]
    fn unlock_is_monotonic_across_operations() {
        let mut state = ProgressState::entry_only();
        for raw in [3, 1, 8, 3, 5, 1] {
            state.unlock(id(raw));
            state.set_current(id(raw.saturating_sub(1)));
            assert_invariants(&state);
        }
        for raw in [0, 1, 3, 5, 8] {
            assert!(state.is_unlocked(id(raw)));
        }
    }

    #[test]
    fn every_reachable_state_keeps_invariants() {
        // Walk a deterministic pseudo-random sequence of operations.
        let mut state = ProgressState::fully_unlocked();
        let mut seed: u32 = 7;
        for _ in 0..500 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let raw = u8::try_from((seed >> 16) % 12).unwrap();
            match (seed >> 8) % 5 {
                0 => state.reset(),
                1 | 2 => {
                    state.unlock(id(raw));
                }
                _ => {
                    state.set_current(id(raw));
                }
            }
            assert_invariants(&state);
        }
    }

    #[test]
    fn from_persisted_normalizes() {
        let state = ProgressState::from_persisted([id(3), id(1), id(3), id(12)], id(12));
        assert_eq!(state.unlocked(), &[id(0), id(1), id(3)]);
        assert_eq!(state.current(), id(0));

        let state = ProgressState::from_persisted([id(0), id(2)], id(2));
        assert_eq!(state.current(), id(2));
    }
}
