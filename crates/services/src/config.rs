use storage::blob::{PROGRESS_SCHEMA_VERSION, PROGRESS_STORAGE_KEY};
use tutorial_core::model::ProgressState;

/// State a learner starts from when nothing has been stored yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitialProgress {
    /// Every section open; the locking mechanism is present but not gating.
    #[default]
    AllUnlocked,
    /// Gated tutorial flow: only the entry section open.
    EntryOnly,
}

impl InitialProgress {
    #[must_use]
    pub fn state(self) -> ProgressState {
        match self {
            Self::AllUnlocked => ProgressState::fully_unlocked(),
            Self::EntryOnly => ProgressState::entry_only(),
        }
    }
}

/// Persistence knobs for [`crate::ProgressStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressConfig {
    pub storage_key: String,
    pub schema_version: u32,
    pub initial: InitialProgress,
}

impl ProgressConfig {
    /// Default key and version, starting learners on the entry section only.
    #[must_use]
    pub fn gated() -> Self {
        Self {
            initial: InitialProgress::EntryOnly,
            ..Self::default()
        }
    }
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            storage_key: PROGRESS_STORAGE_KEY.to_owned(),
            schema_version: PROGRESS_SCHEMA_VERSION,
            initial: InitialProgress::AllUnlocked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_persisted_contract() {
        let config = ProgressConfig::default();
        assert_eq!(config.storage_key, "docker-tutorial-progress");
        assert_eq!(config.schema_version, 2);
        assert!(config.initial.state().is_fully_unlocked());
    }

    #[test]
    fn gated_starts_on_entry_only() {
        let config = ProgressConfig::gated();
        assert_eq!(config.initial.state(), ProgressState::entry_only());
        assert_eq!(config.schema_version, PROGRESS_SCHEMA_VERSION);
    }
}
