//! Versioned JSON blob holding the persisted progress.
//!
//! Layout: `{"state": {"unlockedLayers": [..], "currentLayer": n}, "version": 2}`.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tutorial_core::model::{LayerId, ProgressState};

/// Key under which the progress blob is stored.
pub const PROGRESS_STORAGE_KEY: &str = "docker-tutorial-progress";

/// Schema version written alongside the payload.
pub const PROGRESS_SCHEMA_VERSION: u32 = 2;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BlobError {
    #[error("malformed progress blob: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("invalid payload for progress blob version {version}: {source}")]
    Payload {
        version: u32,
        #[source]
        source: serde_json::Error,
    },
}

/// Persisted shape of [`ProgressState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressPayload {
    pub unlocked_layers: Vec<LayerId>,
    pub current_layer: LayerId,
}

impl ProgressPayload {
    #[must_use]
    pub fn from_state(state: &ProgressState) -> Self {
        Self {
            unlocked_layers: state.unlocked().to_vec(),
            current_layer: state.current(),
        }
    }

    #[must_use]
    pub fn into_state(self) -> ProgressState {
        ProgressState::from_persisted(self.unlocked_layers, self.current_layer)
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    state: &'a ProgressPayload,
    version: u32,
}

// The payload stays untyped until the version is known, so blobs written by an
// older schema are recognized as stale even when their shape differs.
#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(default)]
    state: serde_json::Value,
    version: u32,
}

/// Serializes `state` into a blob tagged with `version`.
///
/// # Errors
///
/// Returns `BlobError::Malformed` if JSON encoding fails.
pub fn encode(state: &ProgressState, version: u32) -> Result<String, BlobError> {
    let payload = ProgressPayload::from_state(state);
    serde_json::to_string(&EnvelopeRef {
        state: &payload,
        version,
    })
    .map_err(BlobError::Malformed)
}

/// What was found under the progress key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredProgress {
    /// Nothing stored yet.
    Absent,
    /// Stored with the expected schema version.
    Current(ProgressPayload),
    /// Stored by another schema version; its payload is never inspected.
    Stale { version: u32 },
}

impl StoredProgress {
    /// Classifies a raw blob against the expected schema version.
    ///
    /// # Errors
    ///
    /// Returns `BlobError` if the blob is not JSON, has no `version`, or has a
    /// current version but a payload of the wrong shape.
    pub fn decode(raw: Option<&str>, expected_version: u32) -> Result<Self, BlobError> {
        let Some(raw) = raw else {
            return Ok(Self::Absent);
        };

        let envelope: RawEnvelope = serde_json::from_str(raw).map_err(BlobError::Malformed)?;
        if envelope.version != expected_version {
            return Ok(Self::Stale {
                version: envelope.version,
            });
        }

        let payload: ProgressPayload =
            serde_json::from_value(envelope.state).map_err(|source| BlobError::Payload {
                version: envelope.version,
                source,
            })?;
        Ok(Self::Current(payload))
    }

    /// Produces the in-memory state for this blob.
    ///
    /// `initial` is used only when nothing was stored.
    #[must_use]
    pub fn resolve(self, initial: &ProgressState) -> ProgressState {
        match self {
            Self::Absent => initial.clone(),
            Self::Current(payload) => payload.into_state(),
            Self::Stale { version } => migrate_stale(version),
        }
    }
}

/// Replacement for a blob written by any other schema version.
///
/// There is no field-level migration: every stale blob becomes the fully
/// unlocked default, whatever it contained.
#[must_use]
pub fn migrate_stale(_from_version: u32) -> ProgressState {
    ProgressState::fully_unlocked()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u8]) -> Vec<LayerId> {
        raw.iter().copied().map(LayerId::new).collect()
    }

    #[test]
    fn encodes_expected_layout() {
        let mut state = ProgressState::entry_only();
        state.unlock(LayerId::new(1));
        let blob = encode(&state, PROGRESS_SCHEMA_VERSION).unwrap();
        assert_eq!(
            blob,
            r#"{"state":{"unlockedLayers":[0,1],"currentLayer":1},"version":2}"#
        );
    }

    #[test]
    fn round_trips_current_version() {
        let mut state = ProgressState::entry_only();
        state.unlock(LayerId::new(4));
        state.unlock(LayerId::new(2));
        state.set_current(LayerId::new(4));

        let blob = encode(&state, PROGRESS_SCHEMA_VERSION).unwrap();
        let stored = StoredProgress::decode(Some(&blob), PROGRESS_SCHEMA_VERSION).unwrap();
        let restored = stored.resolve(&ProgressState::fully_unlocked());

        assert_eq!(restored.unlocked(), ids(&[0, 2, 4]).as_slice());
        assert_eq!(restored.current(), LayerId::new(4));
    }

    #[test]
    fn absent_resolves_to_initial() {
        let stored = StoredProgress::decode(None, PROGRESS_SCHEMA_VERSION).unwrap();
        assert_eq!(stored, StoredProgress::Absent);
        assert_eq!(
            stored.resolve(&ProgressState::entry_only()),
            ProgressState::entry_only()
        );
    }

    #[test]
    fn stale_versions_reset_to_fully_unlocked() {
        let older = r#"{"state":{"unlockedLayers":[0],"currentLayer":0},"version":1}"#;
        let other_shape = r#"{"state":{"unlocked":"everything"},"version":7}"#;
        let no_state = r#"{"version":0}"#;

        for raw in [older, other_shape, no_state] {
            let stored = StoredProgress::decode(Some(raw), PROGRESS_SCHEMA_VERSION).unwrap();
            assert!(matches!(stored, StoredProgress::Stale { .. }));
            let state = stored.resolve(&ProgressState::entry_only());
            assert_eq!(state.unlocked(), ids(&[0, 1, 2, 3, 4, 5, 6, 7, 8]).as_slice());
            assert_eq!(state.current(), LayerId::new(0));
        }
    }

    #[test]
    fn malformed_blobs_are_errors() {
        assert!(matches!(
            StoredProgress::decode(Some("not json"), PROGRESS_SCHEMA_VERSION),
            Err(BlobError::Malformed(_))
        ));
        assert!(matches!(
            StoredProgress::decode(Some(r#"{"state":{}}"#), PROGRESS_SCHEMA_VERSION),
            Err(BlobError::Malformed(_))
        ));
        assert!(matches!(
            StoredProgress::decode(
                Some(r#"{"state":{"unlockedLayers":"all"},"version":2}"#),
                PROGRESS_SCHEMA_VERSION
            ),
            Err(BlobError::Payload { version: 2, .. })
        ));
    }

    #[test]
    fn current_blob_with_broken_invariants_is_normalized() {
        let raw = r#"{"state":{"unlockedLayers":[5,3,3,40],"currentLayer":7},"version":2}"#;
        let state = StoredProgress::decode(Some(raw), PROGRESS_SCHEMA_VERSION)
            .unwrap()
            .resolve(&ProgressState::fully_unlocked());
        assert_eq!(state.unlocked(), ids(&[0, 3, 5]).as_slice());
        assert_eq!(state.current(), LayerId::new(0));
    }
}
