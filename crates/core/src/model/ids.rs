use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ─── ID Types ──────────────────────────────────────────────────────────────────

/// Identifier of a lesson section ("layer") in the tutorial.
///
/// Any `u8` is representable so that ids coming from storage or from the
/// render layer can be carried around without failing; only the ids listed in
/// the lesson catalogue are meaningful to the progress state.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(u8);

impl LayerId {
    /// Creates a new `LayerId`
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Returns the underlying u8 value
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Returns the id of the following section, if it fits in a `u8`.
    #[must_use]
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Debug for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LayerId({})", self.0)
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── FromStr Implementation ────────────────────────────────────────────────────

/// Error type for parsing ID from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for LayerId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .map(LayerId::new)
            .map_err(|_| ParseIdError {
                kind: "LayerId".to_string(),
            })
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_id_display() {
        let id = LayerId::new(4);
        assert_eq!(id.to_string(), "4");
        assert_eq!(format!("{id:?}"), "LayerId(4)");
    }

    #[test]
    fn test_layer_id_from_str() {
        let id: LayerId = " 7 ".parse().unwrap();
        assert_eq!(id, LayerId::new(7));
    }

    #[test]
    fn test_layer_id_from_str_invalid() {
        assert!("seven".parse::<LayerId>().is_err());
        assert!("256".parse::<LayerId>().is_err());
        assert!("-1".parse::<LayerId>().is_err());
    }

    #[test]
    fn test_layer_id_next() {
        assert_eq!(LayerId::new(2).next(), Some(LayerId::new(3)));
        assert_eq!(LayerId::new(u8::MAX).next(), None);
    }

    #[test]
    fn test_layer_id_serializes_as_plain_integer() {
        let json = serde_json::to_string(&LayerId::new(5)).unwrap();
        assert_eq!(json, "5");
        let back: LayerId = serde_json::from_str("5").unwrap();
        assert_eq!(back, LayerId::new(5));
    }
}
