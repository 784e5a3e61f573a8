use std::sync::atomic::{AtomicBool, Ordering};

/// Two-phase availability of persisted state for the render layer.
///
/// While `Loading`, consumers render a neutral placeholder and never the
/// locked UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hydration<T> {
    Loading,
    Ready(T),
}

impl<T> Hydration<T> {
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    #[must_use]
    pub fn as_ref(&self) -> Hydration<&T> {
        match self {
            Self::Loading => Hydration::Loading,
            Self::Ready(value) => Hydration::Ready(value),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Hydration<U> {
        match self {
            Self::Loading => Hydration::Loading,
            Self::Ready(value) => Hydration::Ready(f(value)),
        }
    }

    #[must_use]
    pub fn ready(self) -> Option<T> {
        match self {
            Self::Loading => None,
            Self::Ready(value) => Some(value),
        }
    }
}

/// Flag flipped once after the first render pass and never reset.
#[derive(Debug, Default)]
pub struct HydrationGate {
    hydrated: AtomicBool,
}

impl HydrationGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the first render as done. Returns `true` only for the call that
    /// flipped the flag.
    pub fn mark_rendered(&self) -> bool {
        !self.hydrated.swap(true, Ordering::AcqRel)
    }

    #[must_use]
    pub fn is_hydrated(&self) -> bool {
        self.hydrated.load(Ordering::Acquire)
    }

    /// Wraps `value` according to the current phase.
    pub fn gate<T>(&self, value: impl FnOnce() -> T) -> Hydration<T> {
        if self.is_hydrated() {
            Hydration::Ready(value())
        } else {
            Hydration::Loading
        }
    }
}
