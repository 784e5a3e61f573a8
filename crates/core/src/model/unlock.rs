use std::time::Duration;

use crate::model::ids::LayerId;
use crate::model::lesson::{final_layer, is_known_layer};

/// Hands-on exercises of the "Images & Layers" section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImageExercise {
    LayerBuilder,
    CacheRebuild,
    LayerSharing,
}

impl ImageExercise {
    pub const ALL: [Self; 3] = [Self::LayerBuilder, Self::CacheRebuild, Self::LayerSharing];
}

pub const IMAGE_EXERCISES: usize = ImageExercise::ALL.len();

/// What makes a section schedule the unlock of the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockTrigger {
    /// The section's scripted demo ran to completion.
    DemoFinished,
    /// The section became visible.
    Shown,
    /// The section became visible; the timer is re-armed each time the number
    /// of completed exercises changes.
    Exercises {
        total: usize,
        completed_delay: Duration,
        fallback_delay: Duration,
    },
}

/// Auto-unlock of the next section after a section's trigger fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnlockRule {
    pub section: LayerId,
    pub unlocks: LayerId,
    pub trigger: UnlockTrigger,
    delay: Duration,
}

impl UnlockRule {
    /// Delay before `unlocks` is opened, given how many exercises of the
    /// section are done. Sections without exercises ignore the count.
    #[must_use]
    pub fn delay_for(&self, completed_exercises: usize) -> Duration {
        match self.trigger {
            UnlockTrigger::Exercises {
                total,
                completed_delay,
                fallback_delay,
            } => {
                if completed_exercises >= total {
                    completed_delay
                } else {
                    fallback_delay
                }
            }
            UnlockTrigger::DemoFinished | UnlockTrigger::Shown => self.delay,
        }
    }

    #[must_use]
    pub fn rearms_on_exercise(&self) -> bool {
        matches!(self.trigger, UnlockTrigger::Exercises { .. })
    }
}

/// The auto-unlock rule owned by `section`, if any.
///
/// The final section and unknown ids have none.
#[must_use]
pub fn unlock_rule(section: LayerId) -> Option<UnlockRule> {
    if !is_known_layer(section) || section == final_layer() {
        return None;
    }
    let unlocks = section.next()?;

    let (trigger, delay) = match section.value() {
        0 => (UnlockTrigger::DemoFinished, Duration::from_millis(2_000)),
        1 => (UnlockTrigger::DemoFinished, Duration::from_millis(1_000)),
        2 => (
            UnlockTrigger::Exercises {
                total: IMAGE_EXERCISES,
                completed_delay: Duration::from_millis(1_000),
                fallback_delay: Duration::from_millis(10_000),
            },
            Duration::from_millis(10_000),
        ),
        3 => (UnlockTrigger::Shown, Duration::from_millis(5_000)),
        _ => (UnlockTrigger::Shown, Duration::from_millis(3_000)),
    };
    Some(UnlockRule {
        section,
        unlocks,
        trigger,
        delay,
    })
}
