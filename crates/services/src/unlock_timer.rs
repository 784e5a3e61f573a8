//! Delayed unlocks scheduled by sections, scoped to the section's lifetime.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, trace};
use tutorial_core::model::{ImageExercise, LayerId, UnlockRule, UnlockTrigger, unlock_rule};

use crate::progress_store::ProgressStore;

/// A pending `unlock_layer` call. Dropping the timer cancels it.
#[derive(Debug)]
pub struct UnlockTimer {
    target: LayerId,
    handle: JoinHandle<()>,
}

impl UnlockTimer {
    /// Unlocks `target` on `store` after `delay`.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn schedule(store: Arc<ProgressStore>, target: LayerId, delay: Duration) -> Self {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            store.unlock_layer(target);
        });
        Self { target, handle }
    }

    #[must_use]
    pub fn target(&self) -> LayerId {
        self.target
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Dropping the timer aborts its task; this only makes that explicit.
    pub fn cancel(self) {}
}

impl Drop for UnlockTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Arms each section's auto-unlock rule in response to render-layer events.
///
/// At most one timer per section is alive; re-arming replaces it and removing
/// the section cancels it.
pub struct SectionUnlocker {
    store: Arc<ProgressStore>,
    timers: HashMap<LayerId, UnlockTimer>,
    shown: HashSet<LayerId>,
    exercises: BTreeSet<ImageExercise>,
}

impl SectionUnlocker {
    #[must_use]
    pub fn new(store: Arc<ProgressStore>) -> Self {
        Self {
            store,
            timers: HashMap::new(),
            shown: HashSet::new(),
            exercises: BTreeSet::new(),
        }
    }

    /// The section was rendered. Arms rules triggered by visibility.
    ///
    /// Calling this again for a shown section re-checks it without replacing
    /// a running timer.
    pub fn section_shown(&mut self, section: LayerId) {
        self.shown.insert(section);
        self.arm_if_idle(section);
    }

    /// Progress was hydrated or changed. Shown sections that became unlocked
    /// arm their pending rule.
    pub fn progress_changed(&mut self) {
        let shown: Vec<LayerId> = self.shown.iter().copied().collect();
        for section in shown {
            self.arm_if_idle(section);
        }
    }

    /// The section's scripted demo completed.
    pub fn demo_finished(&mut self, section: LayerId) {
        if let Some(rule) = unlock_rule(section) {
            if rule.trigger == UnlockTrigger::DemoFinished {
                self.arm(rule);
            }
        }
    }

    /// An image exercise was completed; visible sections that depend on
    /// exercise progress restart their timer with the new delay.
    pub fn exercise_completed(&mut self, exercise: ImageExercise) {
        if !self.exercises.insert(exercise) {
            return;
        }
        let rearm: Vec<UnlockRule> = self
            .shown
            .iter()
            .filter_map(|section| unlock_rule(*section))
            .filter(UnlockRule::rearms_on_exercise)
            .collect();
        for rule in rearm {
            self.arm(rule);
        }
    }

    /// The section left the render tree: its pending unlock is cancelled.
    pub fn section_removed(&mut self, section: LayerId) {
        self.shown.remove(&section);
        if let Some(timer) = self.timers.remove(&section) {
            trace!(section = %section, target = %timer.target(), "unlock timer cancelled");
            timer.cancel();
        }
    }

    #[must_use]
    pub fn completed_exercises(&self) -> usize {
        self.exercises.len()
    }

    #[must_use]
    pub fn is_armed(&self, section: LayerId) -> bool {
        self.timers
            .get(&section)
            .is_some_and(|timer| !timer.is_finished())
    }

    fn arm_if_idle(&mut self, section: LayerId) {
        if self.is_armed(section) {
            return;
        }
        if let Some(rule) = unlock_rule(section) {
            if rule.trigger != UnlockTrigger::DemoFinished {
                self.arm(rule);
            }
        }
    }

    fn arm(&mut self, rule: UnlockRule) {
        // Visibility-driven sections only exist once progress is hydrated.
        if rule.trigger != UnlockTrigger::DemoFinished && !self.store.hydrated() {
            return;
        }
        if !self.store.is_unlocked(rule.section) || self.store.is_unlocked(rule.unlocks) {
            return;
        }

        let delay = rule.delay_for(self.completed_exercises());
        debug!(
            section = %rule.section,
            target = %rule.unlocks,
            delay_ms = delay.as_millis(),
            "unlock timer armed"
        );
        let timer = UnlockTimer::schedule(Arc::clone(&self.store), rule.unlocks, delay);
        self.timers.insert(rule.section, timer);
    }
}
