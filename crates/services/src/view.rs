use tutorial_core::model::{LESSON_COUNT, LESSONS, LayerId, ProgressState};

use crate::hydration::Hydration;

/// How the render layer should show a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionVisibility {
    /// Progress not hydrated yet: render a neutral placeholder.
    Placeholder,
    /// Render the lock overlay.
    Locked,
    Visible,
}

impl SectionVisibility {
    #[must_use]
    pub fn of(progress: Hydration<&ProgressState>, id: LayerId) -> Self {
        match progress {
            Hydration::Loading => Self::Placeholder,
            Hydration::Ready(state) if state.is_unlocked(id) => Self::Visible,
            Hydration::Ready(_) => Self::Locked,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DotState {
    Locked,
    Unlocked,
    Current,
}

/// One section marker in the progress bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressDot {
    pub id: LayerId,
    pub title: &'static str,
    pub state: DotState,
    /// Whether the connector to the next dot is filled; `None` on the last dot.
    pub connector_filled: Option<bool>,
}

impl ProgressDot {
    #[must_use]
    pub fn is_navigable(&self) -> bool {
        !matches!(self.state, DotState::Locked)
    }
}

/// Presentation-agnostic progress bar: one dot per section plus a rounded
/// percentage of unlocked sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressBarView {
    pub percent: u8,
    pub dots: Vec<ProgressDot>,
}

impl ProgressBarView {
    #[must_use]
    pub fn from_state(state: &ProgressState) -> Self {
        let dots = LESSONS
            .iter()
            .enumerate()
            .map(|(idx, lesson)| {
                let dot_state = if !state.is_unlocked(lesson.id) {
                    DotState::Locked
                } else if state.current() == lesson.id {
                    DotState::Current
                } else {
                    DotState::Unlocked
                };
                let connector_filled = LESSONS
                    .get(idx + 1)
                    .map(|next| state.is_unlocked(next.id));
                ProgressDot {
                    id: lesson.id,
                    title: lesson.title,
                    state: dot_state,
                    connector_filled,
                }
            })
            .collect();

        Self {
            percent: percent_unlocked(state.unlocked_count()),
            dots,
        }
    }
}

// Rounds half up, matching how the percentage is displayed.
fn percent_unlocked(unlocked: usize) -> u8 {
    let unlocked = unlocked.min(LESSON_COUNT);
    let rounded = (unlocked * 200 + LESSON_COUNT) / (2 * LESSON_COUNT);
    u8::try_from(rounded).unwrap_or(100)
}
