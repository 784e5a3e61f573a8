use tutorial_core::model::{LayerId, ProgressState};

/// Document-space top edge of a rendered section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionOffset {
    pub id: LayerId,
    pub top: f64,
}

/// Picks the section nearest the top third of the viewport.
///
/// The anchor line sits one third of the way down the viewport; the
/// highest-numbered unlocked section whose top edge is at or above the anchor
/// wins. Locked sections are never picked, so the indicator cannot point at
/// one. Returns `None` when no unlocked section has scrolled into range.
#[must_use]
pub fn section_in_view(
    offsets: &[SectionOffset],
    scroll_y: f64,
    viewport_height: f64,
    state: &ProgressState,
) -> Option<LayerId> {
    let anchor = scroll_y + viewport_height / 3.0;
    offsets
        .iter()
        .filter(|offset| state.is_unlocked(offset.id) && anchor >= offset.top)
        .map(|offset| offset.id)
        .max()
}
