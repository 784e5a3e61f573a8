use std::fmt::Write as _;

use services::{DotState, Hydration, ProgressBarView, ProgressStore};
use tutorial_core::model::{LESSONS, ProgressState};

/// Text rendering of the progress bar and section list.
pub fn render(store: &ProgressStore) -> String {
    match store.view() {
        Hydration::Loading => String::from("loading progress…\n"),
        Hydration::Ready(state) => render_state(&state),
    }
}

fn render_state(state: &ProgressState) -> String {
    let bar = ProgressBarView::from_state(state);
    let mut out = String::new();

    for dot in &bar.dots {
        out.push_str(match dot.state {
            DotState::Current => "◉",
            DotState::Unlocked => "●",
            DotState::Locked => "○",
        });
        match dot.connector_filled {
            Some(true) => out.push_str("━━"),
            Some(false) => out.push_str("──"),
            None => {}
        }
    }
    let _ = writeln!(out, "  {}%", bar.percent);
    out.push('\n');

    for lesson in &LESSONS {
        let marker = if state.current() == lesson.id { '>' } else { ' ' };
        let status = if state.is_unlocked(lesson.id) { "" } else { "  [locked]" };
        let _ = writeln!(
            out,
            "{marker} {id}. {title}: {description}{status}",
            id = lesson.id,
            title = lesson.title,
            description = lesson.description,
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use services::ProgressConfig;
    use tutorial_core::model::LayerId;

    #[test]
    fn loading_renders_placeholder_only() {
        let store = ProgressStore::in_memory(&ProgressConfig::gated());
        assert_eq!(render(&store), "loading progress…\n");
    }

    #[test]
    fn gated_progress_marks_locked_sections() {
        let store = ProgressStore::in_memory(&ProgressConfig::gated());
        store.unlock_layer(LayerId::new(1));
        store.mark_rendered();

        let text = render(&store);
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("●━━◉──○──○──○──○──○──○──○  22%")
        );
        assert!(text.contains("> 1. Container Basics: What is a container vs VM\n"));
        assert!(text.contains("  2. Images & Layers: How images are built  [locked]\n"));
        assert!(!text.contains("0. The Problem: Why containers exist  [locked]"));
    }

    #[test]
    fn fully_unlocked_progress_has_no_locks() {
        let store = ProgressStore::in_memory(&ProgressConfig::default());
        store.mark_rendered();
        let text = render(&store);
        assert!(text.starts_with("◉━━●━━●━━●━━●━━●━━●━━●━━●  100%\n"));
        assert!(!text.contains("[locked]"));
    }
}
