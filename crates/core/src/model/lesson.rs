use crate::model::ids::LayerId;

/// A lesson section of the tutorial, in curriculum order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LessonSection {
    pub id: LayerId,
    pub title: &'static str,
    pub description: &'static str,
}

/// The section every learner starts on; it is never gated.
pub const ENTRY_LAYER: LayerId = LayerId::new(0);

/// Number of sections in the catalogue.
pub const LESSON_COUNT: usize = 9;

/// The full curriculum, ordered by id.
pub const LESSONS: [LessonSection; LESSON_COUNT] = [
    section(0, "The Problem", "Why containers exist"),
    section(1, "Container Basics", "What is a container vs VM"),
    section(2, "Images & Layers", "How images are built"),
    section(3, "Isolation", "Namespaces explained"),
    section(4, "Resource Control", "Cgroups and limits"),
    section(5, "Storage", "Union filesystems and volumes"),
    section(6, "Networking", "Container communication"),
    section(7, "Orchestration", "Multi-container apps"),
    section(8, "The Full Picture", "Docker architecture"),
];

const fn section(id: u8, title: &'static str, description: &'static str) -> LessonSection {
    LessonSection {
        id: LayerId::new(id),
        title,
        description,
    }
}

/// Looks up a section by id.
#[must_use]
pub fn lesson(id: LayerId) -> Option<&'static LessonSection> {
    LESSONS.get(usize::from(id.value()))
}

#[must_use]
pub fn is_known_layer(id: LayerId) -> bool {
    usize::from(id.value()) < LESSON_COUNT
}

/// All section ids in ascending order.
#[must_use]
pub fn all_layer_ids() -> Vec<LayerId> {
    LESSONS.iter().map(|lesson| lesson.id).collect()
}

/// The last section of the curriculum.
#[must_use]
pub fn final_layer() -> LayerId {
    LESSONS[LESSON_COUNT - 1].id
}
