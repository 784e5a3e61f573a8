mod ids;
mod lesson;
mod progress;
mod unlock;

pub use ids::{LayerId, ParseIdError};
pub use lesson::{
    ENTRY_LAYER, LESSON_COUNT, LESSONS, LessonSection, all_layer_ids, final_layer,
    is_known_layer, lesson,
};
pub use progress::ProgressState;
pub use unlock::{IMAGE_EXERCISES, ImageExercise, UnlockRule, UnlockTrigger, unlock_rule};
