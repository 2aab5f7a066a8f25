use serde::{Deserialize, Serialize};

/// Statistics reported by the remote backend, in its snake_case wire shape.
///
/// A field counts as supplied only when present and non-zero; zero and
/// missing values leave the local value in place during a merge.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalStats {
    pub lessons_completed: Option<u32>,
    pub quizzes_taken: Option<u32>,
    pub average_score: Option<f64>,
    pub total_points: Option<u32>,
    pub current_streak: Option<u32>,
    pub study_time: Option<f64>,
}

impl ExternalStats {
    #[must_use]
    pub fn supplied_count(value: Option<u32>) -> Option<u32> {
        value.filter(|v| *v != 0)
    }

    #[must_use]
    pub fn supplied_number(value: Option<f64>) -> Option<f64> {
        value.filter(|v| *v != 0.0 && !v.is_nan())
    }

    /// True when no field would override local data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        Self::supplied_count(self.lessons_completed).is_none()
            && Self::supplied_count(self.quizzes_taken).is_none()
            && Self::supplied_number(self.average_score).is_none()
            && Self::supplied_count(self.total_points).is_none()
            && Self::supplied_count(self.current_streak).is_none()
            && Self::supplied_number(self.study_time).is_none()
    }
}
