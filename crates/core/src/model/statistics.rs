use serde::{Deserialize, Serialize};

use crate::model::{ProgressRecord, Submission};

/// Read-only dashboard view: the progress record plus submission-derived counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    #[serde(flatten)]
    pub progress: ProgressRecord,
    pub recent_submissions: Vec<Submission>,
    pub total_submissions: usize,
    pub passed_quizzes: usize,
    pub overall_progress: u32,
}

impl Statistics {
    /// Build the view from a record and the newest-first submission list.
    #[must_use]
    pub fn from_parts(progress: ProgressRecord, submissions: &[Submission], recent: usize) -> Self {
        let overall_progress = progress.overall_progress();
        Self {
            recent_submissions: submissions.iter().take(recent).cloned().collect(),
            total_submissions: submissions.len(),
            passed_quizzes: submissions.iter().filter(|s| s.is_correct).count(),
            overall_progress,
            progress,
        }
    }

    /// Whether any quiz has been recorded locally.
    ///
    /// Dashboards prefer this view over placeholder data only when true.
    #[must_use]
    pub fn has_local_data(&self) -> bool {
        self.total_submissions > 0
    }
}
