use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{AchievementId, ExternalStats, SkillName, SkillProgress, Submission};
use crate::time::CalendarZone;

/// Denominator for the lesson completion ratio of a fresh record.
pub const DEFAULT_TOTAL_LESSONS: u32 = 20;

/// Denominator for `overall_progress` of a fresh record.
pub const DEFAULT_TOTAL_QUIZZES: u32 = 10;

/// Estimated minutes of study per answered question.
const MINUTES_PER_QUESTION: f64 = 2.0;

/// Score points per unit of skill progress.
const SCORE_PER_SKILL_POINT: f64 = 20.0;

/// Cumulative learning progress for one learner profile.
///
/// Only `apply_submission` and `merge_external` change a record after it is
/// created; `average_score` is always recomputed from the stored submissions
/// rather than adjusted in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressRecord {
    pub lessons_completed: u32,
    pub total_lessons: u32,
    pub quizzes_taken: u32,
    pub total_quizzes: u32,
    pub average_score: f64,
    pub total_points: u32,
    pub current_streak: u32,
    /// Minutes.
    pub study_time: f64,
    pub achievements: Vec<AchievementId>,
    pub skill_progress: SkillProgress,
    pub last_activity: Option<DateTime<Utc>>,
}

impl Default for ProgressRecord {
    fn default() -> Self {
        Self {
            lessons_completed: 0,
            total_lessons: DEFAULT_TOTAL_LESSONS,
            quizzes_taken: 0,
            total_quizzes: DEFAULT_TOTAL_QUIZZES,
            average_score: 0.0,
            total_points: 0,
            current_streak: 0,
            study_time: 0.0,
            achievements: Vec::new(),
            skill_progress: SkillProgress::default(),
            last_activity: None,
        }
    }
}

impl ProgressRecord {
    #[must_use]
    pub fn has_achievement(&self, id: AchievementId) -> bool {
        self.achievements.contains(&id)
    }

    /// Add an achievement if not already held. Returns true when newly added.
    pub fn grant(&mut self, id: AchievementId) -> bool {
        if self.has_achievement(id) {
            return false;
        }
        self.achievements.push(id);
        true
    }

    /// Quizzes taken as a percentage of `total_quizzes`, capped at 100.
    ///
    /// A record with `total_quizzes == 0` reports 0.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn overall_progress(&self) -> u32 {
        if self.total_quizzes == 0 {
            return 0;
        }
        let ratio = f64::from(self.quizzes_taken) / f64::from(self.total_quizzes) * 100.0;
        ratio.round().min(100.0) as u32
    }

    /// Fold a freshly stored submission into the record.
    ///
    /// `history` is the full stored submission list, already including
    /// `submission`. Returns the achievements granted by this fold.
    pub fn apply_submission(
        &mut self,
        submission: &Submission,
        history: &[Submission],
        now: DateTime<Utc>,
        zone: CalendarZone,
    ) -> Vec<AchievementId> {
        self.quizzes_taken = self.quizzes_taken.saturating_add(1);
        self.average_score = mean_score(history).unwrap_or(submission.score).round();
        self.total_points = self.total_points.saturating_add(submission.points());
        self.current_streak = self.next_streak(now, zone);
        self.last_activity = Some(now);
        self.study_time += f64::from(submission.total_questions) * MINUTES_PER_QUESTION;

        let skill = SkillName::classify_title(&submission.quiz_title);
        self.skill_progress.raise(skill, skill_gain(submission.score));

        self.evaluate_achievements()
    }

    fn next_streak(&self, now: DateTime<Utc>, zone: CalendarZone) -> u32 {
        let today = zone.date_of(now);
        let Some(last) = self.last_activity.map(|at| zone.date_of(at)) else {
            return 1;
        };

        if last == today {
            self.current_streak
        } else if today.pred_opt() == Some(last) {
            self.current_streak.saturating_add(1)
        } else {
            1
        }
    }

    /// Grant every achievement whose threshold is met. Never revokes.
    pub fn evaluate_achievements(&mut self) -> Vec<AchievementId> {
        let mut granted = Vec::new();
        for id in AchievementId::ALL {
            if id.is_earned(self.quizzes_taken, self.average_score, self.current_streak)
                && self.grant(id)
            {
                granted.push(id);
            }
        }
        granted
    }

    /// Overlay supplied backend values onto this record.
    ///
    /// Achievements, skills, totals and `last_activity` stay local.
    #[must_use]
    pub fn merge_external(&self, external: &ExternalStats) -> Self {
        Self {
            lessons_completed: ExternalStats::supplied_count(external.lessons_completed)
                .unwrap_or(self.lessons_completed),
            quizzes_taken: ExternalStats::supplied_count(external.quizzes_taken)
                .unwrap_or(self.quizzes_taken),
            average_score: ExternalStats::supplied_number(external.average_score)
                .unwrap_or(self.average_score),
            total_points: ExternalStats::supplied_count(external.total_points)
                .unwrap_or(self.total_points),
            current_streak: ExternalStats::supplied_count(external.current_streak)
                .unwrap_or(self.current_streak),
            study_time: ExternalStats::supplied_number(external.study_time)
                .unwrap_or(self.study_time),
            ..self.clone()
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean_score(history: &[Submission]) -> Option<f64> {
    if history.is_empty() {
        return None;
    }
    let total: f64 = history.iter().map(|s| s.score).sum();
    Some(total / history.len() as f64)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn skill_gain(score: f64) -> u32 {
    (score / SCORE_PER_SKILL_POINT).round().max(0.0) as u32
}
