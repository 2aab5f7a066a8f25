use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// One-way milestone flags awarded by the progress fold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementId {
    FirstQuiz,
    QuizMaster,
    StreakChampion,
    HighScorer,
}

impl AchievementId {
    /// Evaluation order; newly earned achievements are appended in this order.
    pub const ALL: [AchievementId; 4] = [
        AchievementId::FirstQuiz,
        AchievementId::QuizMaster,
        AchievementId::StreakChampion,
        AchievementId::HighScorer,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AchievementId::FirstQuiz => "first_quiz",
            AchievementId::QuizMaster => "quiz_master",
            AchievementId::StreakChampion => "streak_champion",
            AchievementId::HighScorer => "high_scorer",
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            AchievementId::FirstQuiz => "First Quiz",
            AchievementId::QuizMaster => "Quiz Master",
            AchievementId::StreakChampion => "Streak Champion",
            AchievementId::HighScorer => "High Scorer",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            AchievementId::FirstQuiz => "Completed your first quiz",
            AchievementId::QuizMaster => "Took 5 quizzes with an average of 80 or more",
            AchievementId::StreakChampion => "Practiced 7 days in a row",
            AchievementId::HighScorer => "Reached an average score of 90 or more",
        }
    }

    /// Whether the threshold for this achievement is met.
    #[must_use]
    pub fn is_earned(self, quizzes_taken: u32, average_score: f64, current_streak: u32) -> bool {
        match self {
            AchievementId::FirstQuiz => quizzes_taken >= 1,
            AchievementId::QuizMaster => quizzes_taken >= 5 && average_score >= 80.0,
            AchievementId::StreakChampion => current_streak >= 7,
            AchievementId::HighScorer => average_score >= 90.0,
        }
    }
}

impl fmt::Display for AchievementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AchievementId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s.trim())
            .ok_or_else(|| ModelError::UnknownAchievement(s.to_owned()))
    }
}
