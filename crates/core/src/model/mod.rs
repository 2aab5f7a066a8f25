mod achievement;
mod external;
mod progress;
mod skill;
mod statistics;
mod submission;

pub use achievement::AchievementId;
pub use external::ExternalStats;
pub use progress::{DEFAULT_TOTAL_LESSONS, DEFAULT_TOTAL_QUIZZES, ProgressRecord};
pub use skill::{SkillName, SkillProgress};
pub use statistics::Statistics;
pub use submission::{PASSING_SCORE, POINTS_PER_CORRECT_ANSWER, Submission, SubmissionDraft};
