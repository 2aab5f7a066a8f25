use std::sync::Arc;

use chrono::Duration;
use progress_core::model::{
    AchievementId, ExternalStats, ProgressRecord, SkillProgress, SubmissionDraft,
};
use progress_core::time::fixed_now;
use services::{
    CalendarZone, Clock, PROGRESS_KEY, ProgressStore, ProgressStoreConfig, ProgressStoreError,
    SUBMISSIONS_KEY,
};
use storage::{InMemoryStore, KeyValueStore, StorageError};

fn store_on(backend: &InMemoryStore) -> ProgressStore {
    ProgressStore::new(Arc::new(backend.clone()))
        .with_config(ProgressStoreConfig::default().with_calendar_zone(CalendarZone::utc()))
        .with_clock(Clock::fixed(fixed_now()))
}

fn quiz(title: &str, score: f64, correct: u32, total: u32) -> SubmissionDraft {
    SubmissionDraft::new("quiz-1", title, score).with_answers(correct, total)
}

struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("disabled".into()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("disabled".into()))
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("disabled".into()))
    }
}

#[test]
fn empty_store_reads_default_record() {
    let backend = InMemoryStore::new();
    let store = store_on(&backend);

    let progress = store.get_progress();
    assert_eq!(progress, ProgressRecord::default());
    assert_eq!(progress.total_lessons, 20);
    assert_eq!(progress.total_quizzes, 10);
    assert_eq!(progress.skill_progress, SkillProgress::default());
    assert!(store.get_submissions().is_empty());
    // Defaults are not written back.
    assert!(backend.is_empty());
}

#[test]
fn corrupt_entries_read_as_defaults() {
    let backend = InMemoryStore::new();
    backend.insert_raw(PROGRESS_KEY, "{not json").unwrap();
    backend.insert_raw(SUBMISSIONS_KEY, "[{\"id\":").unwrap();
    let store = store_on(&backend);

    assert_eq!(store.get_progress(), ProgressRecord::default());
    assert!(store.get_submissions().is_empty());
    assert!(store.try_get_progress().is_err());

    // A new submission replaces the unreadable list.
    let saved = store.save_submission(quiz("Quiz", 80.0, 8, 10));
    assert!(saved.is_some());
    assert_eq!(store.get_submissions().len(), 1);
}

#[test]
fn strict_save_reports_unreadable_history_without_writing() {
    let backend = InMemoryStore::new();
    backend.insert_raw(SUBMISSIONS_KEY, "[{\"id\":").unwrap();
    let store = store_on(&backend);

    let err = store.try_save_submission(quiz("Quiz", 80.0, 8, 10)).unwrap_err();
    assert!(matches!(err, ProgressStoreError::Malformed { .. }));
    assert_eq!(
        backend.get(SUBMISSIONS_KEY).unwrap().as_deref(),
        Some("[{\"id\":")
    );
    assert_eq!(backend.get(PROGRESS_KEY).unwrap(), None);
}

#[test]
fn non_finite_scores_are_refused_and_history_kept() {
    let backend = InMemoryStore::new();
    let store = store_on(&backend);
    for _ in 0..3 {
        store.save_submission(quiz("Quiz", 80.0, 8, 10)).unwrap();
    }

    assert!(store.save_submission(quiz("Quiz", f64::NAN, 8, 10)).is_none());
    assert!(
        store
            .save_submission(quiz("Quiz", 80.0, 8, 10).with_time_spent(f64::INFINITY))
            .is_none()
    );
    let err = store.try_save_submission(quiz("Quiz", f64::NEG_INFINITY, 0, 10)).unwrap_err();
    assert!(matches!(err, ProgressStoreError::InvalidSubmission(_)));

    assert_eq!(store.try_get_submissions().unwrap().len(), 3);
    let progress = store.try_get_progress().unwrap().unwrap();
    assert_eq!(progress.quizzes_taken, 3);
    assert_eq!(progress.average_score, 80.0);

    store.save_submission(quiz("Quiz", 100.0, 10, 10)).unwrap();
    assert_eq!(store.get_submissions().len(), 4);
    assert_eq!(store.get_progress().quizzes_taken, 4);
}

#[test]
fn unavailable_storage_never_panics() {
    let store = ProgressStore::new(Arc::new(FailingStore)).with_clock(Clock::fixed(fixed_now()));

    assert_eq!(store.get_progress(), ProgressRecord::default());
    assert!(store.get_submissions().is_empty());
    assert!(!store.save_progress(&ProgressRecord::default()));
    assert!(store.save_submission(quiz("Quiz", 90.0, 9, 10)).is_none());
    assert_eq!(store.reset_progress(), ProgressRecord::default());
    assert_eq!(store.get_statistics().total_submissions, 0);

    let merged = store.import_progress(&ExternalStats {
        quizzes_taken: Some(4),
        ..ExternalStats::default()
    });
    assert_eq!(merged.quizzes_taken, 4);
}

#[test]
fn average_is_mean_of_all_scores() {
    let backend = InMemoryStore::new();
    let store = store_on(&backend);
    for (score, correct) in [(60.0, 3), (80.0, 8), (100.0, 5)] {
        store.save_submission(quiz("Quiz", score, correct, 10)).unwrap();
    }

    let progress = store.get_progress();
    assert_eq!(progress.average_score, 80.0);
    assert_eq!(progress.quizzes_taken, 3);
    assert_eq!(progress.total_points, 160);
    assert_eq!(progress.study_time, 60.0);
}

#[test]
fn points_grow_by_ten_per_correct_answer() {
    let backend = InMemoryStore::new();
    let store = store_on(&backend);
    store.save_submission(quiz("Quiz", 50.0, 2, 4)).unwrap();
    let before = store.get_progress().total_points;

    store.save_submission(quiz("Quiz", 70.0, 7, 10)).unwrap();
    assert_eq!(store.get_progress().total_points, before + 70);
}

#[test]
fn submission_list_is_capped_newest_first() {
    let backend = InMemoryStore::new();
    let store = store_on(&backend);
    for n in 0..55 {
        let draft = SubmissionDraft::new(format!("quiz-{n}"), "Quiz", 75.0).with_answers(1, 1);
        store.save_submission(draft).unwrap();
    }

    let submissions = store.get_submissions();
    assert_eq!(submissions.len(), 50);
    assert_eq!(submissions[0].quiz_id, "quiz-54");
    assert_eq!(submissions[49].quiz_id, "quiz-5");
    for n in 0..5 {
        let id = format!("quiz-{n}");
        assert!(submissions.iter().all(|s| s.quiz_id != id));
    }
    // Same-millisecond inserts still get distinct, increasing ids.
    assert!(submissions.windows(2).all(|w| w[0].id > w[1].id));
    assert_eq!(store.get_progress().quizzes_taken, 55);
}

#[test]
fn streak_follows_calendar_days() {
    let backend = InMemoryStore::new();
    let mut store = store_on(&backend);
    let now = fixed_now();

    let seed = |streak: u32, last: chrono::DateTime<chrono::Utc>| ProgressRecord {
        current_streak: streak,
        last_activity: Some(last),
        ..ProgressRecord::default()
    };

    assert!(store.save_progress(&seed(4, now - Duration::days(1))));
    store.save_submission(quiz("Quiz", 70.0, 7, 10)).unwrap();
    assert_eq!(store.get_progress().current_streak, 5);

    assert!(store.save_progress(&seed(4, now - Duration::days(3))));
    store.save_submission(quiz("Quiz", 70.0, 7, 10)).unwrap();
    assert_eq!(store.get_progress().current_streak, 1);

    assert!(store.save_progress(&seed(4, now - Duration::hours(1))));
    store.save_submission(quiz("Quiz", 70.0, 7, 10)).unwrap();
    assert_eq!(store.get_progress().current_streak, 4);

    // Seven consecutive days earn the streak achievement.
    store.reset_progress();
    let mut clock = Clock::fixed(now);
    for _ in 0..7 {
        store.set_clock(clock);
        store.save_submission(quiz("Quiz", 50.0, 5, 10)).unwrap();
        clock.advance(Duration::days(1));
    }
    let progress = store.get_progress();
    assert_eq!(progress.current_streak, 7);
    assert!(progress.has_achievement(AchievementId::StreakChampion));
    assert_eq!(progress.last_activity, Some(now + Duration::days(6)));
}

#[test]
fn quiz_master_survives_a_bad_score() {
    let backend = InMemoryStore::new();
    let store = store_on(&backend);
    for _ in 0..5 {
        store.save_submission(quiz("Quiz", 85.0, 8, 10)).unwrap();
    }
    assert!(store.get_progress().has_achievement(AchievementId::QuizMaster));

    store.save_submission(quiz("Quiz", 10.0, 1, 10)).unwrap();
    let progress = store.get_progress();
    assert!(progress.average_score < 80.0);
    assert!(progress.has_achievement(AchievementId::QuizMaster));
    assert!(progress.has_achievement(AchievementId::FirstQuiz));
    assert!(!progress.has_achievement(AchievementId::HighScorer));
}

#[test]
fn skill_follows_quiz_title() {
    let backend = InMemoryStore::new();
    let store = store_on(&backend);

    store
        .save_submission(quiz("Vocabulary Builder", 100.0, 10, 10))
        .unwrap();
    let skills = store.get_progress().skill_progress;
    assert_eq!(skills.vocabulary, 5);
    assert_eq!(skills.grammar + skills.listening + skills.speaking + skills.reading, 0);

    store.save_submission(quiz("Daily Drill", 62.0, 6, 10)).unwrap();
    let skills = store.get_progress().skill_progress;
    assert_eq!(skills.grammar, 3);
    assert_eq!(skills.vocabulary, 5);
}

#[test]
fn reset_clears_both_keys() {
    let backend = InMemoryStore::new();
    let store = store_on(&backend);
    store.save_submission(quiz("Reading", 90.0, 9, 10)).unwrap();
    assert!(!backend.is_empty());

    assert_eq!(store.reset_progress(), ProgressRecord::default());
    assert_eq!(store.get_progress(), ProgressRecord::default());
    assert!(store.get_submissions().is_empty());
    assert!(backend.is_empty());
}

#[test]
fn import_overrides_only_supplied_fields() {
    let backend = InMemoryStore::new();
    let store = store_on(&backend);
    let local = ProgressRecord {
        lessons_completed: 2,
        quizzes_taken: 3,
        achievements: vec![AchievementId::FirstQuiz],
        ..ProgressRecord::default()
    };
    assert!(store.save_progress(&local));

    let external: ExternalStats = serde_json::from_str(r#"{"lessons_completed": 5}"#).unwrap();
    let merged = store.import_progress(&external);

    assert_eq!(merged.lessons_completed, 5);
    assert_eq!(merged.quizzes_taken, 3);
    assert_eq!(merged.achievements, vec![AchievementId::FirstQuiz]);
    assert_eq!(store.get_progress(), merged);
    assert!(store.get_submissions().is_empty());
}

#[test]
fn failed_submission_write_leaves_record_untouched() {
    let backend = InMemoryStore::with_quota(64);
    let store = store_on(&backend);

    assert!(store.save_submission(quiz("Quiz", 90.0, 9, 10)).is_none());
    assert!(store.try_get_progress().unwrap().is_none());
    assert!(store.get_submissions().is_empty());
}

#[test]
fn statistics_summarize_submissions() {
    let backend = InMemoryStore::new();
    let store = store_on(&backend);
    for score in [90.0, 40.0, 75.0, 69.0, 100.0, 85.0] {
        store.save_submission(quiz("Quiz", score, 1, 10)).unwrap();
    }

    let stats = store.get_statistics();
    assert_eq!(stats.total_submissions, 6);
    assert_eq!(stats.passed_quizzes, 4);
    assert_eq!(stats.recent_submissions.len(), 5);
    assert_eq!(stats.recent_submissions[0].score, 85.0);
    assert_eq!(stats.overall_progress, 60);
    assert_eq!(stats.progress.quizzes_taken, 6);
    assert!(stats.has_local_data());

    assert_eq!(store.get_recent_submissions(2).len(), 2);
    assert_eq!(store.recent_submissions().len(), 6);
}

#[test]
fn key_prefixes_isolate_profiles_on_one_backend() {
    let backend = InMemoryStore::new();
    let alice = ProgressStore::new(Arc::new(backend.clone()))
        .with_config(ProgressStoreConfig::with_key_prefix("alice:"))
        .with_clock(Clock::fixed(fixed_now()));
    let bob = ProgressStore::new(Arc::new(backend.clone()))
        .with_config(ProgressStoreConfig::with_key_prefix("bob:"))
        .with_clock(Clock::fixed(fixed_now()));

    alice.save_submission(quiz("Quiz", 90.0, 9, 10)).unwrap();
    assert_eq!(alice.get_progress().quizzes_taken, 1);
    assert_eq!(bob.get_progress().quizzes_taken, 0);
    assert_eq!(backend.get(PROGRESS_KEY).unwrap(), None);

    bob.reset_progress();
    assert_eq!(alice.get_submissions().len(), 1);
}

#[test]
fn persisted_layout_uses_camel_case_json() {
    let backend = InMemoryStore::new();
    let store = store_on(&backend);
    store
        .save_submission(quiz("Listening Lab", 80.0, 4, 5).with_time_spent(95.0))
        .unwrap();

    let progress: serde_json::Value =
        serde_json::from_str(&backend.get(PROGRESS_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(progress["quizzesTaken"], 1);
    assert_eq!(progress["skillProgress"]["listening"], 4);
    assert_eq!(progress["achievements"], serde_json::json!(["first_quiz"]));

    let submissions: serde_json::Value =
        serde_json::from_str(&backend.get(SUBMISSIONS_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(submissions[0]["quizTitle"], "Listening Lab");
    assert_eq!(submissions[0]["isCorrect"], true);
    assert_eq!(submissions[0]["timeSpent"], 95.0);
}
