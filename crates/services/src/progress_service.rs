use std::sync::Arc;

use log::{debug, error, info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;

use progress_core::model::{
    ExternalStats, ProgressRecord, Statistics, Submission, SubmissionDraft,
};
use progress_core::time::Clock;
use storage::KeyValueStore;

use crate::config::{DEFAULT_RECENT_LIMIT, ProgressStoreConfig};
use crate::error::ProgressStoreError;

/// Local progress cache: one progress record and a capped, newest-first list
/// of quiz submissions, both kept as JSON under fixed storage keys.
///
/// The plain methods never fail. Read problems degrade to defaults, write
/// problems to `false`/`None`, and every failure is logged. The `try_*`
/// variants expose the underlying error instead.
///
/// This is the only writer of its two keys. Operations are synchronous
/// read-modify-write passes with no locking across instances, so two stores
/// pointed at the same keys overwrite each other (last writer wins).
pub struct ProgressStore {
    store: Arc<dyn KeyValueStore>,
    config: ProgressStoreConfig,
    clock: Clock,
}

impl ProgressStore {
    /// A store with default keys, real time and local calendar days.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            config: ProgressStoreConfig::default(),
            clock: Clock::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: ProgressStoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the clock (usually for deterministic testing).
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn set_clock(&mut self, clock: Clock) {
        self.clock = clock;
    }

    #[must_use]
    pub fn config(&self) -> &ProgressStoreConfig {
        &self.config
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    //
    // ─── PROGRESS RECORD ───────────────────────────────────────────────────────
    //

    /// Read the stored record, `None` when nothing has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns `ProgressStoreError` if storage fails or the value is not a valid record.
    pub fn try_get_progress(&self) -> Result<Option<ProgressRecord>, ProgressStoreError> {
        self.read_json(&self.config.progress_key)
    }

    /// The stored record, or the default record when missing or unreadable.
    ///
    /// The default is returned without being persisted.
    #[must_use]
    pub fn get_progress(&self) -> ProgressRecord {
        match self.try_get_progress() {
            Ok(record) => record.unwrap_or_default(),
            Err(err) => {
                warn!("Error reading progress: {err}");
                ProgressRecord::default()
            }
        }
    }

    /// Persist `record` as-is.
    ///
    /// # Errors
    ///
    /// Returns `ProgressStoreError` if serialization or the write fails.
    pub fn try_save_progress(&self, record: &ProgressRecord) -> Result<(), ProgressStoreError> {
        self.write_json(&self.config.progress_key, record)
    }

    /// Persist `record`; false (and logged) on failure.
    pub fn save_progress(&self, record: &ProgressRecord) -> bool {
        match self.try_save_progress(record) {
            Ok(()) => true,
            Err(err) => {
                error!("Error saving progress: {err}");
                false
            }
        }
    }

    //
    // ─── SUBMISSIONS ───────────────────────────────────────────────────────────
    //

    /// Read the stored submissions, newest first. Missing key reads as empty.
    ///
    /// # Errors
    ///
    /// Returns `ProgressStoreError` if storage fails or the value is not a submission list.
    pub fn try_get_submissions(&self) -> Result<Vec<Submission>, ProgressStoreError> {
        Ok(self
            .read_json(&self.config.submissions_key)?
            .unwrap_or_default())
    }

    /// Stored submissions, newest first; empty when missing or unreadable.
    #[must_use]
    pub fn get_submissions(&self) -> Vec<Submission> {
        self.try_get_submissions().unwrap_or_else(|err| {
            warn!("Error reading submissions: {err}");
            Vec::new()
        })
    }

    /// The `limit` newest submissions.
    #[must_use]
    pub fn get_recent_submissions(&self, limit: usize) -> Vec<Submission> {
        let mut submissions = self.get_submissions();
        submissions.truncate(limit);
        submissions
    }

    /// The `DEFAULT_RECENT_LIMIT` newest submissions.
    #[must_use]
    pub fn recent_submissions(&self) -> Vec<Submission> {
        self.get_recent_submissions(DEFAULT_RECENT_LIMIT)
    }

    /// Record a completed quiz and fold it into the progress record.
    ///
    /// The submission list is written first; the record is recomputed from
    /// that list (new entry included) and written second. If the first write
    /// fails the record is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `ProgressStoreError` if the draft holds a non-finite number,
    /// either stored value cannot be read, or either write fails.
    pub fn try_save_submission(
        &self,
        draft: SubmissionDraft,
    ) -> Result<Submission, ProgressStoreError> {
        let submissions = self.try_get_submissions()?;
        let progress = self.try_get_progress()?.unwrap_or_default();
        self.record_submission(draft, submissions, progress)
    }

    /// Record a completed quiz; `None` (and logged) if the draft is rejected
    /// or persistence fails.
    ///
    /// Unreadable stored values are replaced, as with `get_progress` and
    /// `get_submissions`.
    pub fn save_submission(&self, draft: SubmissionDraft) -> Option<Submission> {
        let submissions = self.get_submissions();
        let progress = self.get_progress();
        match self.record_submission(draft, submissions, progress) {
            Ok(submission) => Some(submission),
            Err(err) => {
                error!("Error saving submission: {err}");
                None
            }
        }
    }

    fn record_submission(
        &self,
        draft: SubmissionDraft,
        mut submissions: Vec<Submission>,
        mut progress: ProgressRecord,
    ) -> Result<Submission, ProgressStoreError> {
        draft.check_finite()?;
        let now = self.clock.now();
        let id = next_submission_id(now.timestamp_millis(), submissions.first());
        let submission = Submission::from_draft(draft, id, now);

        submissions.insert(0, submission.clone());
        submissions.truncate(self.config.effective_cap());
        self.write_json(&self.config.submissions_key, &submissions)?;

        let granted =
            progress.apply_submission(&submission, &submissions, now, self.config.calendar_zone);
        self.write_json(&self.config.progress_key, &progress)?;

        debug!(
            "Recorded submission {} for quiz {} (score {}, average now {}, streak {})",
            submission.id,
            submission.quiz_id,
            submission.score,
            progress.average_score,
            progress.current_streak
        );
        for achievement in granted {
            info!("Achievement unlocked: {achievement}");
        }

        Ok(submission)
    }

    //
    // ─── DERIVED VIEWS & MAINTENANCE ───────────────────────────────────────────
    //

    /// Progress record plus submission-derived counts for dashboards.
    #[must_use]
    pub fn get_statistics(&self) -> Statistics {
        let progress = self.get_progress();
        let submissions = self.get_submissions();
        Statistics::from_parts(progress, &submissions, self.config.statistics_recent)
    }

    /// Delete both keys and return a fresh default record.
    ///
    /// Removal failures are logged; the default is returned regardless.
    pub fn reset_progress(&self) -> ProgressRecord {
        for key in [&self.config.progress_key, &self.config.submissions_key] {
            if let Err(err) = self.store.remove(key) {
                error!("Error clearing {key}: {err}");
            }
        }
        info!("Progress reset");
        ProgressRecord::default()
    }

    /// Overlay backend statistics onto the local record and persist it.
    ///
    /// Only fields the backend supplies (present and non-zero) replace local
    /// values. Achievements, skills and submissions are left alone.
    pub fn import_progress(&self, external: &ExternalStats) -> ProgressRecord {
        let merged = self.get_progress().merge_external(external);
        if self.save_progress(&merged) {
            info!("Imported backend progress");
        } else {
            warn!("Imported progress is only held in memory");
        }
        merged
    }

    //
    // ─── JSON PLUMBING ─────────────────────────────────────────────────────────
    //

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ProgressStoreError> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| ProgressStoreError::Malformed {
                key: key.to_owned(),
                source,
            })
    }

    fn write_json<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), ProgressStoreError> {
        let raw = serde_json::to_string(value).map_err(|source| ProgressStoreError::Serialize {
            key: key.to_owned(),
            source,
        })?;
        self.store.set(key, &raw)?;
        Ok(())
    }
}

/// Millisecond timestamp id, bumped past the newest stored id when two
/// submissions land in the same millisecond or the clock steps backwards.
fn next_submission_id(now_millis: i64, newest: Option<&Submission>) -> i64 {
    match newest {
        Some(newest) if now_millis <= newest.id => newest.id.saturating_add(1),
        _ => now_millis,
    }
}
