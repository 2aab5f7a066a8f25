use progress_core::CalendarZone;

/// Storage key holding the serialized progress record.
pub const PROGRESS_KEY: &str = "english_learning_progress";

/// Storage key holding the serialized submission list.
pub const SUBMISSIONS_KEY: &str = "english_learning_submissions";

/// Maximum number of submissions kept; older entries are dropped.
pub const SUBMISSION_CAP: usize = 50;

/// Default length of `get_recent_submissions`.
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Number of submissions included in the statistics view.
pub const STATISTICS_RECENT_LIMIT: usize = 5;

/// Settings for one `ProgressStore` instance.
///
/// Keys are injectable so several isolated stores can share one backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressStoreConfig {
    pub progress_key: String,
    pub submissions_key: String,
    /// Values below 1 are treated as 1.
    pub submission_cap: usize,
    pub statistics_recent: usize,
    pub export_recent: usize,
    pub calendar_zone: CalendarZone,
}

impl Default for ProgressStoreConfig {
    fn default() -> Self {
        Self {
            progress_key: PROGRESS_KEY.to_owned(),
            submissions_key: SUBMISSIONS_KEY.to_owned(),
            submission_cap: SUBMISSION_CAP,
            statistics_recent: STATISTICS_RECENT_LIMIT,
            export_recent: DEFAULT_RECENT_LIMIT,
            calendar_zone: CalendarZone::Local,
        }
    }
}

impl ProgressStoreConfig {
    /// Default settings with both keys prefixed, e.g. `"alice:"`.
    #[must_use]
    pub fn with_key_prefix(prefix: &str) -> Self {
        Self {
            progress_key: format!("{prefix}{PROGRESS_KEY}"),
            submissions_key: format!("{prefix}{SUBMISSIONS_KEY}"),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_calendar_zone(mut self, zone: CalendarZone) -> Self {
        self.calendar_zone = zone;
        self
    }

    #[must_use]
    pub fn with_submission_cap(mut self, cap: usize) -> Self {
        self.submission_cap = cap;
        self
    }

    pub(crate) fn effective_cap(&self) -> usize {
        self.submission_cap.max(1)
    }
}
