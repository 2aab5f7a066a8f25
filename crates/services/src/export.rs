//! Downloadable snapshots of local progress (JSON and CSV).

use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};

use progress_core::model::{ProgressRecord, Submission};

use crate::progress_service::ProgressStore;

const CSV_HEADER: [&str; 5] = ["Date", "Quiz", "Score", "Status", "Time Spent"];

/// Snapshot written by the JSON export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressExport {
    pub progress: ProgressRecord,
    pub recent_activity: Vec<Submission>,
    pub export_date: DateTime<Utc>,
}

impl ProgressStore {
    #[must_use]
    pub fn export_snapshot(&self) -> ProgressExport {
        ProgressExport {
            progress: self.get_progress(),
            recent_activity: self.get_recent_submissions(self.config().export_recent),
            export_date: self.clock().now(),
        }
    }

    /// Pretty-printed JSON snapshot; `None` (and logged) if it cannot be encoded.
    #[must_use]
    pub fn export_json(&self) -> Option<String> {
        serde_json::to_string_pretty(&self.export_snapshot())
            .map_err(|err| error!("Error encoding progress export: {err}"))
            .ok()
    }

    /// All stored submissions as CSV, newest first.
    #[must_use]
    pub fn export_csv(&self) -> String {
        let zone = self.config().calendar_zone;
        let mut out = csv_row(CSV_HEADER.iter().map(|h| (*h).to_owned()));
        for submission in self.get_submissions() {
            let status = if submission.is_correct { "passed" } else { "failed" };
            out.push_str(&csv_row([
                zone.date_of(submission.timestamp).format("%Y-%m-%d").to_string(),
                submission.quiz_title.clone(),
                format!("{}%", submission.score),
                status.to_owned(),
                format_minutes(minutes_from_seconds(submission.time_spent)),
            ]));
        }
        out
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn minutes_from_seconds(seconds: f64) -> u64 {
    (seconds / 60.0).round().max(0.0) as u64
}

/// `"1h 5m"` for 65 minutes, `"45m"` below an hour.
#[must_use]
pub fn format_minutes(minutes: u64) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours > 0 {
        format!("{hours}h {mins}m")
    } else {
        format!("{mins}m")
    }
}

fn csv_row(fields: impl IntoIterator<Item = String>) -> String {
    let mut row = fields
        .into_iter()
        .map(|field| csv_field(&field))
        .collect::<Vec<_>>()
        .join(",");
    row.push('\n');
    row
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_owned()
    }
}
