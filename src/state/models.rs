// Data models for practice history
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Format of a day key, e.g. "2025-11-28"
pub const DATE_ID_FORMAT: &str = "%Y-%m-%d";

/// One timed chord change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordTransition {
    pub chord: String,

    /// Seconds the change took
    pub time: f64,
}

/// All chord changes practised on one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyProgress {
    pub date_id: String,
    pub transitions: Vec<ChordTransition>,
}

/// A scored strum kept for later review
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub id: Uuid,
    pub pattern_id: String,
    pub created_at: DateTime<Utc>,
    pub success: bool,
    pub timing_ms: f64,
    pub confidence: f64,

    /// The full attempt as JSON
    pub attempt_json: String,
}

/// Success counts for one pattern
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttemptStats {
    pub total: u32,
    pub successful: u32,

    /// Mean absolute timing offset in ms, 0 with no attempts
    pub mean_abs_timing_ms: f64,
}

impl AttemptStats {
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.successful as f64 / self.total as f64
        }
    }
}

/// Day key for a calendar date
pub fn date_id(date: NaiveDate) -> String {
    date.format(DATE_ID_FORMAT).to_string()
}

/// Day key for today in local time
pub fn today_date_id() -> String {
    date_id(Local::now().date_naive())
}
