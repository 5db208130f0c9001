// Progress store
// Persistence boundary for practice history

use super::db::{DbConnection, DbResult};
use super::models::{today_date_id, AttemptRecord, AttemptStats, DailyProgress};
use super::queries;
use crate::strum::StrumAttempt;

/// Where practice history is kept
pub trait ProgressStore {
    /// Record a chord change for today
    fn add_chord_transition(&self, chord: &str, time_secs: f64) -> DbResult<()>;

    /// Days between two "YYYY-MM-DD" keys, inclusive
    fn progress_range(&self, start: &str, end: &str) -> DbResult<Vec<DailyProgress>>;

    fn all_progress(&self) -> DbResult<Vec<DailyProgress>>;

    fn record_attempt(&self, pattern_id: &str, attempt: &StrumAttempt) -> DbResult<AttemptRecord>;

    fn attempt_stats(&self, pattern_id: &str) -> DbResult<AttemptStats>;
}

/// SQLite-backed progress store
#[derive(Clone)]
pub struct SqliteProgressStore {
    db: DbConnection,
}

impl SqliteProgressStore {
    pub fn new(db: DbConnection) -> Self {
        SqliteProgressStore { db }
    }

    pub fn db(&self) -> &DbConnection {
        &self.db
    }
}

impl ProgressStore for SqliteProgressStore {
    fn add_chord_transition(&self, chord: &str, time_secs: f64) -> DbResult<()> {
        queries::add_chord_transition(&self.db, &today_date_id(), chord, time_secs)
    }

    fn progress_range(&self, start: &str, end: &str) -> DbResult<Vec<DailyProgress>> {
        queries::get_progress_range(&self.db, start, end)
    }

    fn all_progress(&self) -> DbResult<Vec<DailyProgress>> {
        queries::get_all_progress(&self.db)
    }

    fn record_attempt(&self, pattern_id: &str, attempt: &StrumAttempt) -> DbResult<AttemptRecord> {
        queries::create_attempt(&self.db, pattern_id, attempt)
    }

    fn attempt_stats(&self, pattern_id: &str) -> DbResult<AttemptStats> {
        queries::get_attempt_stats(&self.db, pattern_id)
    }
}
