// Database CRUD operations
use chrono::{DateTime, Utc};
use rusqlite::params;
use uuid::Uuid;

use super::db::{DbConnection, DbError, DbResult};
use super::models::{AttemptRecord, AttemptStats, ChordTransition, DailyProgress};
use crate::strum::StrumAttempt;

// ==================== CHORD TRANSITION QUERIES ====================

/// Append a chord change to the given day
pub fn add_chord_transition(
    db: &DbConnection,
    date_id: &str,
    chord: &str,
    time_secs: f64,
) -> DbResult<()> {
    let conn = db.lock();
    conn.execute(
        "INSERT INTO chord_transitions (date_id, chord, time_secs) VALUES (?1, ?2, ?3)",
        params![date_id, chord, time_secs],
    )?;
    Ok(())
}

/// Group rows of (date_id, chord, time) into days, keeping insertion order
fn group_by_day(rows: Vec<(String, String, f64)>) -> Vec<DailyProgress> {
    let mut days: Vec<DailyProgress> = Vec::new();

    for (date_id, chord, time) in rows {
        let transition = ChordTransition { chord, time };
        match days.last_mut() {
            Some(day) if day.date_id == date_id => day.transitions.push(transition),
            _ => days.push(DailyProgress {
                date_id,
                transitions: vec![transition],
            }),
        }
    }

    days
}

/// Progress for every day between `start` and `end` (inclusive)
pub fn get_progress_range(db: &DbConnection, start: &str, end: &str) -> DbResult<Vec<DailyProgress>> {
    let conn = db.lock();
    let mut stmt = conn.prepare(
        "SELECT date_id, chord, time_secs FROM chord_transitions
         WHERE date_id BETWEEN ?1 AND ?2
         ORDER BY date_id ASC, id ASC",
    )?;

    let rows: Vec<(String, String, f64)> = stmt
        .query_map(params![start, end], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(group_by_day(rows))
}

/// Progress for every recorded day
pub fn get_all_progress(db: &DbConnection) -> DbResult<Vec<DailyProgress>> {
    let conn = db.lock();
    let mut stmt = conn.prepare(
        "SELECT date_id, chord, time_secs FROM chord_transitions ORDER BY date_id ASC, id ASC",
    )?;

    let rows: Vec<(String, String, f64)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(group_by_day(rows))
}

// ==================== STRUM ATTEMPT QUERIES ====================

/// Store a scored strum
pub fn create_attempt(
    db: &DbConnection,
    pattern_id: &str,
    attempt: &StrumAttempt,
) -> DbResult<AttemptRecord> {
    let record = AttemptRecord {
        id: attempt.id,
        pattern_id: pattern_id.to_string(),
        created_at: Utc::now(),
        success: attempt.success,
        timing_ms: attempt.timing,
        confidence: attempt.confidence,
        attempt_json: serde_json::to_string(attempt)?,
    };

    let conn = db.lock();
    conn.execute(
        "INSERT INTO strum_attempts (id, pattern_id, created_at, success, timing_ms, confidence, attempt_json)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            record.id.to_string(),
            record.pattern_id,
            record.created_at.to_rfc3339(),
            record.success,
            record.timing_ms,
            record.confidence,
            record.attempt_json,
        ],
    )?;

    Ok(record)
}

/// List attempts for a pattern, newest first
pub fn list_attempts_for_pattern(db: &DbConnection, pattern_id: &str) -> DbResult<Vec<AttemptRecord>> {
    let conn = db.lock();
    let mut stmt = conn.prepare(
        "SELECT id, pattern_id, created_at, success, timing_ms, confidence, attempt_json
         FROM strum_attempts WHERE pattern_id = ?1
         ORDER BY created_at DESC",
    )?;

    let rows = stmt
        .query_map([pattern_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, bool>(3)?,
                row.get::<_, f64>(4)?,
                row.get::<_, f64>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(id, pattern_id, created_at, success, timing_ms, confidence, attempt_json)| -> DbResult<AttemptRecord> {
            let id = Uuid::parse_str(&id)
                .map_err(|e| DbError::CorruptRecord(format!("attempt id {}: {}", id, e)))?;
            let created_at = DateTime::parse_from_rfc3339(&created_at)
                .map_err(|e| DbError::CorruptRecord(format!("created_at {}: {}", created_at, e)))?
                .with_timezone(&Utc);

            Ok(AttemptRecord {
                id,
                pattern_id,
                created_at,
                success,
                timing_ms,
                confidence,
                attempt_json,
            })
        })
        .collect()
}

/// Get the full attempt stored in a record
pub fn load_attempt(record: &AttemptRecord) -> DbResult<StrumAttempt> {
    Ok(serde_json::from_str(&record.attempt_json)?)
}

/// Aggregate success and timing for a pattern
pub fn get_attempt_stats(db: &DbConnection, pattern_id: &str) -> DbResult<AttemptStats> {
    let conn = db.lock();
    let (total, successful, mean_abs_timing_ms) = conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(success), 0), COALESCE(AVG(ABS(timing_ms)), 0.0)
         FROM strum_attempts WHERE pattern_id = ?1",
        [pattern_id],
        |row| Ok((row.get::<_, u32>(0)?, row.get::<_, u32>(1)?, row.get::<_, f64>(2)?)),
    )?;

    Ok(AttemptStats {
        total,
        successful,
        mean_abs_timing_ms,
    })
}
