// State management module
// Handles SQLite persistence of practice history

pub mod db;
pub mod models;
pub mod queries;
pub mod storage;
pub mod store;

pub use db::{init_db, open_db, open_in_memory, DbConnection, DbError, DbResult};
pub use models::{
    date_id, today_date_id, AttemptRecord, AttemptStats, ChordTransition, DailyProgress,
};
pub use store::{ProgressStore, SqliteProgressStore};
