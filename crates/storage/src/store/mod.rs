#![forbid(unsafe_code)]

mod acquisitions;
mod blocks;
mod cutting_sessions;
mod error;
mod integrity;
mod requests;
mod rois;
mod sections;
mod specimens;
mod substrates;
mod support;
mod tasks;
mod tiles;
mod timestamp;
mod types;

pub use error::StoreError;
pub use requests::*;
pub use support::{RoiParentKeys, validate_task_roi_consistency};
pub use timestamp::{format_rfc3339, now_ms, parse_rfc3339};
pub use types::*;

use rusqlite::{Connection, ErrorCode};
use std::path::{Path, PathBuf};
use std::time::Duration;
use support::*;
use temdb_core::hierarchy::EntityKind;
use temdb_core::ids::canonical_key;

const DB_FILE_NAME: &str = "temdb.db";

pub struct SqliteStore {
    conn: Connection,
    storage_dir: PathBuf,
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&storage_dir)?;

        let db_path = storage_dir.join(DB_FILE_NAME);
        let conn = Connection::open(&db_path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        install_schema(&conn)?;

        tracing::info!(path = %db_path.display(), "opened temdb store");
        Ok(Self { conn, storage_dir })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// Cheap round trip used by health checks.
    pub fn ping(&self) -> Result<(), StoreError> {
        self.conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }
}

fn map_insert_conflict(err: rusqlite::Error, entity: EntityKind, key: &str) -> StoreError {
    if is_constraint_violation(&err) {
        return StoreError::Conflict {
            entity,
            key: key.to_string(),
        };
    }
    StoreError::Sql(err)
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(code, message) => {
            code.code == ErrorCode::ConstraintViolation
                || message.as_deref().is_some_and(|value| {
                    value.contains("UNIQUE constraint failed")
                        || value.contains("PRIMARY KEY constraint failed")
                })
        }
        _ => false,
    }
}

fn to_sqlite_i64(value: usize) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|_| StoreError::InvalidInput("numeric overflow".to_string()))
}

fn canonicalize(field: &'static str, value: &str) -> Result<String, StoreError> {
    canonical_key(value)
        .map_err(|err| StoreError::InvalidInput(format!("invalid {field}: {}", err.message())))
}

fn canonicalize_opt(field: &'static str, value: Option<&str>) -> Result<Option<String>, StoreError> {
    value.map(|value| canonicalize(field, value)).transpose()
}

/// Tags a batch item's failure with its position; infrastructure errors pass through.
fn with_batch_index(err: StoreError, index: usize) -> StoreError {
    if err.is_internal() {
        return err;
    }
    StoreError::BatchItem {
        index,
        source: Box::new(err),
    }
}

/// Trims free text; blank strings become `None`.
fn clean_text(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

