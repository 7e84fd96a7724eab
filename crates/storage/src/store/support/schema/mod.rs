#![forbid(unsafe_code)]

mod sql;

use super::super::StoreError;
use rusqlite::{Connection, OptionalExtension, params};

const SCHEMA_VERSION: &str = "1";

pub(in crate::store) fn install_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(&sql::full_schema_sql())?;

    let stored = conn
        .query_row(
            "SELECT value FROM meta WHERE key = 'schema_version'",
            [],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    match stored {
        Some(version) if version == SCHEMA_VERSION => Ok(()),
        Some(_) => Err(StoreError::invalid(
            "RESET_REQUIRED: schema version mismatch",
        )),
        None => {
            conn.execute(
                "INSERT INTO meta(key, value) VALUES (?1, ?2)",
                params!["schema_version", SCHEMA_VERSION],
            )?;
            Ok(())
        }
    }
}
