#![forbid(unsafe_code)]

use super::super::*;
use rusqlite::{OptionalExtension, params};

impl SqliteStore {
    /// The current task, or a superseded state when `version` names an older one.
    pub fn get_acquisition_task(
        &self,
        task_id: &str,
        version: Option<i64>,
    ) -> Result<AcquisitionTaskRow, StoreError> {
        let current = require_task(&self.conn, task_id.trim())?;
        let Some(version) = version else {
            return Ok(current);
        };
        if version == current.version {
            return Ok(current);
        }

        let snapshot = self
            .conn
            .query_row(
                "SELECT snapshot_json FROM acquisition_task_versions WHERE task_ref = ?1 AND version = ?2",
                params![current.id, version],
                |row| row.get::<_, String>(0),
            )
            .optional()?
            .ok_or_else(|| {
                StoreError::not_found(
                    EntityKind::AcquisitionTask,
                    format!("{} version {version}", current.task_id),
                )
            })?;
        restore_snapshot(&current, &snapshot)
    }

    /// Superseded states of a task, oldest first. The current state is not included.
    pub fn list_acquisition_task_versions(
        &self,
        task_id: &str,
    ) -> Result<Vec<TaskVersionRow>, StoreError> {
        let current = require_task(&self.conn, task_id.trim())?;
        let raw = collect_rows(
            &self.conn,
            r#"
            SELECT version, recorded_at_ms, snapshot_json FROM acquisition_task_versions
            WHERE task_ref = ?1
            ORDER BY version ASC
            "#,
            params![current.id],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )?;
        raw.into_iter()
            .map(|(version, recorded_at, snapshot)| {
                Ok(TaskVersionRow {
                    task_id: current.task_id.clone(),
                    version,
                    recorded_at,
                    snapshot: restore_snapshot(&current, &snapshot)?,
                })
            })
            .collect()
    }

    pub fn list_acquisition_tasks(
        &self,
        request: &ListAcquisitionTasksRequest,
    ) -> Result<Vec<AcquisitionTaskRow>, StoreError> {
        collect_rows(
            &self.conn,
            &format!(
                r#"
                SELECT {TASK_COLUMNS} FROM acquisition_tasks
                WHERE (?1 IS NULL OR specimen_id = ?1)
                  AND (?2 IS NULL OR block_id = ?2)
                  AND (?3 IS NULL OR roi_id = ?3)
                  AND (?4 IS NULL OR status = ?4)
                  AND (?5 IS NULL OR task_type = ?5)
                ORDER BY created_at_ms ASC, task_id ASC
                LIMIT ?6 OFFSET ?7
                "#
            ),
            params![
                request.specimen_id.as_deref().map(str::trim),
                request.block_id.as_deref().map(str::trim),
                request.roi_id.as_deref().map(str::trim),
                request.status.map(|status| status.as_str()),
                request.task_type.as_deref().map(str::trim),
                to_sqlite_i64(request.page.limit)?,
                to_sqlite_i64(request.page.offset)?
            ],
            task_from_row,
        )
    }
}

/// Snapshots do not carry internal ids; they are taken from the live row.
fn restore_snapshot(
    current: &AcquisitionTaskRow,
    snapshot: &str,
) -> Result<AcquisitionTaskRow, StoreError> {
    let mut row: AcquisitionTaskRow = serde_json::from_str(snapshot)?;
    row.id = current.id;
    row.roi_ref = current.roi_ref;
    Ok(row)
}
