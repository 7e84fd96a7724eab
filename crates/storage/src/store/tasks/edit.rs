#![forbid(unsafe_code)]

use super::super::*;
use rusqlite::params;
use temdb_core::model::{TaskStatus, normalize_tags};

impl SqliteStore {
    /// Applies the given fields and bumps `version`, keeping the prior state
    /// as a snapshot. The version is advisory; concurrent updates are not rejected.
    pub fn update_acquisition_task(
        &mut self,
        task_id: &str,
        request: UpdateAcquisitionTaskRequest,
    ) -> Result<AcquisitionTaskRow, StoreError> {
        let tags = request
            .tags
            .as_deref()
            .map(normalize_tags)
            .transpose()
            .map_err(|err| StoreError::invalid(format!("invalid tags: {}", err.message())))?;

        let tx = self.conn.transaction()?;
        let existing = require_task(&tx, task_id.trim())?;
        let now = now_ms();
        tx.execute(
            r#"
            INSERT INTO acquisition_task_versions(task_ref, version, snapshot_json, recorded_at_ms)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                existing.id,
                existing.version,
                serde_json::to_string(&existing)?,
                now
            ],
        )?;

        let status = request.status.unwrap_or(existing.status);
        let (started_at, completed_at) = status_stamps(&existing, status, now);
        let task_type = clean_text(request.task_type).unwrap_or_else(|| existing.task_type.clone());
        let tags = tags.unwrap_or_else(|| existing.tags.clone());
        let metadata = request.metadata.or(existing.metadata.clone());
        let error_message = clean_text(request.error_message).or(existing.error_message.clone());
        tx.execute(
            r#"
            UPDATE acquisition_tasks
            SET task_type = ?2, status = ?3, tags_json = ?4, metadata_json = ?5,
                error_message = ?6, started_at_ms = ?7, completed_at_ms = ?8,
                version = version + 1, updated_at_ms = ?9
            WHERE id = ?1
            "#,
            params![
                existing.id,
                task_type,
                status.as_str(),
                encode_list(&tags)?,
                encode_json(metadata.as_ref())?,
                error_message,
                started_at,
                completed_at,
                now
            ],
        )?;
        let row = require_task(&tx, &existing.task_id)?;
        tx.commit()?;

        tracing::info!(
            task_id = %row.task_id,
            version = row.version,
            status = row.status.as_str(),
            "acquisition task updated"
        );
        Ok(row)
    }

    pub fn update_acquisition_task_status(
        &mut self,
        task_id: &str,
        request: UpdateTaskStatusRequest,
    ) -> Result<AcquisitionTaskRow, StoreError> {
        self.update_acquisition_task(
            task_id,
            UpdateAcquisitionTaskRequest {
                status: Some(request.status),
                error_message: request.error_message,
                ..UpdateAcquisitionTaskRequest::default()
            },
        )
    }

    pub fn delete_acquisition_task(&mut self, task_id: &str) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        let existing = require_task(&tx, task_id.trim())?;
        ensure_unreferenced(&tx, EntityKind::AcquisitionTask, &existing.task_id, existing.id)?;
        delete_row(&tx, EntityKind::AcquisitionTask, existing.id)?;
        tx.commit()?;

        tracing::info!(task_id = %existing.task_id, "acquisition task deleted");
        Ok(())
    }
}

/// `started_at` is stamped on leaving Planned and `completed_at` on reaching a
/// terminal status; returning to Planned clears both.
fn status_stamps(
    existing: &AcquisitionTaskRow,
    status: TaskStatus,
    now: i64,
) -> (Option<i64>, Option<i64>) {
    if status == TaskStatus::Planned {
        return (None, None);
    }
    let started_at = existing.started_at.or(Some(now));
    let completed_at = if status.is_terminal() {
        existing.completed_at.or(Some(now))
    } else {
        None
    };
    (started_at, completed_at)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(status: TaskStatus, started_at: Option<i64>, completed_at: Option<i64>) -> AcquisitionTaskRow {
        AcquisitionTaskRow {
            id: 1,
            roi_ref: 1,
            task_id: "T1".to_string(),
            specimen_id: "S".to_string(),
            block_id: "B".to_string(),
            roi_id: "S.B.C.M.ROI001".to_string(),
            task_type: "standard_acquisition".to_string(),
            version: 1,
            status,
            tags: Vec::new(),
            metadata: None,
            error_message: None,
            started_at,
            completed_at,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn stamps_follow_the_status() {
        let planned = task(TaskStatus::Planned, None, None);
        assert_eq!(status_stamps(&planned, TaskStatus::InProgress, 10), (Some(10), None));

        let running = task(TaskStatus::InProgress, Some(10), None);
        assert_eq!(status_stamps(&running, TaskStatus::Completed, 20), (Some(10), Some(20)));
        assert_eq!(status_stamps(&running, TaskStatus::Planned, 20), (None, None));

        let done = task(TaskStatus::Completed, Some(10), Some(20));
        assert_eq!(status_stamps(&done, TaskStatus::Failed, 30), (Some(10), Some(20)));
        assert_eq!(status_stamps(&done, TaskStatus::InProgress, 30), (Some(10), None));
    }
}
