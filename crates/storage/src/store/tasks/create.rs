#![forbid(unsafe_code)]

use super::super::*;
use rusqlite::params;
use std::collections::HashSet;
use temdb_core::ids::RoiId;
use temdb_core::model::{DEFAULT_TASK_TYPE, TaskStatus, normalize_tags};

impl SqliteStore {
    pub fn create_acquisition_task(
        &mut self,
        request: CreateAcquisitionTaskRequest,
    ) -> Result<AcquisitionTaskRow, StoreError> {
        let tx = self.conn.transaction()?;
        let mut cache = LookupCache::default();
        let row = insert_task(&tx, &mut cache, request)?;
        tx.commit()?;

        tracing::info!(task_id = %row.task_id, roi_id = %row.roi_id, "acquisition task created");
        Ok(row)
    }

    /// Creates every task or none of them.
    pub fn create_acquisition_tasks_batch(
        &mut self,
        requests: Vec<CreateAcquisitionTaskRequest>,
    ) -> Result<Vec<AcquisitionTaskRow>, StoreError> {
        if requests.is_empty() {
            return Err(StoreError::invalid("Acquisition task data list cannot be empty."));
        }

        let mut seen = HashSet::new();
        for (index, request) in requests.iter().enumerate() {
            let task_id = canonicalize("task_id", &request.task_id)
                .map_err(|err| with_batch_index(err, index))?;
            if !seen.insert(task_id.clone()) {
                return Err(StoreError::Conflict {
                    entity: EntityKind::AcquisitionTask,
                    key: task_id,
                });
            }
        }

        let tx = self.conn.transaction()?;
        let mut cache = LookupCache::default();
        let mut out = Vec::with_capacity(requests.len());
        for (index, request) in requests.into_iter().enumerate() {
            let row = insert_task(&tx, &mut cache, request)
                .map_err(|err| with_batch_index(err, index))?;
            out.push(row);
        }
        tx.commit()?;

        tracing::info!(count = out.len(), lookups = cache.queries(), "acquisition task batch created");
        Ok(out)
    }
}

fn insert_task(
    conn: &Connection,
    cache: &mut LookupCache,
    request: CreateAcquisitionTaskRequest,
) -> Result<AcquisitionTaskRow, StoreError> {
    let task_id = canonicalize("task_id", &request.task_id)?;
    let specimen_id = canonicalize("specimen_id", &request.specimen_id)?;
    let block_id = canonicalize("block_id", &request.block_id)?;
    let roi_id = RoiId::try_new(request.roi_id.trim())
        .map_err(|err| StoreError::invalid(format!("invalid roi_id: {}", err.message())))?;
    let task_type = clean_text(request.task_type).unwrap_or_else(|| DEFAULT_TASK_TYPE.to_string());
    let tags = normalize_tags(&request.tags)
        .map_err(|err| StoreError::invalid(format!("invalid tags: {}", err.message())))?;
    let status = request.status.unwrap_or_default();

    let specimen = cache.specimen(conn, &specimen_id)?;
    let block = cache.block(conn, &specimen.specimen_id, &block_id)?;
    let roi = cache.roi(conn, roi_id.as_str())?;
    validate_task_roi_consistency(&roi, &block, &specimen)?;

    let now = now_ms();
    let started_at = (status != TaskStatus::Planned).then_some(now);
    let completed_at = status.is_terminal().then_some(now);
    conn.execute(
        r#"
        INSERT INTO acquisition_tasks(task_id, roi_ref, roi_id, block_id, specimen_id, task_type,
                                      version, status, tags_json, metadata_json, started_at_ms,
                                      completed_at_ms, created_at_ms, updated_at_ms)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?8, ?9, ?10, ?11, ?12, ?12)
        "#,
        params![
            task_id,
            roi.id,
            roi.roi_id,
            block.block_id,
            specimen.specimen_id,
            task_type,
            status.as_str(),
            encode_list(&tags)?,
            encode_json(request.metadata.as_ref())?,
            started_at,
            completed_at,
            now
        ],
    )
    .map_err(|err| map_insert_conflict(err, EntityKind::AcquisitionTask, &task_id))?;
    require_task(conn, &task_id)
}
