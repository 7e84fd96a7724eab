#![forbid(unsafe_code)]

use super::*;
use rusqlite::params;

impl SqliteStore {
    pub fn create_cutting_session(
        &mut self,
        request: CreateCuttingSessionRequest,
    ) -> Result<CuttingSessionRow, StoreError> {
        let cutting_session_id = canonicalize("cutting_session_id", &request.cutting_session_id)?;
        let specimen_id = canonicalize("specimen_id", &request.specimen_id)?;
        let block_id = canonicalize("block_id", &request.block_id)?;
        let now = now_ms();
        let start_time = request.start_time.unwrap_or(now);
        if request.end_time.is_some_and(|end_time| end_time < start_time) {
            return Err(StoreError::invalid("end_time must not precede start_time"));
        }

        let tx = self.conn.transaction()?;
        let block = require_block(&tx, &specimen_id, &block_id)?;
        tx.execute(
            r#"
            INSERT INTO cutting_sessions(cutting_session_id, block_ref, block_id, specimen_id,
                                         start_time_ms, end_time_ms, operator, sectioning_device,
                                         media_type, knife_id, created_at_ms, updated_at_ms)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)
            "#,
            params![
                cutting_session_id,
                block.id,
                block.block_id,
                block.specimen_id,
                start_time,
                request.end_time,
                clean_text(request.operator),
                clean_text(request.sectioning_device),
                request.media_type.as_str(),
                clean_text(request.knife_id),
                now
            ],
        )
        .map_err(|err| map_insert_conflict(err, EntityKind::CuttingSession, &cutting_session_id))?;
        let row = require_cutting_session(&tx, &cutting_session_id)?;
        tx.commit()?;

        tracing::info!(
            cutting_session_id = %row.cutting_session_id,
            block_id = %row.block_id,
            "cutting session created"
        );
        Ok(row)
    }

    pub fn get_cutting_session(
        &self,
        cutting_session_id: &str,
    ) -> Result<CuttingSessionRow, StoreError> {
        require_cutting_session(&self.conn, cutting_session_id.trim())
    }

    pub fn list_cutting_sessions(
        &self,
        request: &ListCuttingSessionsRequest,
    ) -> Result<Vec<CuttingSessionRow>, StoreError> {
        collect_rows(
            &self.conn,
            &format!(
                r#"
                SELECT {CUTTING_SESSION_COLUMNS} FROM cutting_sessions
                WHERE (?1 IS NULL OR specimen_id = ?1)
                  AND (?2 IS NULL OR block_id = ?2)
                ORDER BY start_time_ms DESC, cutting_session_id ASC
                LIMIT ?3 OFFSET ?4
                "#
            ),
            params![
                request.specimen_id.as_deref().map(str::trim),
                request.block_id.as_deref().map(str::trim),
                to_sqlite_i64(request.page.limit)?,
                to_sqlite_i64(request.page.offset)?
            ],
            cutting_session_from_row,
        )
    }

    pub fn update_cutting_session(
        &mut self,
        cutting_session_id: &str,
        request: UpdateCuttingSessionRequest,
    ) -> Result<CuttingSessionRow, StoreError> {
        let tx = self.conn.transaction()?;
        let existing = require_cutting_session(&tx, cutting_session_id.trim())?;
        let end_time = request.end_time.or(existing.end_time);
        if end_time.is_some_and(|end_time| end_time < existing.start_time) {
            return Err(StoreError::invalid("end_time must not precede start_time"));
        }
        let media_type = request.media_type.unwrap_or(existing.media_type);
        tx.execute(
            r#"
            UPDATE cutting_sessions
            SET end_time_ms = ?2, operator = ?3, sectioning_device = ?4, media_type = ?5,
                knife_id = ?6, updated_at_ms = ?7
            WHERE id = ?1
            "#,
            params![
                existing.id,
                end_time,
                clean_text(request.operator).or(existing.operator.clone()),
                clean_text(request.sectioning_device).or(existing.sectioning_device.clone()),
                media_type.as_str(),
                clean_text(request.knife_id).or(existing.knife_id.clone()),
                now_ms()
            ],
        )?;
        let row = require_cutting_session(&tx, &existing.cutting_session_id)?;
        tx.commit()?;
        Ok(row)
    }

    pub fn delete_cutting_session(&mut self, cutting_session_id: &str) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        let existing = require_cutting_session(&tx, cutting_session_id.trim())?;
        ensure_unreferenced(
            &tx,
            EntityKind::CuttingSession,
            &existing.cutting_session_id,
            existing.id,
        )?;
        delete_row(&tx, EntityKind::CuttingSession, existing.id)?;
        tx.commit()?;

        tracing::info!(cutting_session_id = %existing.cutting_session_id, "cutting session deleted");
        Ok(())
    }
}
