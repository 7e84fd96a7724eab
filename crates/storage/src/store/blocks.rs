#![forbid(unsafe_code)]

use super::*;
use rusqlite::params;

impl SqliteStore {
    pub fn create_block(&mut self, request: CreateBlockRequest) -> Result<BlockRow, StoreError> {
        let specimen_id = canonicalize("specimen_id", &request.specimen_id)?;
        let block_id = canonicalize("block_id", &request.block_id)?;
        let now = now_ms();

        let tx = self.conn.transaction()?;
        let specimen = require_specimen(&tx, &specimen_id)?;
        tx.execute(
            r#"
            INSERT INTO blocks(block_id, specimen_ref, specimen_id, description, microct_info_json,
                               created_at_ms, updated_at_ms)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            "#,
            params![
                block_id,
                specimen.id,
                specimen.specimen_id,
                clean_text(request.description),
                encode_json(request.microct_info.as_ref())?,
                now
            ],
        )
        .map_err(|err| map_insert_conflict(err, EntityKind::Block, &block_id))?;
        let row = require_block(&tx, &specimen.specimen_id, &block_id)?;
        tx.commit()?;

        tracing::info!(specimen_id = %row.specimen_id, block_id = %row.block_id, "block created");
        Ok(row)
    }

    pub fn get_block(&self, specimen_id: &str, block_id: &str) -> Result<BlockRow, StoreError> {
        require_block(&self.conn, specimen_id.trim(), block_id.trim())
    }

    pub fn list_blocks(&self, request: &ListBlocksRequest) -> Result<Vec<BlockRow>, StoreError> {
        collect_rows(
            &self.conn,
            &format!(
                r#"
                SELECT {BLOCK_COLUMNS} FROM blocks
                WHERE (?1 IS NULL OR specimen_id = ?1)
                ORDER BY specimen_id ASC, block_id ASC
                LIMIT ?2 OFFSET ?3
                "#
            ),
            params![
                request.specimen_id.as_deref().map(str::trim),
                to_sqlite_i64(request.page.limit)?,
                to_sqlite_i64(request.page.offset)?
            ],
            block_from_row,
        )
    }

    pub fn update_block(
        &mut self,
        specimen_id: &str,
        block_id: &str,
        request: UpdateBlockRequest,
    ) -> Result<BlockRow, StoreError> {
        let tx = self.conn.transaction()?;
        let existing = require_block(&tx, specimen_id.trim(), block_id.trim())?;
        let description = match request.description {
            Some(description) => clean_text(Some(description)),
            None => existing.description.clone(),
        };
        let microct_info = request.microct_info.or(existing.microct_info.clone());
        tx.execute(
            "UPDATE blocks SET description = ?2, microct_info_json = ?3, updated_at_ms = ?4 WHERE id = ?1",
            params![
                existing.id,
                description,
                encode_json(microct_info.as_ref())?,
                now_ms()
            ],
        )?;
        let row = require_block(&tx, &existing.specimen_id, &existing.block_id)?;
        tx.commit()?;
        Ok(row)
    }

    pub fn delete_block(&mut self, specimen_id: &str, block_id: &str) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        let existing = require_block(&tx, specimen_id.trim(), block_id.trim())?;
        ensure_unreferenced(&tx, EntityKind::Block, &existing.block_id, existing.id)?;
        delete_row(&tx, EntityKind::Block, existing.id)?;
        tx.commit()?;

        tracing::info!(specimen_id = %existing.specimen_id, block_id = %existing.block_id, "block deleted");
        Ok(())
    }
}
