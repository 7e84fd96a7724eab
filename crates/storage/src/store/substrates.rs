#![forbid(unsafe_code)]

use super::*;
use rusqlite::params;
use temdb_core::model::DEFAULT_SUBSTRATE_STATUS;

impl SqliteStore {
    pub fn create_substrate(
        &mut self,
        request: CreateSubstrateRequest,
    ) -> Result<SubstrateRow, StoreError> {
        let media_id = canonicalize("media_id", &request.media_id)?;
        let media_type = required_text("media_type", request.media_type)?;
        let status = clean_text(request.status).unwrap_or_else(|| DEFAULT_SUBSTRATE_STATUS.to_string());
        let now = now_ms();

        let tx = self.conn.transaction()?;
        tx.execute(
            r#"
            INSERT INTO substrates(media_id, media_type, uid, status, metadata_json,
                                   created_at_ms, updated_at_ms)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            "#,
            params![
                media_id,
                media_type,
                clean_text(request.uid),
                status,
                encode_json(request.metadata.as_ref())?,
                now
            ],
        )
        .map_err(|err| map_insert_conflict(err, EntityKind::Substrate, &media_id))?;
        let row = require_substrate(&tx, &media_id)?;
        tx.commit()?;

        tracing::info!(media_id = %row.media_id, media_type = %row.media_type, "substrate created");
        Ok(row)
    }

    pub fn get_substrate(&self, media_id: &str) -> Result<SubstrateRow, StoreError> {
        require_substrate(&self.conn, media_id.trim())
    }

    pub fn list_substrates(
        &self,
        request: &ListSubstratesRequest,
    ) -> Result<Vec<SubstrateRow>, StoreError> {
        collect_rows(
            &self.conn,
            &format!(
                r#"
                SELECT {SUBSTRATE_COLUMNS} FROM substrates
                WHERE (?1 IS NULL OR media_type = ?1)
                  AND (?2 IS NULL OR status = ?2)
                ORDER BY media_id ASC
                LIMIT ?3 OFFSET ?4
                "#
            ),
            params![
                request.media_type.as_deref().map(str::trim),
                request.status.as_deref().map(str::trim),
                to_sqlite_i64(request.page.limit)?,
                to_sqlite_i64(request.page.offset)?
            ],
            substrate_from_row,
        )
    }

    pub fn update_substrate(
        &mut self,
        media_id: &str,
        request: UpdateSubstrateRequest,
    ) -> Result<SubstrateRow, StoreError> {
        let tx = self.conn.transaction()?;
        let existing = require_substrate(&tx, media_id.trim())?;
        let media_type = match request.media_type {
            Some(media_type) => required_text("media_type", media_type)?,
            None => existing.media_type.clone(),
        };
        let status = match request.status {
            Some(status) => required_text("status", status)?,
            None => existing.status.clone(),
        };
        let metadata = request.metadata.or(existing.metadata.clone());
        tx.execute(
            r#"
            UPDATE substrates
            SET media_type = ?2, uid = ?3, status = ?4, metadata_json = ?5, updated_at_ms = ?6
            WHERE id = ?1
            "#,
            params![
                existing.id,
                media_type,
                clean_text(request.uid).or(existing.uid.clone()),
                status,
                encode_json(metadata.as_ref())?,
                now_ms()
            ],
        )?;
        let row = require_substrate(&tx, &existing.media_id)?;
        tx.commit()?;
        Ok(row)
    }

    pub fn delete_substrate(&mut self, media_id: &str) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        let existing = require_substrate(&tx, media_id.trim())?;
        ensure_unreferenced(&tx, EntityKind::Substrate, &existing.media_id, existing.id)?;
        delete_row(&tx, EntityKind::Substrate, existing.id)?;
        tx.commit()?;

        tracing::info!(media_id = %existing.media_id, "substrate deleted");
        Ok(())
    }
}

fn required_text(field: &str, value: String) -> Result<String, StoreError> {
    clean_text(Some(value)).ok_or_else(|| StoreError::invalid(format!("{field} must not be empty")))
}
