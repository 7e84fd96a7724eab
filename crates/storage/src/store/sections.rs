#![forbid(unsafe_code)]

use super::*;
use rusqlite::{OptionalExtension, params};
use std::collections::HashSet;
use temdb_core::ids::{format_section_id, validate_section_number};

impl SqliteStore {
    pub fn create_section(&mut self, request: CreateSectionRequest) -> Result<SectionRow, StoreError> {
        let tx = self.conn.transaction()?;
        let mut cache = LookupCache::default();
        let row = insert_section(&tx, &mut cache, request)?;
        tx.commit()?;

        tracing::info!(
            section_id = %row.section_id,
            cutting_session_id = %row.cutting_session_id,
            "section created"
        );
        Ok(row)
    }

    /// Creates every section or none of them.
    pub fn create_sections_batch(
        &mut self,
        requests: Vec<CreateSectionRequest>,
    ) -> Result<Vec<SectionRow>, StoreError> {
        if requests.is_empty() {
            return Err(StoreError::invalid("Section data list cannot be empty."));
        }

        let mut seen_ids = HashSet::new();
        let mut seen_numbers = HashSet::new();
        for (index, request) in requests.iter().enumerate() {
            let section_id = section_key(request).map_err(|err| with_batch_index(err, index))?;
            if !seen_ids.insert(section_id.clone()) {
                return Err(StoreError::Conflict {
                    entity: EntityKind::Section,
                    key: section_id,
                });
            }
            let number = (request.cutting_session_id.trim().to_string(), request.section_number);
            if !seen_numbers.insert(number) {
                return Err(StoreError::Conflict {
                    entity: EntityKind::Section,
                    key: section_id,
                });
            }
        }

        let tx = self.conn.transaction()?;
        let mut cache = LookupCache::default();
        let mut out = Vec::with_capacity(requests.len());
        for (index, request) in requests.into_iter().enumerate() {
            let row = insert_section(&tx, &mut cache, request)
                .map_err(|err| with_batch_index(err, index))?;
            out.push(row);
        }
        tx.commit()?;

        tracing::info!(count = out.len(), lookups = cache.queries(), "section batch created");
        Ok(out)
    }

    pub fn get_section(&self, section_id: &str) -> Result<SectionRow, StoreError> {
        require_section(&self.conn, section_id.trim())
    }

    pub fn list_sections(&self, request: &ListSectionsRequest) -> Result<Vec<SectionRow>, StoreError> {
        collect_rows(
            &self.conn,
            &format!(
                r#"
                SELECT {SECTION_COLUMNS} FROM sections
                WHERE (?1 IS NULL OR cutting_session_id = ?1)
                  AND (?2 IS NULL OR media_id = ?2)
                  AND (?3 IS NULL OR specimen_id = ?3)
                ORDER BY cutting_session_id ASC, section_number ASC
                LIMIT ?4 OFFSET ?5
                "#
            ),
            params![
                request.cutting_session_id.as_deref().map(str::trim),
                request.media_id.as_deref().map(str::trim),
                request.specimen_id.as_deref().map(str::trim),
                to_sqlite_i64(request.page.limit)?,
                to_sqlite_i64(request.page.offset)?
            ],
            section_from_row,
        )
    }

    /// Every ROI in the section, top-level and nested, parents before children.
    pub fn list_section_rois(&self, section_id: &str, page: Page) -> Result<Vec<RoiRow>, StoreError> {
        let section = require_section(&self.conn, section_id.trim())?;
        collect_rows(
            &self.conn,
            &format!(
                r#"
                SELECT {ROI_COLUMNS} FROM rois
                WHERE section_ref = ?1
                ORDER BY hierarchy_level ASC, roi_id ASC
                LIMIT ?2 OFFSET ?3
                "#
            ),
            params![
                section.id,
                to_sqlite_i64(page.limit)?,
                to_sqlite_i64(page.offset)?
            ],
            roi_from_row,
        )
    }

    pub fn update_section(
        &mut self,
        section_id: &str,
        request: UpdateSectionRequest,
    ) -> Result<SectionRow, StoreError> {
        if request.thickness_um.is_some_and(|value| value <= 0.0) {
            return Err(StoreError::invalid("thickness_um must be positive"));
        }

        let tx = self.conn.transaction()?;
        let existing = require_section(&tx, section_id.trim())?;
        let quality = request.quality.or(existing.quality);
        let optical_image = request.optical_image.or(existing.optical_image.clone());
        tx.execute(
            r#"
            UPDATE sections
            SET barcode = ?2, quality = ?3, thickness_um = ?4, optical_image_json = ?5,
                updated_at_ms = ?6
            WHERE id = ?1
            "#,
            params![
                existing.id,
                clean_text(request.barcode).or(existing.barcode.clone()),
                quality.map(|quality| quality.as_str()),
                request.thickness_um.or(existing.thickness_um),
                encode_json(optical_image.as_ref())?,
                now_ms()
            ],
        )?;
        let row = require_section(&tx, &existing.section_id)?;
        tx.commit()?;
        Ok(row)
    }

    pub fn delete_section(&mut self, section_id: &str) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        let existing = require_section(&tx, section_id.trim())?;
        ensure_unreferenced(&tx, EntityKind::Section, &existing.section_id, existing.id)?;
        delete_row(&tx, EntityKind::Section, existing.id)?;
        tx.commit()?;

        tracing::info!(section_id = %existing.section_id, "section deleted");
        Ok(())
    }
}

/// The key a section request resolves to, explicit or derived.
fn section_key(request: &CreateSectionRequest) -> Result<String, StoreError> {
    validate_section_number(request.section_number).map_err(|err| {
        StoreError::invalid(format!("invalid section_number: {}", err.message()))
    })?;
    let media_id = canonicalize("media_id", &request.media_id)?;
    match request.section_id.as_deref() {
        Some(section_id) => canonicalize("section_id", section_id),
        None => Ok(format_section_id(&media_id, request.section_number)),
    }
}

fn insert_section(
    conn: &Connection,
    cache: &mut LookupCache,
    request: CreateSectionRequest,
) -> Result<SectionRow, StoreError> {
    let section_id = section_key(&request)?;
    let cutting_session_id = canonicalize("cutting_session_id", &request.cutting_session_id)?;
    let media_id = canonicalize("media_id", &request.media_id)?;
    let specimen_id = canonicalize_opt("specimen_id", request.specimen_id.as_deref())?;
    let block_id = canonicalize_opt("block_id", request.block_id.as_deref())?;
    if request.thickness_um.is_some_and(|value| value <= 0.0) {
        return Err(StoreError::invalid("thickness_um must be positive"));
    }

    let session = cache.cutting_session(conn, &cutting_session_id)?;
    let substrate = cache.substrate(conn, &media_id)?;
    check_section_lineage(&session, specimen_id.as_deref(), block_id.as_deref())?;

    let taken = conn
        .query_row(
            "SELECT section_id FROM sections WHERE cutting_session_ref = ?1 AND section_number = ?2",
            params![session.id, request.section_number],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    if let Some(existing) = taken {
        return Err(StoreError::Conflict {
            entity: EntityKind::Section,
            key: existing,
        });
    }

    let now = now_ms();
    conn.execute(
        r#"
        INSERT INTO sections(section_id, section_number, cutting_session_ref, substrate_ref,
                             cutting_session_id, block_id, specimen_id, media_id, barcode,
                             quality, thickness_um, optical_image_json, cut_at_ms,
                             created_at_ms, updated_at_ms)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14)
        "#,
        params![
            section_id,
            request.section_number,
            session.id,
            substrate.id,
            session.cutting_session_id,
            session.block_id,
            session.specimen_id,
            substrate.media_id,
            clean_text(request.barcode),
            request.quality.map(|quality| quality.as_str()),
            request.thickness_um,
            encode_json(request.optical_image.as_ref())?,
            request.cut_at.unwrap_or(now),
            now
        ],
    )
    .map_err(|err| map_insert_conflict(err, EntityKind::Section, &section_id))?;
    require_section(conn, &section_id)
}
