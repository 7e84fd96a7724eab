#![forbid(unsafe_code)]

//! Lens-correction acquisitions calibrate a scope at a magnification; regular
//! acquisitions point at the one they were corrected with.

use super::super::*;
use rusqlite::{OptionalExtension, params};

/// Resolves `lens_correction_acquisition_id` for an acquisition whose own
/// `lens_correction` flag is `is_lens_correction`.
pub(super) fn resolve_lens_reference(
    conn: &Connection,
    is_lens_correction: bool,
    reference: Option<&str>,
) -> Result<Option<AcquisitionRow>, StoreError> {
    let Some(reference) = reference.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    if is_lens_correction {
        return Err(StoreError::InvalidReference(
            "lens correction acquisitions cannot reference another lens correction".to_string(),
        ));
    }
    let Some(target) = acquisition_by_key(conn, reference)? else {
        return Err(StoreError::InvalidReference(format!(
            "lens correction acquisition '{reference}' not found"
        )));
    };
    if !target.lens_correction {
        return Err(StoreError::InvalidReference(format!(
            "acquisition '{reference}' is not a lens correction acquisition"
        )));
    }
    Ok(Some(target))
}

impl SqliteStore {
    /// Newest lens correction for a scope at one magnification.
    pub fn current_lens_correction(
        &self,
        scope_id: &str,
        magnification: u32,
    ) -> Result<AcquisitionRow, StoreError> {
        let scope_id = scope_id.trim();
        self.conn
            .query_row(
                &format!(
                    r#"
                    SELECT {ACQUISITION_COLUMNS} FROM acquisitions
                    WHERE lens_correction = 1 AND scope_id = ?1 AND magnification = ?2
                    ORDER BY start_time_ms DESC, id DESC
                    LIMIT 1
                    "#
                ),
                params![scope_id, magnification],
                acquisition_from_row,
            )
            .optional()?
            .ok_or_else(|| {
                StoreError::LensCorrectionNotFound(format!(
                    "No lens correction found for scope_id={scope_id}, magnification={magnification}"
                ))
            })
    }

    /// Newest lens correction for a scope at any magnification.
    pub fn latest_lens_correction(&self, scope_id: &str) -> Result<AcquisitionRow, StoreError> {
        let scope_id = scope_id.trim();
        self.conn
            .query_row(
                &format!(
                    r#"
                    SELECT {ACQUISITION_COLUMNS} FROM acquisitions
                    WHERE lens_correction = 1 AND scope_id = ?1
                    ORDER BY start_time_ms DESC, id DESC
                    LIMIT 1
                    "#
                ),
                params![scope_id],
                acquisition_from_row,
            )
            .optional()?
            .ok_or_else(|| {
                StoreError::LensCorrectionNotFound(format!(
                    "No lens correction found for scope_id={scope_id}"
                ))
            })
    }

    pub fn list_lens_corrections(
        &self,
        request: &ListLensCorrectionsRequest,
    ) -> Result<AcquisitionPage, StoreError> {
        let filter = r#"
            WHERE lens_correction = 1
              AND (?1 IS NULL OR scope_id = ?1)
              AND (?2 IS NULL OR magnification = ?2)
              AND (?3 IS NULL OR start_time_ms >= ?3)
              AND (?4 IS NULL OR start_time_ms <= ?4)
        "#;
        let scope_id = request.scope_id.as_deref().map(str::trim);
        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(1) FROM acquisitions {filter}"),
            params![scope_id, request.magnification, request.from_time, request.to_time],
            |row| row.get(0),
        )?;
        let acquisitions = collect_rows(
            &self.conn,
            &format!(
                "SELECT {ACQUISITION_COLUMNS} FROM acquisitions {filter}
                 ORDER BY start_time_ms DESC, id DESC LIMIT ?5 OFFSET ?6"
            ),
            params![
                scope_id,
                request.magnification,
                request.from_time,
                request.to_time,
                to_sqlite_i64(request.page.limit)?,
                to_sqlite_i64(request.page.offset)?
            ],
            acquisition_from_row,
        )?;
        Ok(AcquisitionPage {
            acquisitions,
            total: u64::try_from(total).unwrap_or(0),
        })
    }

    /// Regular acquisitions that do not reference any lens correction.
    pub fn orphan_acquisitions(
        &self,
        scope_id: Option<&str>,
        page: Page,
    ) -> Result<AcquisitionPage, StoreError> {
        let filter = r#"
            WHERE lens_correction = 0
              AND lens_correction_ref IS NULL
              AND (?1 IS NULL OR scope_id = ?1)
        "#;
        let scope_id = scope_id.map(str::trim);
        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(1) FROM acquisitions {filter}"),
            params![scope_id],
            |row| row.get(0),
        )?;
        let acquisitions = collect_rows(
            &self.conn,
            &format!(
                "SELECT {ACQUISITION_COLUMNS} FROM acquisitions {filter}
                 ORDER BY start_time_ms DESC, id DESC LIMIT ?2 OFFSET ?3"
            ),
            params![
                scope_id,
                to_sqlite_i64(page.limit)?,
                to_sqlite_i64(page.offset)?
            ],
            acquisition_from_row,
        )?;
        Ok(AcquisitionPage {
            acquisitions,
            total: u64::try_from(total).unwrap_or(0),
        })
    }

    /// Acquisitions corrected with the given lens correction.
    pub fn acquisitions_by_lens_correction(
        &self,
        acquisition_id: &str,
        page: Page,
    ) -> Result<AcquisitionPage, StoreError> {
        let acquisition_id = acquisition_id.trim();
        let lens = acquisition_by_key(&self.conn, acquisition_id)?
            .filter(|row| row.lens_correction)
            .ok_or_else(|| {
                StoreError::LensCorrectionNotFound(format!(
                    "Lens correction acquisition not found: {acquisition_id}"
                ))
            })?;
        let total: i64 = self.conn.query_row(
            "SELECT COUNT(1) FROM acquisitions WHERE lens_correction_ref = ?1",
            params![lens.id],
            |row| row.get(0),
        )?;
        let acquisitions = collect_rows(
            &self.conn,
            &format!(
                r#"
                SELECT {ACQUISITION_COLUMNS} FROM acquisitions
                WHERE lens_correction_ref = ?1
                ORDER BY start_time_ms DESC, id DESC
                LIMIT ?2 OFFSET ?3
                "#
            ),
            params![
                lens.id,
                to_sqlite_i64(page.limit)?,
                to_sqlite_i64(page.offset)?
            ],
            acquisition_from_row,
        )?;
        Ok(AcquisitionPage {
            acquisitions,
            total: u64::try_from(total).unwrap_or(0),
        })
    }
}
