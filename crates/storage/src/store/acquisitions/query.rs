#![forbid(unsafe_code)]

use super::super::*;
use rusqlite::{OptionalExtension, params};
use std::collections::HashSet;

impl SqliteStore {
    pub fn get_acquisition(&self, acquisition_id: &str) -> Result<AcquisitionRow, StoreError> {
        require_acquisition(&self.conn, acquisition_id.trim())
    }

    pub fn list_acquisitions(
        &self,
        request: &ListAcquisitionsRequest,
    ) -> Result<Vec<AcquisitionRow>, StoreError> {
        collect_rows(
            &self.conn,
            &format!(
                r#"
                SELECT {ACQUISITION_COLUMNS} FROM acquisitions
                WHERE (?1 IS NULL OR roi_id = ?1)
                  AND (?2 IS NULL OR acquisition_task_id = ?2)
                  AND (?3 IS NULL OR specimen_id = ?3)
                  AND (?4 IS NULL OR status = ?4)
                ORDER BY start_time_ms DESC, id DESC
                LIMIT ?5 OFFSET ?6
                "#
            ),
            params![
                request.roi_id.as_deref().map(str::trim),
                request.acquisition_task_id.as_deref().map(str::trim),
                request.specimen_id.as_deref().map(str::trim),
                request.status.map(|status| status.as_str()),
                to_sqlite_i64(request.page.limit)?,
                to_sqlite_i64(request.page.offset)?
            ],
            acquisition_from_row,
        )
    }

    /// The replacement chain `acquisition_id` belongs to, newest version first.
    pub fn acquisition_versions(
        &self,
        acquisition_id: &str,
    ) -> Result<Vec<AcquisitionRow>, StoreError> {
        let start = require_acquisition(&self.conn, acquisition_id.trim())?;
        let mut seen = HashSet::from([start.id]);

        let mut head = start;
        while let Some(next) = self.replacement_of(head.id)? {
            if !seen.insert(next.id) {
                break;
            }
            head = next;
        }

        let mut chain = Vec::new();
        let mut cursor = Some(head);
        let mut walked = HashSet::new();
        while let Some(row) = cursor {
            if !walked.insert(row.id) {
                break;
            }
            cursor = match row.replaces_acquisition_id.as_deref() {
                Some(previous) => acquisition_by_key(&self.conn, previous)?,
                None => None,
            };
            chain.push(row);
        }
        Ok(chain)
    }

    fn replacement_of(&self, id: i64) -> Result<Option<AcquisitionRow>, StoreError> {
        Ok(self
            .conn
            .query_row(
                &format!(
                    r#"
                    SELECT {ACQUISITION_COLUMNS} FROM acquisitions
                    WHERE replaces_ref = ?1
                    ORDER BY version DESC, id DESC
                    LIMIT 1
                    "#
                ),
                params![id],
                acquisition_from_row,
            )
            .optional()?)
    }
}
