#![forbid(unsafe_code)]

use super::super::*;
use rusqlite::params;

impl SqliteStore {
    pub fn get_roi(&self, roi_id: &str) -> Result<RoiRow, StoreError> {
        require_roi(&self.conn, roi_id.trim())
    }

    pub fn list_rois(&self, request: &ListRoisRequest) -> Result<Vec<RoiRow>, StoreError> {
        collect_rows(
            &self.conn,
            &format!(
                r#"
                SELECT {ROI_COLUMNS} FROM rois
                WHERE (?1 IS NULL OR specimen_id = ?1)
                  AND (?2 IS NULL OR block_id = ?2)
                  AND (?3 IS NULL OR section_id = ?3)
                  AND (?4 IS NULL OR parent_roi_id = ?4)
                  AND (?5 = 0 OR parent_roi_ref IS NULL)
                ORDER BY roi_id ASC
                LIMIT ?6 OFFSET ?7
                "#
            ),
            params![
                request.specimen_id.as_deref().map(str::trim),
                request.block_id.as_deref().map(str::trim),
                request.section_id.as_deref().map(str::trim),
                request.parent_roi_id.as_deref().map(str::trim),
                request.top_level_only,
                to_sqlite_i64(request.page.limit)?,
                to_sqlite_i64(request.page.offset)?
            ],
            roi_from_row,
        )
    }

    /// Direct children of an ROI, ordered by number, with paging metadata.
    pub fn roi_children(&self, roi_id: &str, page: Page) -> Result<RoiChildrenPage, StoreError> {
        let parent = require_roi(&self.conn, roi_id.trim())?;
        let total: i64 = self.conn.query_row(
            "SELECT COUNT(1) FROM rois WHERE parent_roi_ref = ?1",
            params![parent.id],
            |row| row.get(0),
        )?;
        let total_children = u64::try_from(total).unwrap_or(0);
        let children = collect_rows(
            &self.conn,
            &format!(
                r#"
                SELECT {ROI_COLUMNS} FROM rois
                WHERE parent_roi_ref = ?1
                ORDER BY roi_number ASC
                LIMIT ?2 OFFSET ?3
                "#
            ),
            params![
                parent.id,
                to_sqlite_i64(page.limit)?,
                to_sqlite_i64(page.offset)?
            ],
            roi_from_row,
        )?;
        let seen = page.offset as u64 + children.len() as u64;
        Ok(RoiChildrenPage {
            children,
            metadata: PageMetadata {
                skip: page.offset,
                limit: page.limit,
                total_children,
                has_more: seen < total_children,
            },
        })
    }

    /// The path from the top-level ancestor down to `roi_id`, inclusive.
    pub fn roi_hierarchy(&self, roi_id: &str) -> Result<Vec<RoiRow>, StoreError> {
        let mut current = require_roi(&self.conn, roi_id.trim())?;
        let mut path = Vec::with_capacity(current.hierarchy_level as usize);
        while let Some(parent_ref) = current.parent_roi_ref {
            let parent = self.conn.query_row(
                &format!("SELECT {ROI_COLUMNS} FROM rois WHERE id = ?1"),
                params![parent_ref],
                roi_from_row,
            )?;
            if parent.hierarchy_level >= current.hierarchy_level {
                return Err(StoreError::InconsistentHierarchy(format!(
                    "ROI '{}' has a parent at level {} but sits at level {}",
                    current.roi_id, parent.hierarchy_level, current.hierarchy_level
                )));
            }
            path.push(current);
            current = parent;
        }
        path.push(current);
        path.reverse();
        Ok(path)
    }
}
