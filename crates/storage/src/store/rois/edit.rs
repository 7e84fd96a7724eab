#![forbid(unsafe_code)]

use super::super::*;
use super::create::split_pair;
use rusqlite::params;

impl SqliteStore {
    pub fn update_roi(&mut self, roi_id: &str, request: UpdateRoiRequest) -> Result<RoiRow, StoreError> {
        let tx = self.conn.transaction()?;
        let existing = require_roi(&tx, roi_id.trim())?;
        let [aperture_width, aperture_height] =
            split_pair(request.aperture_width_height_mm.or(existing.aperture_width_height_mm));
        let [centroid_x, centroid_y] =
            split_pair(request.aperture_centroid.or(existing.aperture_centroid));
        let metadata = request.metadata.or(existing.metadata.clone());
        tx.execute(
            r#"
            UPDATE rois
            SET description = ?2, aperture_width_mm = ?3, aperture_height_mm = ?4,
                aperture_centroid_x = ?5, aperture_centroid_y = ?6, aperture_image = ?7,
                optical_nm_per_pixel = ?8, barcode = ?9, metadata_json = ?10, updated_at_ms = ?11
            WHERE id = ?1
            "#,
            params![
                existing.id,
                clean_text(request.description).or(existing.description.clone()),
                aperture_width,
                aperture_height,
                centroid_x,
                centroid_y,
                clean_text(request.aperture_image).or(existing.aperture_image.clone()),
                request.optical_nm_per_pixel.or(existing.optical_nm_per_pixel),
                clean_text(request.barcode).or(existing.barcode.clone()),
                encode_json(metadata.as_ref())?,
                now_ms()
            ],
        )?;
        let row = require_roi(&tx, &existing.roi_id)?;
        tx.commit()?;
        Ok(row)
    }

    /// Removes an ROI once it has no child ROIs, tasks or acquisitions.
    pub fn delete_roi(&mut self, roi_id: &str) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        let existing = require_roi(&tx, roi_id.trim())?;
        ensure_unreferenced(&tx, EntityKind::Roi, &existing.roi_id, existing.id)?;
        delete_row(&tx, EntityKind::Roi, existing.id)?;
        tx.commit()?;

        tracing::info!(roi_id = %existing.roi_id, "roi deleted");
        Ok(())
    }
}
