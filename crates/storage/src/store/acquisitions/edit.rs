#![forbid(unsafe_code)]

use super::super::*;
use super::lens::resolve_lens_reference;
use rusqlite::params;

impl SqliteStore {
    pub fn update_acquisition(
        &mut self,
        acquisition_id: &str,
        request: UpdateAcquisitionRequest,
    ) -> Result<AcquisitionRow, StoreError> {
        let tx = self.conn.transaction()?;
        let existing = require_acquisition(&tx, acquisition_id.trim())?;
        let end_time = request.end_time.or(existing.end_time);
        if end_time.is_some_and(|end_time| end_time < existing.start_time) {
            return Err(StoreError::invalid("end_time must not precede start_time"));
        }

        let (lens_ref, lens_id) = match resolve_lens_reference(
            &tx,
            existing.lens_correction,
            request.lens_correction_acquisition_id.as_deref(),
        )? {
            Some(lens) => (Some(lens.id), Some(lens.acquisition_id)),
            None => {
                let current_ref = existing
                    .lens_correction_acquisition_id
                    .as_deref()
                    .map(|lens_id| acquisition_by_key(&tx, lens_id))
                    .transpose()?
                    .flatten()
                    .map(|lens| lens.id);
                (current_ref, existing.lens_correction_acquisition_id.clone())
            }
        };
        let status = request.status.unwrap_or(existing.status);
        let hardware_settings = request.hardware_settings.or(existing.hardware_settings.clone());
        let acquisition_settings = request
            .acquisition_settings
            .or(existing.acquisition_settings.clone());

        tx.execute(
            r#"
            UPDATE acquisitions
            SET status = ?2, end_time_ms = ?3, tilt_angle = ?4, montage_set_name = ?5,
                lens_correction_ref = ?6, lens_correction_acquisition_id = ?7,
                hardware_settings_json = ?8, acquisition_settings_json = ?9, updated_at_ms = ?10
            WHERE id = ?1
            "#,
            params![
                existing.id,
                status.as_str(),
                end_time,
                request.tilt_angle.or(existing.tilt_angle),
                clean_text(request.montage_set_name).or(existing.montage_set_name.clone()),
                lens_ref,
                lens_id,
                encode_json(hardware_settings.as_ref())?,
                encode_json(acquisition_settings.as_ref())?,
                now_ms()
            ],
        )?;
        let row = require_acquisition(&tx, &existing.acquisition_id)?;
        tx.commit()?;

        tracing::info!(acquisition_id = %row.acquisition_id, status = row.status.as_str(), "acquisition updated");
        Ok(row)
    }

    /// Removes an acquisition once it has no tiles. Acquisitions that used it
    /// as their lens correction or replaced it lose that link.
    pub fn delete_acquisition(&mut self, acquisition_id: &str) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        let existing = require_acquisition(&tx, acquisition_id.trim())?;
        ensure_unreferenced(
            &tx,
            EntityKind::Acquisition,
            &existing.acquisition_id,
            existing.id,
        )?;

        let now = now_ms();
        let unlinked_lens = tx.execute(
            r#"
            UPDATE acquisitions
            SET lens_correction_ref = NULL, lens_correction_acquisition_id = NULL, updated_at_ms = ?2
            WHERE lens_correction_ref = ?1
            "#,
            params![existing.id, now],
        )?;
        let unlinked_replacements = tx.execute(
            r#"
            UPDATE acquisitions
            SET replaces_ref = NULL, replaces_acquisition_id = NULL, updated_at_ms = ?2
            WHERE replaces_ref = ?1
            "#,
            params![existing.id, now],
        )?;
        delete_row(&tx, EntityKind::Acquisition, existing.id)?;
        tx.commit()?;

        tracing::info!(
            acquisition_id = %existing.acquisition_id,
            unlinked_lens,
            unlinked_replacements,
            "acquisition deleted"
        );
        Ok(())
    }
}
