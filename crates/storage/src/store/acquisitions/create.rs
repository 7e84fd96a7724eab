#![forbid(unsafe_code)]

use super::super::*;
use super::lens::resolve_lens_reference;
use rusqlite::params;
use temdb_core::ids::RoiId;

impl SqliteStore {
    pub fn create_acquisition(
        &mut self,
        request: CreateAcquisitionRequest,
    ) -> Result<AcquisitionRow, StoreError> {
        let acquisition_id = canonicalize("acquisition_id", &request.acquisition_id)?;
        let task_id = canonicalize("acquisition_task_id", &request.acquisition_task_id)?;
        let roi_id = RoiId::try_new(request.roi_id.trim())
            .map_err(|err| StoreError::invalid(format!("invalid roi_id: {}", err.message())))?;
        let montage_id = clean_text(Some(request.montage_id))
            .ok_or_else(|| StoreError::invalid("montage_id must not be empty"))?;
        let scope_id = clean_text(Some(request.scope_id))
            .ok_or_else(|| StoreError::invalid("scope_id must not be empty"))?;
        if request.magnification == 0 {
            return Err(StoreError::invalid("magnification must be greater than zero"));
        }
        let now = now_ms();
        let start_time = request.start_time.unwrap_or(now);
        if request.end_time.is_some_and(|end_time| end_time < start_time) {
            return Err(StoreError::invalid("end_time must not precede start_time"));
        }

        let tx = self.conn.transaction()?;
        let roi = require_roi(&tx, roi_id.as_str())?;
        let task = require_task(&tx, &task_id)?;
        if task.roi_ref != roi.id {
            return Err(StoreError::InconsistentHierarchy(format!(
                "acquisition task '{}' targets ROI '{}', not '{}'",
                task.task_id, task.roi_id, roi.roi_id
            )));
        }

        let replaced = match request.replaces_acquisition_id.as_deref().map(str::trim) {
            Some(replaced_id) if !replaced_id.is_empty() => {
                let Some(replaced) = acquisition_by_key(&tx, replaced_id)? else {
                    return Err(StoreError::InvalidReference(format!(
                        "replaced acquisition '{replaced_id}' not found"
                    )));
                };
                if replaced.roi_ref != roi.id {
                    return Err(StoreError::InvalidReference(format!(
                        "replaced acquisition '{replaced_id}' belongs to ROI '{}', not '{}'",
                        replaced.roi_id, roi.roi_id
                    )));
                }
                Some(replaced)
            }
            _ => None,
        };
        let lens = resolve_lens_reference(
            &tx,
            request.lens_correction,
            request.lens_correction_acquisition_id.as_deref(),
        )?;
        let version = replaced.as_ref().map_or(1, |replaced| replaced.version + 1);
        let status = request.status.unwrap_or_default();

        tx.execute(
            r#"
            INSERT INTO acquisitions(acquisition_id, montage_id, task_ref, roi_ref,
                                     acquisition_task_id, roi_id, specimen_id, status, version,
                                     replaces_ref, replaces_acquisition_id, lens_correction,
                                     lens_correction_ref, lens_correction_acquisition_id, scope_id,
                                     magnification, tilt_angle, montage_set_name, start_time_ms,
                                     end_time_ms, hardware_settings_json, acquisition_settings_json,
                                     created_at_ms, updated_at_ms)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18,
                    ?19, ?20, ?21, ?22, ?23, ?23)
            "#,
            params![
                acquisition_id,
                montage_id,
                task.id,
                roi.id,
                task.task_id,
                roi.roi_id,
                roi.specimen_id,
                status.as_str(),
                version,
                replaced.as_ref().map(|row| row.id),
                replaced.as_ref().map(|row| row.acquisition_id.as_str()),
                request.lens_correction,
                lens.as_ref().map(|row| row.id),
                lens.as_ref().map(|row| row.acquisition_id.as_str()),
                scope_id,
                request.magnification,
                request.tilt_angle,
                clean_text(request.montage_set_name),
                start_time,
                request.end_time,
                encode_json(request.hardware_settings.as_ref())?,
                encode_json(request.acquisition_settings.as_ref())?,
                now
            ],
        )
        .map_err(|err| map_insert_conflict(err, EntityKind::Acquisition, &acquisition_id))?;
        let row = require_acquisition(&tx, &acquisition_id)?;
        tx.commit()?;

        tracing::info!(
            acquisition_id = %row.acquisition_id,
            roi_id = %row.roi_id,
            version = row.version,
            lens_correction = row.lens_correction,
            "acquisition created"
        );
        Ok(row)
    }
}
