#![forbid(unsafe_code)]

use super::*;
use rusqlite::params;
use std::collections::BTreeSet;

impl SqliteStore {
    pub fn create_specimen(
        &mut self,
        request: CreateSpecimenRequest,
    ) -> Result<SpecimenRow, StoreError> {
        let specimen_id = canonicalize("specimen_id", &request.specimen_id)?;
        let images = normalize_images(&request.specimen_images);
        let now = now_ms();

        let tx = self.conn.transaction()?;
        tx.execute(
            r#"
            INSERT INTO specimens(specimen_id, description, specimen_images_json,
                                  functional_imaging_metadata_json, created_at_ms, updated_at_ms)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            "#,
            params![
                specimen_id,
                clean_text(request.description),
                encode_list(&images)?,
                encode_json(request.functional_imaging_metadata.as_ref())?,
                now
            ],
        )
        .map_err(|err| map_insert_conflict(err, EntityKind::Specimen, &specimen_id))?;
        let row = require_specimen(&tx, &specimen_id)?;
        tx.commit()?;

        tracing::info!(specimen_id = %row.specimen_id, "specimen created");
        Ok(row)
    }

    pub fn get_specimen(&self, specimen_id: &str) -> Result<SpecimenRow, StoreError> {
        require_specimen(&self.conn, specimen_id.trim())
    }

    pub fn list_specimens(
        &self,
        request: &ListSpecimensRequest,
    ) -> Result<Vec<SpecimenRow>, StoreError> {
        let pattern = request
            .search
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(contains_pattern);
        collect_rows(
            &self.conn,
            &format!(
                r#"
                SELECT {SPECIMEN_COLUMNS} FROM specimens
                WHERE (?1 IS NULL OR specimen_id LIKE ?1 ESCAPE '\'
                       OR description LIKE ?1 ESCAPE '\')
                ORDER BY specimen_id ASC
                LIMIT ?2 OFFSET ?3
                "#
            ),
            params![
                pattern,
                to_sqlite_i64(request.page.limit)?,
                to_sqlite_i64(request.page.offset)?
            ],
            specimen_from_row,
        )
    }

    pub fn update_specimen(
        &mut self,
        specimen_id: &str,
        request: UpdateSpecimenRequest,
    ) -> Result<SpecimenRow, StoreError> {
        let tx = self.conn.transaction()?;
        let existing = require_specimen(&tx, specimen_id.trim())?;
        let description = match request.description {
            Some(description) => clean_text(Some(description)),
            None => existing.description.clone(),
        };
        let metadata = request
            .functional_imaging_metadata
            .or(existing.functional_imaging_metadata.clone());
        tx.execute(
            r#"
            UPDATE specimens
            SET description = ?2, functional_imaging_metadata_json = ?3, updated_at_ms = ?4
            WHERE id = ?1
            "#,
            params![
                existing.id,
                description,
                encode_json(metadata.as_ref())?,
                now_ms()
            ],
        )?;
        let row = require_specimen(&tx, &existing.specimen_id)?;
        tx.commit()?;
        Ok(row)
    }

    pub fn add_specimen_image(
        &mut self,
        specimen_id: &str,
        image_url: &str,
    ) -> Result<SpecimenRow, StoreError> {
        let image_url = image_url.trim();
        if image_url.is_empty() {
            return Err(StoreError::invalid("image_url must not be empty"));
        }
        self.edit_specimen_images(specimen_id, |_, images| {
            images.insert(image_url.to_string());
            Ok(())
        })
    }

    pub fn remove_specimen_image(
        &mut self,
        specimen_id: &str,
        image_url: &str,
    ) -> Result<SpecimenRow, StoreError> {
        let image_url = image_url.trim();
        self.edit_specimen_images(specimen_id, |specimen_id, images| {
            if images.remove(image_url) {
                return Ok(());
            }
            Err(StoreError::not_found(
                EntityKind::Specimen,
                format!("{specimen_id} image {image_url}"),
            ))
        })
    }

    fn edit_specimen_images(
        &mut self,
        specimen_id: &str,
        edit: impl FnOnce(&str, &mut BTreeSet<String>) -> Result<(), StoreError>,
    ) -> Result<SpecimenRow, StoreError> {
        let tx = self.conn.transaction()?;
        let existing = require_specimen(&tx, specimen_id.trim())?;
        let mut images = existing
            .specimen_images
            .into_iter()
            .collect::<BTreeSet<_>>();
        edit(&existing.specimen_id, &mut images)?;
        let images = images.into_iter().collect::<Vec<_>>();
        tx.execute(
            "UPDATE specimens SET specimen_images_json = ?2, updated_at_ms = ?3 WHERE id = ?1",
            params![existing.id, encode_list(&images)?, now_ms()],
        )?;
        let row = require_specimen(&tx, &existing.specimen_id)?;
        tx.commit()?;
        Ok(row)
    }

    pub fn delete_specimen(&mut self, specimen_id: &str) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        let existing = require_specimen(&tx, specimen_id.trim())?;
        ensure_unreferenced(&tx, EntityKind::Specimen, &existing.specimen_id, existing.id)?;
        delete_row(&tx, EntityKind::Specimen, existing.id)?;
        tx.commit()?;

        tracing::info!(specimen_id = %existing.specimen_id, "specimen deleted");
        Ok(())
    }
}

fn normalize_images(images: &[String]) -> Vec<String> {
    images
        .iter()
        .map(|image| image.trim())
        .filter(|image| !image.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
