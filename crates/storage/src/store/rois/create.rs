#![forbid(unsafe_code)]

use super::super::*;
use rusqlite::params;
use std::collections::HashSet;
use temdb_core::ids::{RoiId, format_roi_id, parse_hierarchy_level, validate_roi_number};

impl SqliteStore {
    /// Looks up the section and optional parent ROI a new ROI would hang off,
    /// without writing anything.
    pub fn validate_and_resolve_roi_parent(
        &self,
        keys: RoiParentKeys<'_>,
    ) -> Result<(SectionRow, Option<RoiRow>), StoreError> {
        let mut cache = LookupCache::default();
        let resolved = resolve_roi_parent(&self.conn, &mut cache, keys)?;
        Ok((resolved.section, resolved.parent))
    }

    pub fn create_roi(&mut self, request: CreateRoiRequest) -> Result<RoiRow, StoreError> {
        let tx = self.conn.transaction()?;
        let mut cache = LookupCache::default();
        let row = insert_roi(&tx, &mut cache, request)?;
        tx.commit()?;

        tracing::info!(
            roi_id = %row.roi_id,
            hierarchy_level = row.hierarchy_level,
            "roi created"
        );
        Ok(row)
    }

    /// Creates every ROI or none of them. An item may name as parent an ROI
    /// that appears earlier in the same batch.
    pub fn create_rois_batch(
        &mut self,
        requests: Vec<CreateRoiRequest>,
    ) -> Result<Vec<RoiRow>, StoreError> {
        if requests.is_empty() {
            return Err(StoreError::invalid("ROI data list cannot be empty."));
        }

        let mut seen = HashSet::new();
        for (index, request) in requests.iter().enumerate() {
            let roi_id = planned_roi_id(request).map_err(|err| with_batch_index(err, index))?;
            if !seen.insert(roi_id.clone()) {
                return Err(StoreError::Conflict {
                    entity: EntityKind::Roi,
                    key: roi_id,
                });
            }
        }

        let tx = self.conn.transaction()?;
        let mut cache = LookupCache::default();
        let mut out = Vec::with_capacity(requests.len());
        for (index, request) in requests.into_iter().enumerate() {
            let row = insert_roi(&tx, &mut cache, request)
                .map_err(|err| with_batch_index(err, index))?;
            cache.remember_roi(row.clone());
            out.push(row);
        }
        tx.commit()?;

        tracing::info!(count = out.len(), lookups = cache.queries(), "roi batch created");
        Ok(out)
    }
}

struct RoiKeys {
    specimen_id: String,
    block_id: String,
    section_id: String,
    substrate_media_id: String,
    parent_roi_id: Option<String>,
}

impl RoiKeys {
    fn from_request(request: &CreateRoiRequest) -> Result<Self, StoreError> {
        validate_roi_number(request.roi_number)
            .map_err(|err| StoreError::invalid(format!("invalid roi_number: {}", err.message())))?;
        let parent_roi_id = request
            .parent_roi_id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| {
                RoiId::try_new(value)
                    .map(RoiId::into_string)
                    .map_err(|err| StoreError::invalid(format!("invalid parent_roi_id: {}", err.message())))
            })
            .transpose()?;
        Ok(Self {
            specimen_id: canonicalize("specimen_id", &request.specimen_id)?,
            block_id: canonicalize("block_id", &request.block_id)?,
            section_id: canonicalize("section_id", &request.section_id)?,
            substrate_media_id: canonicalize("substrate_media_id", &request.substrate_media_id)?,
            parent_roi_id,
        })
    }

    fn parent_keys(&self) -> RoiParentKeys<'_> {
        RoiParentKeys {
            specimen_id: &self.specimen_id,
            block_id: &self.block_id,
            section_id: &self.section_id,
            substrate_media_id: &self.substrate_media_id,
            parent_roi_id: self.parent_roi_id.as_deref(),
        }
    }

    fn roi_id(&self, roi_number: u32) -> String {
        format_roi_id(
            &self.specimen_id,
            &self.block_id,
            &self.section_id,
            &self.substrate_media_id,
            roi_number,
            self.parent_roi_id.as_deref(),
        )
    }
}

fn planned_roi_id(request: &CreateRoiRequest) -> Result<String, StoreError> {
    Ok(RoiKeys::from_request(request)?.roi_id(request.roi_number))
}

fn insert_roi(
    conn: &Connection,
    cache: &mut LookupCache,
    request: CreateRoiRequest,
) -> Result<RoiRow, StoreError> {
    let keys = RoiKeys::from_request(&request)?;
    let resolved = resolve_roi_parent(conn, cache, keys.parent_keys())?;
    let roi_id = keys.roi_id(request.roi_number);

    let level = parse_hierarchy_level(&roi_id);
    if u32::try_from(level).ok() != Some(resolved.hierarchy_level) {
        return Err(StoreError::InconsistentHierarchy(format!(
            "ROI '{roi_id}' has {level} ROI segments but resolves to level {}",
            resolved.hierarchy_level
        )));
    }

    let [aperture_width, aperture_height] = split_pair(request.aperture_width_height_mm);
    let [centroid_x, centroid_y] = split_pair(request.aperture_centroid);
    let now = now_ms();
    conn.execute(
        r#"
        INSERT INTO rois(roi_id, roi_number, hierarchy_level, section_ref, parent_roi_ref,
                         parent_roi_id, section_id, block_id, specimen_id, substrate_media_id,
                         description, aperture_width_mm, aperture_height_mm, aperture_centroid_x,
                         aperture_centroid_y, aperture_image, optical_nm_per_pixel, barcode,
                         metadata_json, created_at_ms, updated_at_ms)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18,
                ?19, ?20, ?20)
        "#,
        params![
            roi_id,
            request.roi_number,
            resolved.hierarchy_level,
            resolved.section.id,
            resolved.parent.as_ref().map(|parent| parent.id),
            resolved.parent.as_ref().map(|parent| parent.roi_id.as_str()),
            resolved.section.section_id,
            resolved.section.block_id,
            resolved.section.specimen_id,
            resolved.section.media_id,
            clean_text(request.description),
            aperture_width,
            aperture_height,
            centroid_x,
            centroid_y,
            clean_text(request.aperture_image),
            request.optical_nm_per_pixel,
            clean_text(request.barcode),
            encode_json(request.metadata.as_ref())?,
            now
        ],
    )
    .map_err(|err| map_insert_conflict(err, EntityKind::Roi, &roi_id))?;
    require_roi(conn, &roi_id)
}

pub(super) fn split_pair(value: Option<[f64; 2]>) -> [Option<f64>; 2] {
    match value {
        Some([a, b]) => [Some(a), Some(b)],
        None => [None, None],
    }
}
