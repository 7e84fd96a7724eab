#![forbid(unsafe_code)]

//! Column lists, row mappers and by-key lookups shared by every entity module.

use super::super::*;
use rusqlite::types::Type;
use rusqlite::{OptionalExtension, Row, params};
use serde_json::Value;
use temdb_core::model::{AcquisitionStatus, MediaType, SectionQuality, TaskStatus};

pub(in crate::store) const SPECIMEN_COLUMNS: &str = "id, specimen_id, description, specimen_images_json, \
     functional_imaging_metadata_json, created_at_ms, updated_at_ms";

pub(in crate::store) const BLOCK_COLUMNS: &str = "id, specimen_ref, block_id, specimen_id, description, \
     microct_info_json, created_at_ms, updated_at_ms";

pub(in crate::store) const CUTTING_SESSION_COLUMNS: &str = "id, block_ref, cutting_session_id, specimen_id, block_id, \
     start_time_ms, end_time_ms, operator, sectioning_device, media_type, knife_id, \
     created_at_ms, updated_at_ms";

pub(in crate::store) const SUBSTRATE_COLUMNS: &str =
    "id, media_id, media_type, uid, status, metadata_json, created_at_ms, updated_at_ms";

pub(in crate::store) const SECTION_COLUMNS: &str = "id, cutting_session_ref, substrate_ref, section_id, section_number, \
     cutting_session_id, block_id, specimen_id, media_id, barcode, quality, thickness_um, \
     optical_image_json, cut_at_ms, created_at_ms, updated_at_ms";

pub(in crate::store) const ROI_COLUMNS: &str = "id, section_ref, parent_roi_ref, roi_id, roi_number, hierarchy_level, \
     parent_roi_id, section_id, block_id, specimen_id, substrate_media_id, description, \
     aperture_width_mm, aperture_height_mm, aperture_centroid_x, aperture_centroid_y, \
     aperture_image, optical_nm_per_pixel, barcode, metadata_json, created_at_ms, updated_at_ms";

pub(in crate::store) const TASK_COLUMNS: &str = "id, roi_ref, task_id, specimen_id, block_id, roi_id, task_type, version, \
     status, tags_json, metadata_json, error_message, started_at_ms, completed_at_ms, \
     created_at_ms, updated_at_ms";

pub(in crate::store) const ACQUISITION_COLUMNS: &str = "id, task_ref, roi_ref, acquisition_id, montage_id, specimen_id, roi_id, \
     acquisition_task_id, status, version, replaces_acquisition_id, lens_correction, \
     lens_correction_acquisition_id, scope_id, magnification, tilt_angle, montage_set_name, \
     start_time_ms, end_time_ms, hardware_settings_json, acquisition_settings_json, \
     created_at_ms, updated_at_ms";

pub(in crate::store) const TILE_COLUMNS: &str = "id, acquisition_ref, tile_id, acquisition_id, roi_id, specimen_id, \
     raster_index, stage_x, stage_y, raster_row, raster_col, focus_score, image_path, \
     supertile_id, created_at_ms";

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

#[derive(Debug)]
struct UnknownVariant(String);

impl std::fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown stored value '{}'", self.0)
    }
}

impl std::error::Error for UnknownVariant {}

fn json_list(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<String>> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|err| conversion_error(idx, err))
}

fn json_value(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Value>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|raw| serde_json::from_str(&raw).map_err(|err| conversion_error(idx, err)))
        .transpose()
}

fn parsed<T>(row: &Row<'_>, idx: usize, parse: fn(&str) -> Option<T>) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    parse(&raw).ok_or_else(|| conversion_error(idx, UnknownVariant(raw)))
}

fn parsed_opt<T>(
    row: &Row<'_>,
    idx: usize,
    parse: fn(&str) -> Option<T>,
) -> rusqlite::Result<Option<T>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|raw| parse(&raw).ok_or_else(|| conversion_error(idx, UnknownVariant(raw))))
        .transpose()
}

fn pair(row: &Row<'_>, first: usize) -> rusqlite::Result<Option<[f64; 2]>> {
    let a: Option<f64> = row.get(first)?;
    let b: Option<f64> = row.get(first + 1)?;
    Ok(match (a, b) {
        (Some(a), Some(b)) => Some([a, b]),
        _ => None,
    })
}

/// `%text%` for a `LIKE ... ESCAPE '\'` match on the literal text.
pub(in crate::store) fn contains_pattern(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

pub(in crate::store) fn encode_list(values: &[String]) -> Result<String, StoreError> {
    Ok(serde_json::to_string(values)?)
}

pub(in crate::store) fn encode_json(value: Option<&Value>) -> Result<Option<String>, StoreError> {
    value
        .filter(|value| !value.is_null())
        .map(serde_json::to_string)
        .transpose()
        .map_err(StoreError::from)
}

pub(in crate::store) fn specimen_from_row(row: &Row<'_>) -> rusqlite::Result<SpecimenRow> {
    Ok(SpecimenRow {
        id: row.get(0)?,
        specimen_id: row.get(1)?,
        description: row.get(2)?,
        specimen_images: json_list(row, 3)?,
        functional_imaging_metadata: json_value(row, 4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

pub(in crate::store) fn block_from_row(row: &Row<'_>) -> rusqlite::Result<BlockRow> {
    Ok(BlockRow {
        id: row.get(0)?,
        specimen_ref: row.get(1)?,
        block_id: row.get(2)?,
        specimen_id: row.get(3)?,
        description: row.get(4)?,
        microct_info: json_value(row, 5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

pub(in crate::store) fn cutting_session_from_row(
    row: &Row<'_>,
) -> rusqlite::Result<CuttingSessionRow> {
    Ok(CuttingSessionRow {
        id: row.get(0)?,
        block_ref: row.get(1)?,
        cutting_session_id: row.get(2)?,
        specimen_id: row.get(3)?,
        block_id: row.get(4)?,
        start_time: row.get(5)?,
        end_time: row.get(6)?,
        operator: row.get(7)?,
        sectioning_device: row.get(8)?,
        media_type: parsed(row, 9, MediaType::parse)?,
        knife_id: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

pub(in crate::store) fn substrate_from_row(row: &Row<'_>) -> rusqlite::Result<SubstrateRow> {
    Ok(SubstrateRow {
        id: row.get(0)?,
        media_id: row.get(1)?,
        media_type: row.get(2)?,
        uid: row.get(3)?,
        status: row.get(4)?,
        metadata: json_value(row, 5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

pub(in crate::store) fn section_from_row(row: &Row<'_>) -> rusqlite::Result<SectionRow> {
    Ok(SectionRow {
        id: row.get(0)?,
        cutting_session_ref: row.get(1)?,
        substrate_ref: row.get(2)?,
        section_id: row.get(3)?,
        section_number: row.get(4)?,
        cutting_session_id: row.get(5)?,
        block_id: row.get(6)?,
        specimen_id: row.get(7)?,
        media_id: row.get(8)?,
        barcode: row.get(9)?,
        quality: parsed_opt(row, 10, SectionQuality::parse)?,
        thickness_um: row.get(11)?,
        optical_image: json_value(row, 12)?,
        cut_at: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}

pub(in crate::store) fn roi_from_row(row: &Row<'_>) -> rusqlite::Result<RoiRow> {
    Ok(RoiRow {
        id: row.get(0)?,
        section_ref: row.get(1)?,
        parent_roi_ref: row.get(2)?,
        roi_id: row.get(3)?,
        roi_number: row.get(4)?,
        hierarchy_level: row.get(5)?,
        parent_roi_id: row.get(6)?,
        section_id: row.get(7)?,
        block_id: row.get(8)?,
        specimen_id: row.get(9)?,
        substrate_media_id: row.get(10)?,
        description: row.get(11)?,
        aperture_width_height_mm: pair(row, 12)?,
        aperture_centroid: pair(row, 14)?,
        aperture_image: row.get(16)?,
        optical_nm_per_pixel: row.get(17)?,
        barcode: row.get(18)?,
        metadata: json_value(row, 19)?,
        created_at: row.get(20)?,
        updated_at: row.get(21)?,
    })
}

pub(in crate::store) fn task_from_row(row: &Row<'_>) -> rusqlite::Result<AcquisitionTaskRow> {
    Ok(AcquisitionTaskRow {
        id: row.get(0)?,
        roi_ref: row.get(1)?,
        task_id: row.get(2)?,
        specimen_id: row.get(3)?,
        block_id: row.get(4)?,
        roi_id: row.get(5)?,
        task_type: row.get(6)?,
        version: row.get(7)?,
        status: parsed(row, 8, TaskStatus::parse)?,
        tags: json_list(row, 9)?,
        metadata: json_value(row, 10)?,
        error_message: row.get(11)?,
        started_at: row.get(12)?,
        completed_at: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}

pub(in crate::store) fn acquisition_from_row(row: &Row<'_>) -> rusqlite::Result<AcquisitionRow> {
    Ok(AcquisitionRow {
        id: row.get(0)?,
        task_ref: row.get(1)?,
        roi_ref: row.get(2)?,
        acquisition_id: row.get(3)?,
        montage_id: row.get(4)?,
        specimen_id: row.get(5)?,
        roi_id: row.get(6)?,
        acquisition_task_id: row.get(7)?,
        status: parsed(row, 8, AcquisitionStatus::parse)?,
        version: row.get(9)?,
        replaces_acquisition_id: row.get(10)?,
        lens_correction: row.get::<_, i64>(11)? != 0,
        lens_correction_acquisition_id: row.get(12)?,
        scope_id: row.get(13)?,
        magnification: row.get(14)?,
        tilt_angle: row.get(15)?,
        montage_set_name: row.get(16)?,
        start_time: row.get(17)?,
        end_time: row.get(18)?,
        hardware_settings: json_value(row, 19)?,
        acquisition_settings: json_value(row, 20)?,
        created_at: row.get(21)?,
        updated_at: row.get(22)?,
    })
}

pub(in crate::store) fn tile_from_row(row: &Row<'_>) -> rusqlite::Result<TileRow> {
    Ok(TileRow {
        id: row.get(0)?,
        acquisition_ref: row.get(1)?,
        tile_id: row.get(2)?,
        acquisition_id: row.get(3)?,
        roi_id: row.get(4)?,
        specimen_id: row.get(5)?,
        raster_index: row.get(6)?,
        stage_x: row.get(7)?,
        stage_y: row.get(8)?,
        raster_row: row.get(9)?,
        raster_col: row.get(10)?,
        focus_score: row.get(11)?,
        image_path: row.get(12)?,
        supertile_id: row.get(13)?,
        created_at: row.get(14)?,
    })
}

pub(in crate::store) fn specimen_by_key(
    conn: &Connection,
    specimen_id: &str,
) -> Result<Option<SpecimenRow>, StoreError> {
    Ok(conn
        .query_row(
            &format!("SELECT {SPECIMEN_COLUMNS} FROM specimens WHERE specimen_id = ?1"),
            params![specimen_id],
            specimen_from_row,
        )
        .optional()?)
}

pub(in crate::store) fn block_by_key(
    conn: &Connection,
    specimen_id: &str,
    block_id: &str,
) -> Result<Option<BlockRow>, StoreError> {
    Ok(conn
        .query_row(
            &format!(
                "SELECT {BLOCK_COLUMNS} FROM blocks WHERE specimen_id = ?1 AND block_id = ?2"
            ),
            params![specimen_id, block_id],
            block_from_row,
        )
        .optional()?)
}

pub(in crate::store) fn cutting_session_by_key(
    conn: &Connection,
    cutting_session_id: &str,
) -> Result<Option<CuttingSessionRow>, StoreError> {
    Ok(conn
        .query_row(
            &format!(
                "SELECT {CUTTING_SESSION_COLUMNS} FROM cutting_sessions WHERE cutting_session_id = ?1"
            ),
            params![cutting_session_id],
            cutting_session_from_row,
        )
        .optional()?)
}

pub(in crate::store) fn substrate_by_key(
    conn: &Connection,
    media_id: &str,
) -> Result<Option<SubstrateRow>, StoreError> {
    Ok(conn
        .query_row(
            &format!("SELECT {SUBSTRATE_COLUMNS} FROM substrates WHERE media_id = ?1"),
            params![media_id],
            substrate_from_row,
        )
        .optional()?)
}

pub(in crate::store) fn section_by_key(
    conn: &Connection,
    section_id: &str,
) -> Result<Option<SectionRow>, StoreError> {
    Ok(conn
        .query_row(
            &format!("SELECT {SECTION_COLUMNS} FROM sections WHERE section_id = ?1"),
            params![section_id],
            section_from_row,
        )
        .optional()?)
}

pub(in crate::store) fn roi_by_key(
    conn: &Connection,
    roi_id: &str,
) -> Result<Option<RoiRow>, StoreError> {
    Ok(conn
        .query_row(
            &format!("SELECT {ROI_COLUMNS} FROM rois WHERE roi_id = ?1"),
            params![roi_id],
            roi_from_row,
        )
        .optional()?)
}

pub(in crate::store) fn task_by_key(
    conn: &Connection,
    task_id: &str,
) -> Result<Option<AcquisitionTaskRow>, StoreError> {
    Ok(conn
        .query_row(
            &format!("SELECT {TASK_COLUMNS} FROM acquisition_tasks WHERE task_id = ?1"),
            params![task_id],
            task_from_row,
        )
        .optional()?)
}

pub(in crate::store) fn acquisition_by_key(
    conn: &Connection,
    acquisition_id: &str,
) -> Result<Option<AcquisitionRow>, StoreError> {
    Ok(conn
        .query_row(
            &format!("SELECT {ACQUISITION_COLUMNS} FROM acquisitions WHERE acquisition_id = ?1"),
            params![acquisition_id],
            acquisition_from_row,
        )
        .optional()?)
}

pub(in crate::store) fn tile_by_key(
    conn: &Connection,
    acquisition_ref: i64,
    tile_id: &str,
) -> Result<Option<TileRow>, StoreError> {
    Ok(conn
        .query_row(
            &format!("SELECT {TILE_COLUMNS} FROM tiles WHERE acquisition_ref = ?1 AND tile_id = ?2"),
            params![acquisition_ref, tile_id],
            tile_from_row,
        )
        .optional()?)
}

pub(in crate::store) fn require_specimen(
    conn: &Connection,
    specimen_id: &str,
) -> Result<SpecimenRow, StoreError> {
    specimen_by_key(conn, specimen_id)?
        .ok_or_else(|| StoreError::not_found(EntityKind::Specimen, specimen_id))
}

pub(in crate::store) fn require_block(
    conn: &Connection,
    specimen_id: &str,
    block_id: &str,
) -> Result<BlockRow, StoreError> {
    block_by_key(conn, specimen_id, block_id)?
        .ok_or_else(|| StoreError::not_found(EntityKind::Block, block_id))
}

pub(in crate::store) fn require_cutting_session(
    conn: &Connection,
    cutting_session_id: &str,
) -> Result<CuttingSessionRow, StoreError> {
    cutting_session_by_key(conn, cutting_session_id)?
        .ok_or_else(|| StoreError::not_found(EntityKind::CuttingSession, cutting_session_id))
}

pub(in crate::store) fn require_substrate(
    conn: &Connection,
    media_id: &str,
) -> Result<SubstrateRow, StoreError> {
    substrate_by_key(conn, media_id)?
        .ok_or_else(|| StoreError::not_found(EntityKind::Substrate, media_id))
}

pub(in crate::store) fn require_section(
    conn: &Connection,
    section_id: &str,
) -> Result<SectionRow, StoreError> {
    section_by_key(conn, section_id)?
        .ok_or_else(|| StoreError::not_found(EntityKind::Section, section_id))
}

pub(in crate::store) fn require_roi(conn: &Connection, roi_id: &str) -> Result<RoiRow, StoreError> {
    roi_by_key(conn, roi_id)?.ok_or_else(|| StoreError::not_found(EntityKind::Roi, roi_id))
}

pub(in crate::store) fn require_task(
    conn: &Connection,
    task_id: &str,
) -> Result<AcquisitionTaskRow, StoreError> {
    task_by_key(conn, task_id)?
        .ok_or_else(|| StoreError::not_found(EntityKind::AcquisitionTask, task_id))
}

pub(in crate::store) fn require_acquisition(
    conn: &Connection,
    acquisition_id: &str,
) -> Result<AcquisitionRow, StoreError> {
    acquisition_by_key(conn, acquisition_id)?
        .ok_or_else(|| StoreError::not_found(EntityKind::Acquisition, acquisition_id))
}

/// Runs a filtered `SELECT` and collects mapped rows.
pub(in crate::store) fn collect_rows<T>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn rusqlite::ToSql],
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>, StoreError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, map)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}
