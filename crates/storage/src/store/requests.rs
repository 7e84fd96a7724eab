#![forbid(unsafe_code)]

use serde::Deserialize;
use serde_json::Value;
use temdb_core::model::{AcquisitionStatus, MediaType, SectionQuality, TaskStatus};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub limit: usize,
    pub offset: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: 10,
            offset: 0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct CreateSpecimenRequest {
    pub specimen_id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub specimen_images: Vec<String>,
    #[serde(default)]
    pub functional_imaging_metadata: Option<Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct UpdateSpecimenRequest {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub functional_imaging_metadata: Option<Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListSpecimensRequest {
    pub search: Option<String>,
    pub page: Page,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct CreateBlockRequest {
    pub specimen_id: String,
    pub block_id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "microCT_info")]
    pub microct_info: Option<Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct UpdateBlockRequest {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "microCT_info")]
    pub microct_info: Option<Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListBlocksRequest {
    pub specimen_id: Option<String>,
    pub page: Page,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CreateCuttingSessionRequest {
    pub cutting_session_id: String,
    pub specimen_id: String,
    pub block_id: String,
    #[serde(default, with = "crate::store::timestamp::option")]
    pub start_time: Option<i64>,
    #[serde(default, with = "crate::store::timestamp::option")]
    pub end_time: Option<i64>,
    #[serde(default)]
    pub operator: Option<String>,
    #[serde(default)]
    pub sectioning_device: Option<String>,
    pub media_type: MediaType,
    #[serde(default)]
    pub knife_id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct UpdateCuttingSessionRequest {
    #[serde(default, with = "crate::store::timestamp::option")]
    pub end_time: Option<i64>,
    #[serde(default)]
    pub operator: Option<String>,
    #[serde(default)]
    pub sectioning_device: Option<String>,
    #[serde(default)]
    pub media_type: Option<MediaType>,
    #[serde(default)]
    pub knife_id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListCuttingSessionsRequest {
    pub specimen_id: Option<String>,
    pub block_id: Option<String>,
    pub page: Page,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct CreateSubstrateRequest {
    pub media_id: String,
    pub media_type: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct UpdateSubstrateRequest {
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListSubstratesRequest {
    pub media_type: Option<String>,
    pub status: Option<String>,
    pub page: Page,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct CreateSectionRequest {
    /// Defaults to `{media_id}_S{section_number:05}`.
    #[serde(default)]
    pub section_id: Option<String>,
    pub section_number: u32,
    pub cutting_session_id: String,
    pub media_id: String,
    #[serde(default)]
    pub specimen_id: Option<String>,
    #[serde(default)]
    pub block_id: Option<String>,
    #[serde(default, with = "crate::store::timestamp::option")]
    pub cut_at: Option<i64>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub quality: Option<SectionQuality>,
    #[serde(default)]
    pub thickness_um: Option<f64>,
    #[serde(default)]
    pub optical_image: Option<Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct UpdateSectionRequest {
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub quality: Option<SectionQuality>,
    #[serde(default)]
    pub thickness_um: Option<f64>,
    #[serde(default)]
    pub optical_image: Option<Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListSectionsRequest {
    pub cutting_session_id: Option<String>,
    pub media_id: Option<String>,
    pub specimen_id: Option<String>,
    pub page: Page,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct CreateRoiRequest {
    pub section_id: String,
    pub specimen_id: String,
    pub block_id: String,
    pub substrate_media_id: String,
    pub roi_number: u32,
    #[serde(default)]
    pub parent_roi_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub aperture_width_height_mm: Option<[f64; 2]>,
    #[serde(default)]
    pub aperture_centroid: Option<[f64; 2]>,
    #[serde(default)]
    pub aperture_image: Option<String>,
    #[serde(default)]
    pub optical_nm_per_pixel: Option<f64>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct UpdateRoiRequest {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub aperture_width_height_mm: Option<[f64; 2]>,
    #[serde(default)]
    pub aperture_centroid: Option<[f64; 2]>,
    #[serde(default)]
    pub aperture_image: Option<String>,
    #[serde(default)]
    pub optical_nm_per_pixel: Option<f64>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListRoisRequest {
    pub specimen_id: Option<String>,
    pub block_id: Option<String>,
    pub section_id: Option<String>,
    pub parent_roi_id: Option<String>,
    pub top_level_only: bool,
    pub page: Page,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct CreateAcquisitionTaskRequest {
    pub task_id: String,
    pub specimen_id: String,
    pub block_id: String,
    pub roi_id: String,
    #[serde(default)]
    pub task_type: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct UpdateAcquisitionTaskRequest {
    #[serde(default)]
    pub task_type: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct UpdateTaskStatusRequest {
    pub status: TaskStatus,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListAcquisitionTasksRequest {
    pub specimen_id: Option<String>,
    pub block_id: Option<String>,
    pub roi_id: Option<String>,
    pub status: Option<TaskStatus>,
    pub task_type: Option<String>,
    pub page: Page,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct CreateAcquisitionRequest {
    pub acquisition_id: String,
    pub montage_id: String,
    pub roi_id: String,
    pub acquisition_task_id: String,
    #[serde(default)]
    pub status: Option<AcquisitionStatus>,
    #[serde(default)]
    pub replaces_acquisition_id: Option<String>,
    #[serde(default)]
    pub lens_correction: bool,
    #[serde(default)]
    pub lens_correction_acquisition_id: Option<String>,
    pub scope_id: String,
    pub magnification: u32,
    #[serde(default)]
    pub tilt_angle: Option<f64>,
    #[serde(default)]
    pub montage_set_name: Option<String>,
    #[serde(default, with = "crate::store::timestamp::option")]
    pub start_time: Option<i64>,
    #[serde(default, with = "crate::store::timestamp::option")]
    pub end_time: Option<i64>,
    #[serde(default)]
    pub hardware_settings: Option<Value>,
    #[serde(default)]
    pub acquisition_settings: Option<Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct UpdateAcquisitionRequest {
    #[serde(default)]
    pub status: Option<AcquisitionStatus>,
    #[serde(default, with = "crate::store::timestamp::option")]
    pub end_time: Option<i64>,
    #[serde(default)]
    pub tilt_angle: Option<f64>,
    #[serde(default)]
    pub montage_set_name: Option<String>,
    #[serde(default)]
    pub lens_correction_acquisition_id: Option<String>,
    #[serde(default)]
    pub hardware_settings: Option<Value>,
    #[serde(default)]
    pub acquisition_settings: Option<Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListAcquisitionsRequest {
    pub roi_id: Option<String>,
    pub acquisition_task_id: Option<String>,
    pub specimen_id: Option<String>,
    pub status: Option<AcquisitionStatus>,
    pub page: Page,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct CreateTileRequest {
    pub tile_id: String,
    pub raster_index: u32,
    pub stage_x: f64,
    pub stage_y: f64,
    pub raster_row: u32,
    pub raster_col: u32,
    #[serde(default)]
    pub focus_score: Option<f64>,
    pub image_path: String,
    #[serde(default)]
    pub supertile_id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListLensCorrectionsRequest {
    pub scope_id: Option<String>,
    pub magnification: Option<u32>,
    pub from_time: Option<i64>,
    pub to_time: Option<i64>,
    pub page: Page,
}
