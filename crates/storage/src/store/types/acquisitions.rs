#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use serde_json::Value;
use temdb_core::model::AcquisitionStatus;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionRow {
    #[serde(skip)]
    pub id: i64,
    #[serde(skip)]
    pub task_ref: i64,
    #[serde(skip)]
    pub roi_ref: i64,
    pub acquisition_id: String,
    pub montage_id: String,
    pub specimen_id: String,
    pub roi_id: String,
    pub acquisition_task_id: String,
    pub status: AcquisitionStatus,
    pub version: i64,
    pub replaces_acquisition_id: Option<String>,
    pub lens_correction: bool,
    pub lens_correction_acquisition_id: Option<String>,
    pub scope_id: String,
    pub magnification: u32,
    pub tilt_angle: Option<f64>,
    pub montage_set_name: Option<String>,
    #[serde(with = "crate::store::timestamp")]
    pub start_time: i64,
    #[serde(with = "crate::store::timestamp::option")]
    pub end_time: Option<i64>,
    pub hardware_settings: Option<Value>,
    pub acquisition_settings: Option<Value>,
    #[serde(with = "crate::store::timestamp")]
    pub created_at: i64,
    #[serde(with = "crate::store::timestamp")]
    pub updated_at: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileRow {
    #[serde(skip)]
    pub id: i64,
    #[serde(skip)]
    pub acquisition_ref: i64,
    pub tile_id: String,
    pub acquisition_id: String,
    pub roi_id: String,
    pub specimen_id: String,
    pub raster_index: u32,
    pub stage_x: f64,
    pub stage_y: f64,
    pub raster_row: u32,
    pub raster_col: u32,
    pub focus_score: Option<f64>,
    pub image_path: String,
    pub supertile_id: Option<String>,
    #[serde(with = "crate::store::timestamp")]
    pub created_at: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TileFocusScore {
    pub tile_id: String,
    pub raster_index: u32,
    pub focus_score: Option<f64>,
}

/// Per-tile focus scores of one acquisition in raster order.
///
/// Summary fields cover tiles that carry a score and are `None` when none do.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AcquisitionFocusScores {
    pub acquisition_id: String,
    pub tile_count: u64,
    pub focus_scores: Vec<TileFocusScore>,
    pub mean_focus: Option<f64>,
    pub median_focus: Option<f64>,
    pub stddev_focus: Option<f64>,
    pub min_focus: Option<f64>,
    pub max_focus: Option<f64>,
}

/// One page of acquisitions plus the size of the whole filtered set.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AcquisitionPage {
    pub acquisitions: Vec<AcquisitionRow>,
    pub total: u64,
}
