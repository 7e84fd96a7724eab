#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoiRow {
    #[serde(skip)]
    pub id: i64,
    #[serde(skip)]
    pub section_ref: i64,
    #[serde(skip)]
    pub parent_roi_ref: Option<i64>,
    pub roi_id: String,
    pub roi_number: u32,
    pub hierarchy_level: u32,
    pub parent_roi_id: Option<String>,
    pub section_id: String,
    pub block_id: String,
    pub specimen_id: String,
    pub substrate_media_id: String,
    pub description: Option<String>,
    pub aperture_width_height_mm: Option<[f64; 2]>,
    pub aperture_centroid: Option<[f64; 2]>,
    pub aperture_image: Option<String>,
    pub optical_nm_per_pixel: Option<f64>,
    pub barcode: Option<String>,
    pub metadata: Option<Value>,
    #[serde(with = "crate::store::timestamp")]
    pub created_at: i64,
    #[serde(with = "crate::store::timestamp")]
    pub updated_at: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RoiChildrenPage {
    pub children: Vec<RoiRow>,
    pub metadata: PageMetadata,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PageMetadata {
    pub skip: usize,
    pub limit: usize,
    pub total_children: u64,
    pub has_more: bool,
}
