#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use serde_json::Value;
use temdb_core::model::SectionQuality;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SectionRow {
    #[serde(skip)]
    pub id: i64,
    #[serde(skip)]
    pub cutting_session_ref: i64,
    #[serde(skip)]
    pub substrate_ref: i64,
    pub section_id: String,
    pub section_number: u32,
    pub cutting_session_id: String,
    pub block_id: String,
    pub specimen_id: String,
    pub media_id: String,
    pub barcode: Option<String>,
    pub quality: Option<SectionQuality>,
    pub thickness_um: Option<f64>,
    pub optical_image: Option<Value>,
    #[serde(with = "crate::store::timestamp")]
    pub cut_at: i64,
    #[serde(with = "crate::store::timestamp")]
    pub created_at: i64,
    #[serde(with = "crate::store::timestamp")]
    pub updated_at: i64,
}
