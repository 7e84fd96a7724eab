#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use serde_json::Value;
use temdb_core::model::MediaType;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpecimenRow {
    #[serde(skip)]
    pub id: i64,
    pub specimen_id: String,
    pub description: Option<String>,
    pub specimen_images: Vec<String>,
    pub functional_imaging_metadata: Option<Value>,
    #[serde(with = "crate::store::timestamp")]
    pub created_at: i64,
    #[serde(with = "crate::store::timestamp")]
    pub updated_at: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockRow {
    #[serde(skip)]
    pub id: i64,
    #[serde(skip)]
    pub specimen_ref: i64,
    pub block_id: String,
    pub specimen_id: String,
    pub description: Option<String>,
    pub microct_info: Option<Value>,
    #[serde(with = "crate::store::timestamp")]
    pub created_at: i64,
    #[serde(with = "crate::store::timestamp")]
    pub updated_at: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CuttingSessionRow {
    #[serde(skip)]
    pub id: i64,
    #[serde(skip)]
    pub block_ref: i64,
    pub cutting_session_id: String,
    pub specimen_id: String,
    pub block_id: String,
    #[serde(with = "crate::store::timestamp")]
    pub start_time: i64,
    #[serde(with = "crate::store::timestamp::option")]
    pub end_time: Option<i64>,
    pub operator: Option<String>,
    pub sectioning_device: Option<String>,
    pub media_type: MediaType,
    pub knife_id: Option<String>,
    #[serde(with = "crate::store::timestamp")]
    pub created_at: i64,
    #[serde(with = "crate::store::timestamp")]
    pub updated_at: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubstrateRow {
    #[serde(skip)]
    pub id: i64,
    pub media_id: String,
    pub media_type: String,
    pub uid: Option<String>,
    pub status: String,
    pub metadata: Option<Value>,
    #[serde(with = "crate::store::timestamp")]
    pub created_at: i64,
    #[serde(with = "crate::store::timestamp")]
    pub updated_at: i64,
}
