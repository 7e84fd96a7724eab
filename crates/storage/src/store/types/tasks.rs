#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use serde_json::Value;
use temdb_core::model::TaskStatus;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionTaskRow {
    #[serde(skip)]
    pub id: i64,
    #[serde(skip)]
    pub roi_ref: i64,
    pub task_id: String,
    pub specimen_id: String,
    pub block_id: String,
    pub roi_id: String,
    pub task_type: String,
    pub version: i64,
    pub status: TaskStatus,
    pub tags: Vec<String>,
    pub metadata: Option<Value>,
    pub error_message: Option<String>,
    #[serde(with = "crate::store::timestamp::option")]
    pub started_at: Option<i64>,
    #[serde(with = "crate::store::timestamp::option")]
    pub completed_at: Option<i64>,
    #[serde(with = "crate::store::timestamp")]
    pub created_at: i64,
    #[serde(with = "crate::store::timestamp")]
    pub updated_at: i64,
}

/// A superseded state of a task, kept when an update bumps its version.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TaskVersionRow {
    pub task_id: String,
    pub version: i64,
    #[serde(with = "crate::store::timestamp")]
    pub recorded_at: i64,
    pub snapshot: AcquisitionTaskRow,
}
