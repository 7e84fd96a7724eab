#![forbid(unsafe_code)]

use crate::error::ApiResult;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use temdb_storage::IntegrityReport;

pub(crate) async fn integrity(State(state): State<AppState>) -> ApiResult<Json<IntegrityReport>> {
    Ok(Json(state.store()?.integrity_report()?))
}
