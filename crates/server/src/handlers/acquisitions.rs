#![forbid(unsafe_code)]

use super::{
    JsonBody, PageQuery, QueryParams, acquisition_status, body, created, page, params,
};
use crate::error::ApiResult;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use temdb_storage::{
    AcquisitionRow, CreateAcquisitionRequest, ListAcquisitionsRequest, UpdateAcquisitionRequest,
};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AcquisitionFilter {
    roi_id: Option<String>,
    acquisition_task_id: Option<String>,
    specimen_id: Option<String>,
    status: Option<String>,
}

pub(crate) async fn create(
    State(state): State<AppState>,
    payload: JsonBody<CreateAcquisitionRequest>,
) -> ApiResult<(StatusCode, Json<AcquisitionRow>)> {
    let request = body(payload)?;
    Ok(created(state.store()?.create_acquisition(request)?))
}

pub(crate) async fn list(
    State(state): State<AppState>,
    paging: QueryParams<PageQuery>,
    filter: QueryParams<AcquisitionFilter>,
) -> ApiResult<Json<Vec<AcquisitionRow>>> {
    let page = page(&state, paging)?;
    let filter = params(filter)?;
    let status = acquisition_status(filter.status.as_deref())?;
    let rows = state.store()?.list_acquisitions(&ListAcquisitionsRequest {
        roi_id: filter.roi_id,
        acquisition_task_id: filter.acquisition_task_id,
        specimen_id: filter.specimen_id,
        status,
        page,
    })?;
    Ok(Json(rows))
}

pub(crate) async fn get(
    State(state): State<AppState>,
    Path(acquisition_id): Path<String>,
) -> ApiResult<Json<AcquisitionRow>> {
    Ok(Json(state.store()?.get_acquisition(&acquisition_id)?))
}

pub(crate) async fn update(
    State(state): State<AppState>,
    Path(acquisition_id): Path<String>,
    payload: JsonBody<UpdateAcquisitionRequest>,
) -> ApiResult<Json<AcquisitionRow>> {
    let request = body(payload)?;
    Ok(Json(
        state
            .store()?
            .update_acquisition(&acquisition_id, request)?,
    ))
}

pub(crate) async fn delete(
    State(state): State<AppState>,
    Path(acquisition_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.store()?.delete_acquisition(&acquisition_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn versions(
    State(state): State<AppState>,
    Path(acquisition_id): Path<String>,
) -> ApiResult<Json<Vec<AcquisitionRow>>> {
    Ok(Json(state.store()?.acquisition_versions(&acquisition_id)?))
}
