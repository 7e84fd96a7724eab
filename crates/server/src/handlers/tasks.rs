#![forbid(unsafe_code)]

use super::{JsonBody, PageQuery, QueryParams, body, created, page, params, task_status};
use crate::error::ApiResult;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use temdb_storage::{
    AcquisitionRow, AcquisitionTaskRow, CreateAcquisitionTaskRequest, ListAcquisitionTasksRequest,
    ListAcquisitionsRequest, TaskVersionRow, UpdateAcquisitionTaskRequest,
    UpdateTaskStatusRequest,
};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TaskFilter {
    specimen_id: Option<String>,
    block_id: Option<String>,
    roi_id: Option<String>,
    status: Option<String>,
    task_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct VersionQuery {
    version: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum TaskBatch {
    List(Vec<CreateAcquisitionTaskRequest>),
    Wrapped {
        tasks: Vec<CreateAcquisitionTaskRequest>,
    },
}

pub(crate) async fn create(
    State(state): State<AppState>,
    payload: JsonBody<CreateAcquisitionTaskRequest>,
) -> ApiResult<(StatusCode, Json<AcquisitionTaskRow>)> {
    let request = body(payload)?;
    Ok(created(state.store()?.create_acquisition_task(request)?))
}

pub(crate) async fn create_batch(
    State(state): State<AppState>,
    payload: JsonBody<TaskBatch>,
) -> ApiResult<(StatusCode, Json<Vec<AcquisitionTaskRow>>)> {
    let requests = match body(payload)? {
        TaskBatch::List(requests) | TaskBatch::Wrapped { tasks: requests } => requests,
    };
    Ok(created(state.store()?.create_acquisition_tasks_batch(requests)?))
}

pub(crate) async fn list(
    State(state): State<AppState>,
    paging: QueryParams<PageQuery>,
    filter: QueryParams<TaskFilter>,
) -> ApiResult<Json<Vec<AcquisitionTaskRow>>> {
    let page = page(&state, paging)?;
    let filter = params(filter)?;
    let status = task_status(filter.status.as_deref())?;
    let rows = state
        .store()?
        .list_acquisition_tasks(&ListAcquisitionTasksRequest {
            specimen_id: filter.specimen_id,
            block_id: filter.block_id,
            roi_id: filter.roi_id,
            status,
            task_type: filter.task_type,
            page,
        })?;
    Ok(Json(rows))
}

pub(crate) async fn get(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    query: QueryParams<VersionQuery>,
) -> ApiResult<Json<AcquisitionTaskRow>> {
    let query = params(query)?;
    Ok(Json(
        state
            .store()?
            .get_acquisition_task(&task_id, query.version)?,
    ))
}

pub(crate) async fn versions(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> ApiResult<Json<Vec<TaskVersionRow>>> {
    Ok(Json(state.store()?.list_acquisition_task_versions(&task_id)?))
}

pub(crate) async fn update(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    payload: JsonBody<UpdateAcquisitionTaskRequest>,
) -> ApiResult<Json<AcquisitionTaskRow>> {
    let request = body(payload)?;
    Ok(Json(
        state
            .store()?
            .update_acquisition_task(&task_id, request)?,
    ))
}

pub(crate) async fn update_status(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    payload: JsonBody<UpdateTaskStatusRequest>,
) -> ApiResult<Json<AcquisitionTaskRow>> {
    let request = body(payload)?;
    let row = state
        .store()?
        .update_acquisition_task_status(&task_id, request)?;
    Ok(Json(row))
}

pub(crate) async fn delete(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.store()?.delete_acquisition_task(&task_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn acquisitions(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    paging: QueryParams<PageQuery>,
) -> ApiResult<Json<Vec<AcquisitionRow>>> {
    let page = page(&state, paging)?;
    let store = state.store()?;
    store.get_acquisition_task(&task_id, None)?;
    let rows = store.list_acquisitions(&ListAcquisitionsRequest {
        acquisition_task_id: Some(task_id),
        page,
        ..ListAcquisitionsRequest::default()
    })?;
    Ok(Json(rows))
}
