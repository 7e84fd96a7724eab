#![forbid(unsafe_code)]

use super::{JsonBody, PageQuery, QueryParams, body, created, page, params};
use crate::error::ApiResult;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use temdb_storage::{
    CreateRoiRequest, ListRoisRequest, RoiChildrenPage, RoiRow, UpdateRoiRequest,
};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RoiFilter {
    specimen_id: Option<String>,
    block_id: Option<String>,
    section_id: Option<String>,
    parent_roi_id: Option<String>,
    #[serde(default)]
    top_level_only: bool,
}

/// A bare array, or the same array under `rois`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RoiBatch {
    List(Vec<CreateRoiRequest>),
    Wrapped { rois: Vec<CreateRoiRequest> },
}

pub(crate) async fn create(
    State(state): State<AppState>,
    payload: JsonBody<CreateRoiRequest>,
) -> ApiResult<(StatusCode, Json<RoiRow>)> {
    let request = body(payload)?;
    Ok(created(state.store()?.create_roi(request)?))
}

pub(crate) async fn create_batch(
    State(state): State<AppState>,
    payload: JsonBody<RoiBatch>,
) -> ApiResult<(StatusCode, Json<Vec<RoiRow>>)> {
    let requests = match body(payload)? {
        RoiBatch::List(requests) | RoiBatch::Wrapped { rois: requests } => requests,
    };
    Ok(created(state.store()?.create_rois_batch(requests)?))
}

pub(crate) async fn list(
    State(state): State<AppState>,
    paging: QueryParams<PageQuery>,
    filter: QueryParams<RoiFilter>,
) -> ApiResult<Json<Vec<RoiRow>>> {
    let page = page(&state, paging)?;
    let filter = params(filter)?;
    let rows = state.store()?.list_rois(&ListRoisRequest {
        specimen_id: filter.specimen_id,
        block_id: filter.block_id,
        section_id: filter.section_id,
        parent_roi_id: filter.parent_roi_id,
        top_level_only: filter.top_level_only,
        page,
    })?;
    Ok(Json(rows))
}

pub(crate) async fn get(
    State(state): State<AppState>,
    Path(roi_id): Path<String>,
) -> ApiResult<Json<RoiRow>> {
    Ok(Json(state.store()?.get_roi(&roi_id)?))
}

pub(crate) async fn update(
    State(state): State<AppState>,
    Path(roi_id): Path<String>,
    payload: JsonBody<UpdateRoiRequest>,
) -> ApiResult<Json<RoiRow>> {
    let request = body(payload)?;
    Ok(Json(state.store()?.update_roi(&roi_id, request)?))
}

pub(crate) async fn delete(
    State(state): State<AppState>,
    Path(roi_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.store()?.delete_roi(&roi_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn children(
    State(state): State<AppState>,
    Path(roi_id): Path<String>,
    paging: QueryParams<PageQuery>,
) -> ApiResult<Json<RoiChildrenPage>> {
    let page = page(&state, paging)?;
    Ok(Json(state.store()?.roi_children(&roi_id, page)?))
}

pub(crate) async fn hierarchy(
    State(state): State<AppState>,
    Path(roi_id): Path<String>,
) -> ApiResult<Json<Vec<RoiRow>>> {
    Ok(Json(state.store()?.roi_hierarchy(&roi_id)?))
}
