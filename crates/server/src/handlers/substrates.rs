#![forbid(unsafe_code)]

use super::{JsonBody, PageQuery, QueryParams, body, created, page, params};
use crate::error::ApiResult;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use temdb_storage::{
    CreateSubstrateRequest, ListSubstratesRequest, SubstrateRow, UpdateSubstrateRequest,
};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SubstrateFilter {
    media_type: Option<String>,
    status: Option<String>,
}

pub(crate) async fn create(
    State(state): State<AppState>,
    payload: JsonBody<CreateSubstrateRequest>,
) -> ApiResult<(StatusCode, Json<SubstrateRow>)> {
    let request = body(payload)?;
    Ok(created(state.store()?.create_substrate(request)?))
}

pub(crate) async fn list(
    State(state): State<AppState>,
    paging: QueryParams<PageQuery>,
    filter: QueryParams<SubstrateFilter>,
) -> ApiResult<Json<Vec<SubstrateRow>>> {
    let page = page(&state, paging)?;
    let filter = params(filter)?;
    let rows = state.store()?.list_substrates(&ListSubstratesRequest {
        media_type: filter.media_type,
        status: filter.status,
        page,
    })?;
    Ok(Json(rows))
}

pub(crate) async fn get(
    State(state): State<AppState>,
    Path(media_id): Path<String>,
) -> ApiResult<Json<SubstrateRow>> {
    Ok(Json(state.store()?.get_substrate(&media_id)?))
}

pub(crate) async fn update(
    State(state): State<AppState>,
    Path(media_id): Path<String>,
    payload: JsonBody<UpdateSubstrateRequest>,
) -> ApiResult<Json<SubstrateRow>> {
    let request = body(payload)?;
    Ok(Json(state.store()?.update_substrate(&media_id, request)?))
}

pub(crate) async fn delete(
    State(state): State<AppState>,
    Path(media_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.store()?.delete_substrate(&media_id)?;
    Ok(StatusCode::NO_CONTENT)
}
