#![forbid(unsafe_code)]

use super::{JsonBody, PageQuery, QueryParams, body, created, page, params};
use crate::error::ApiResult;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use temdb_storage::{
    BlockRow, CreateBlockRequest, CuttingSessionRow, ListBlocksRequest,
    ListCuttingSessionsRequest, UpdateBlockRequest,
};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct BlockFilter {
    specimen_id: Option<String>,
}

pub(crate) async fn create(
    State(state): State<AppState>,
    payload: JsonBody<CreateBlockRequest>,
) -> ApiResult<(StatusCode, Json<BlockRow>)> {
    let request = body(payload)?;
    Ok(created(state.store()?.create_block(request)?))
}

pub(crate) async fn list(
    State(state): State<AppState>,
    paging: QueryParams<PageQuery>,
    filter: QueryParams<BlockFilter>,
) -> ApiResult<Json<Vec<BlockRow>>> {
    let page = page(&state, paging)?;
    let filter = params(filter)?;
    let rows = state.store()?.list_blocks(&ListBlocksRequest {
        specimen_id: filter.specimen_id,
        page,
    })?;
    Ok(Json(rows))
}

pub(crate) async fn get(
    State(state): State<AppState>,
    Path((specimen_id, block_id)): Path<(String, String)>,
) -> ApiResult<Json<BlockRow>> {
    Ok(Json(state.store()?.get_block(&specimen_id, &block_id)?))
}

pub(crate) async fn update(
    State(state): State<AppState>,
    Path((specimen_id, block_id)): Path<(String, String)>,
    payload: JsonBody<UpdateBlockRequest>,
) -> ApiResult<Json<BlockRow>> {
    let request = body(payload)?;
    Ok(Json(
        state
            .store()?
            .update_block(&specimen_id, &block_id, request)?,
    ))
}

pub(crate) async fn delete(
    State(state): State<AppState>,
    Path((specimen_id, block_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state.store()?.delete_block(&specimen_id, &block_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn cutting_sessions(
    State(state): State<AppState>,
    Path((specimen_id, block_id)): Path<(String, String)>,
    paging: QueryParams<PageQuery>,
) -> ApiResult<Json<Vec<CuttingSessionRow>>> {
    let page = page(&state, paging)?;
    let store = state.store()?;
    store.get_block(&specimen_id, &block_id)?;
    let rows = store.list_cutting_sessions(&ListCuttingSessionsRequest {
        specimen_id: Some(specimen_id),
        block_id: Some(block_id),
        page,
    })?;
    Ok(Json(rows))
}
