#![forbid(unsafe_code)]

use super::{JsonBody, PageQuery, QueryParams, body, created, page};
use crate::error::ApiResult;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use temdb_storage::{AcquisitionFocusScores, CreateTileRequest, TileRow};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum TileBatch {
    List(Vec<CreateTileRequest>),
    Wrapped { tiles: Vec<CreateTileRequest> },
}

#[derive(Debug, Serialize)]
pub(crate) struct TileCount {
    acquisition_id: String,
    count: u64,
}

pub(crate) async fn add(
    State(state): State<AppState>,
    Path(acquisition_id): Path<String>,
    payload: JsonBody<CreateTileRequest>,
) -> ApiResult<(StatusCode, Json<TileRow>)> {
    let request = body(payload)?;
    Ok(created(state.store()?.add_tile(&acquisition_id, request)?))
}

pub(crate) async fn add_batch(
    State(state): State<AppState>,
    Path(acquisition_id): Path<String>,
    payload: JsonBody<TileBatch>,
) -> ApiResult<(StatusCode, Json<Vec<TileRow>>)> {
    let requests = match body(payload)? {
        TileBatch::List(requests) | TileBatch::Wrapped { tiles: requests } => requests,
    };
    Ok(created(
        state.store()?.add_tiles_batch(&acquisition_id, requests)?,
    ))
}

pub(crate) async fn list(
    State(state): State<AppState>,
    Path(acquisition_id): Path<String>,
    paging: QueryParams<PageQuery>,
) -> ApiResult<Json<Vec<TileRow>>> {
    let page = page(&state, paging)?;
    Ok(Json(state.store()?.list_tiles(&acquisition_id, page)?))
}

pub(crate) async fn count(
    State(state): State<AppState>,
    Path(acquisition_id): Path<String>,
) -> ApiResult<Json<TileCount>> {
    let count = state.store()?.tile_count(&acquisition_id)?;
    Ok(Json(TileCount {
        acquisition_id,
        count,
    }))
}

pub(crate) async fn get(
    State(state): State<AppState>,
    Path((acquisition_id, tile_id)): Path<(String, String)>,
) -> ApiResult<Json<TileRow>> {
    Ok(Json(state.store()?.get_tile(&acquisition_id, &tile_id)?))
}

pub(crate) async fn delete(
    State(state): State<AppState>,
    Path((acquisition_id, tile_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state.store()?.delete_tile(&acquisition_id, &tile_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn focus_scores(
    State(state): State<AppState>,
    Path(acquisition_id): Path<String>,
) -> ApiResult<Json<AcquisitionFocusScores>> {
    Ok(Json(
        state.store()?.acquisition_focus_scores(&acquisition_id)?,
    ))
}
