#![forbid(unsafe_code)]

use super::{JsonBody, PageQuery, QueryParams, body, created, page, params};
use crate::error::ApiResult;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use temdb_storage::{
    CreateCuttingSessionRequest, CuttingSessionRow, ListCuttingSessionsRequest,
    ListSectionsRequest, SectionRow, UpdateCuttingSessionRequest,
};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CuttingSessionFilter {
    specimen_id: Option<String>,
    block_id: Option<String>,
}

pub(crate) async fn create(
    State(state): State<AppState>,
    payload: JsonBody<CreateCuttingSessionRequest>,
) -> ApiResult<(StatusCode, Json<CuttingSessionRow>)> {
    let request = body(payload)?;
    Ok(created(state.store()?.create_cutting_session(request)?))
}

pub(crate) async fn list(
    State(state): State<AppState>,
    paging: QueryParams<PageQuery>,
    filter: QueryParams<CuttingSessionFilter>,
) -> ApiResult<Json<Vec<CuttingSessionRow>>> {
    let page = page(&state, paging)?;
    let filter = params(filter)?;
    let rows = state
        .store()?
        .list_cutting_sessions(&ListCuttingSessionsRequest {
            specimen_id: filter.specimen_id,
            block_id: filter.block_id,
            page,
        })?;
    Ok(Json(rows))
}

pub(crate) async fn get(
    State(state): State<AppState>,
    Path(cutting_session_id): Path<String>,
) -> ApiResult<Json<CuttingSessionRow>> {
    Ok(Json(state.store()?.get_cutting_session(&cutting_session_id)?))
}

pub(crate) async fn update(
    State(state): State<AppState>,
    Path(cutting_session_id): Path<String>,
    payload: JsonBody<UpdateCuttingSessionRequest>,
) -> ApiResult<Json<CuttingSessionRow>> {
    let request = body(payload)?;
    Ok(Json(
        state
            .store()?
            .update_cutting_session(&cutting_session_id, request)?,
    ))
}

pub(crate) async fn delete(
    State(state): State<AppState>,
    Path(cutting_session_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.store()?.delete_cutting_session(&cutting_session_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn sections(
    State(state): State<AppState>,
    Path(cutting_session_id): Path<String>,
    paging: QueryParams<PageQuery>,
) -> ApiResult<Json<Vec<SectionRow>>> {
    let page = page(&state, paging)?;
    let store = state.store()?;
    store.get_cutting_session(&cutting_session_id)?;
    let rows = store.list_sections(&ListSectionsRequest {
        cutting_session_id: Some(cutting_session_id),
        page,
        ..ListSectionsRequest::default()
    })?;
    Ok(Json(rows))
}
