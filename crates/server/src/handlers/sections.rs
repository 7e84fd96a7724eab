#![forbid(unsafe_code)]

use super::{JsonBody, PageQuery, QueryParams, body, created, page, params};
use crate::error::ApiResult;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use temdb_storage::{
    CreateSectionRequest, ListSectionsRequest, RoiRow, SectionRow, UpdateSectionRequest,
};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SectionFilter {
    cutting_session_id: Option<String>,
    media_id: Option<String>,
    specimen_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SectionBatch {
    List(Vec<CreateSectionRequest>),
    Wrapped { sections: Vec<CreateSectionRequest> },
}

pub(crate) async fn create(
    State(state): State<AppState>,
    payload: JsonBody<CreateSectionRequest>,
) -> ApiResult<(StatusCode, Json<SectionRow>)> {
    let request = body(payload)?;
    Ok(created(state.store()?.create_section(request)?))
}

pub(crate) async fn create_batch(
    State(state): State<AppState>,
    payload: JsonBody<SectionBatch>,
) -> ApiResult<(StatusCode, Json<Vec<SectionRow>>)> {
    let requests = match body(payload)? {
        SectionBatch::List(requests) | SectionBatch::Wrapped { sections: requests } => requests,
    };
    Ok(created(state.store()?.create_sections_batch(requests)?))
}

pub(crate) async fn list(
    State(state): State<AppState>,
    paging: QueryParams<PageQuery>,
    filter: QueryParams<SectionFilter>,
) -> ApiResult<Json<Vec<SectionRow>>> {
    let page = page(&state, paging)?;
    let filter = params(filter)?;
    let rows = state.store()?.list_sections(&ListSectionsRequest {
        cutting_session_id: filter.cutting_session_id,
        media_id: filter.media_id,
        specimen_id: filter.specimen_id,
        page,
    })?;
    Ok(Json(rows))
}

pub(crate) async fn get(
    State(state): State<AppState>,
    Path(section_id): Path<String>,
) -> ApiResult<Json<SectionRow>> {
    Ok(Json(state.store()?.get_section(&section_id)?))
}

pub(crate) async fn update(
    State(state): State<AppState>,
    Path(section_id): Path<String>,
    payload: JsonBody<UpdateSectionRequest>,
) -> ApiResult<Json<SectionRow>> {
    let request = body(payload)?;
    Ok(Json(state.store()?.update_section(&section_id, request)?))
}

pub(crate) async fn delete(
    State(state): State<AppState>,
    Path(section_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.store()?.delete_section(&section_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn rois(
    State(state): State<AppState>,
    Path(section_id): Path<String>,
    paging: QueryParams<PageQuery>,
) -> ApiResult<Json<Vec<RoiRow>>> {
    let page = page(&state, paging)?;
    Ok(Json(state.store()?.list_section_rois(&section_id, page)?))
}
