#![forbid(unsafe_code)]

use super::{JsonBody, PageQuery, QueryParams, body, created, page, params};
use crate::error::ApiResult;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use temdb_storage::{
    BlockRow, CreateSpecimenRequest, ListBlocksRequest, ListSpecimensRequest, SpecimenRow,
    UpdateSpecimenRequest,
};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SpecimenFilter {
    search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImageQuery {
    image_url: String,
}

pub(crate) async fn create(
    State(state): State<AppState>,
    payload: JsonBody<CreateSpecimenRequest>,
) -> ApiResult<(StatusCode, Json<SpecimenRow>)> {
    let request = body(payload)?;
    Ok(created(state.store()?.create_specimen(request)?))
}

pub(crate) async fn list(
    State(state): State<AppState>,
    paging: QueryParams<PageQuery>,
    filter: QueryParams<SpecimenFilter>,
) -> ApiResult<Json<Vec<SpecimenRow>>> {
    let page = page(&state, paging)?;
    let filter = params(filter)?;
    let rows = state.store()?.list_specimens(&ListSpecimensRequest {
        search: filter.search,
        page,
    })?;
    Ok(Json(rows))
}

pub(crate) async fn get(
    State(state): State<AppState>,
    Path(specimen_id): Path<String>,
) -> ApiResult<Json<SpecimenRow>> {
    Ok(Json(state.store()?.get_specimen(&specimen_id)?))
}

pub(crate) async fn update(
    State(state): State<AppState>,
    Path(specimen_id): Path<String>,
    payload: JsonBody<UpdateSpecimenRequest>,
) -> ApiResult<Json<SpecimenRow>> {
    let request = body(payload)?;
    Ok(Json(state.store()?.update_specimen(&specimen_id, request)?))
}

pub(crate) async fn delete(
    State(state): State<AppState>,
    Path(specimen_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.store()?.delete_specimen(&specimen_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn add_image(
    State(state): State<AppState>,
    Path(specimen_id): Path<String>,
    query: QueryParams<ImageQuery>,
) -> ApiResult<Json<SpecimenRow>> {
    let query = params(query)?;
    Ok(Json(
        state
            .store()?
            .add_specimen_image(&specimen_id, &query.image_url)?,
    ))
}

pub(crate) async fn remove_image(
    State(state): State<AppState>,
    Path(specimen_id): Path<String>,
    query: QueryParams<ImageQuery>,
) -> ApiResult<Json<SpecimenRow>> {
    let query = params(query)?;
    Ok(Json(
        state
            .store()?
            .remove_specimen_image(&specimen_id, &query.image_url)?,
    ))
}

pub(crate) async fn blocks(
    State(state): State<AppState>,
    Path(specimen_id): Path<String>,
    paging: QueryParams<PageQuery>,
) -> ApiResult<Json<Vec<BlockRow>>> {
    let page = page(&state, paging)?;
    let store = state.store()?;
    store.get_specimen(&specimen_id)?;
    let rows = store.list_blocks(&ListBlocksRequest {
        specimen_id: Some(specimen_id),
        page,
    })?;
    Ok(Json(rows))
}
