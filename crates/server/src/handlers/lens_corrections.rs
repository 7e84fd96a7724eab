#![forbid(unsafe_code)]

use super::{PageQuery, QueryParams, page, params, timestamp};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use temdb_storage::{AcquisitionPage, AcquisitionRow, ListLensCorrectionsRequest};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LensCorrectionFilter {
    scope_id: Option<String>,
    magnification: Option<u32>,
    from_time: Option<String>,
    to_time: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ScopeQuery {
    scope_id: Option<String>,
    magnification: Option<u32>,
}

impl ScopeQuery {
    fn scope_id(&self) -> ApiResult<&str> {
        self.scope_id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ApiError::validation("scope_id is required"))
    }
}

pub(crate) async fn list(
    State(state): State<AppState>,
    paging: QueryParams<PageQuery>,
    filter: QueryParams<LensCorrectionFilter>,
) -> ApiResult<Json<AcquisitionPage>> {
    let page = page(&state, paging)?;
    let filter = params(filter)?;
    let request = ListLensCorrectionsRequest {
        scope_id: filter.scope_id,
        magnification: filter.magnification,
        from_time: timestamp("from_time", filter.from_time.as_deref())?,
        to_time: timestamp("to_time", filter.to_time.as_deref())?,
        page,
    };
    Ok(Json(state.store()?.list_lens_corrections(&request)?))
}

pub(crate) async fn current(
    State(state): State<AppState>,
    query: QueryParams<ScopeQuery>,
) -> ApiResult<Json<AcquisitionRow>> {
    let query = params(query)?;
    let scope_id = query.scope_id()?;
    let magnification = query
        .magnification
        .ok_or_else(|| ApiError::validation("magnification is required"))?;
    Ok(Json(
        state
            .store()?
            .current_lens_correction(scope_id, magnification)?,
    ))
}

pub(crate) async fn latest(
    State(state): State<AppState>,
    query: QueryParams<ScopeQuery>,
) -> ApiResult<Json<AcquisitionRow>> {
    let query = params(query)?;
    let scope_id = query.scope_id()?;
    Ok(Json(state.store()?.latest_lens_correction(scope_id)?))
}

pub(crate) async fn orphans(
    State(state): State<AppState>,
    paging: QueryParams<PageQuery>,
    query: QueryParams<ScopeQuery>,
) -> ApiResult<Json<AcquisitionPage>> {
    let page = page(&state, paging)?;
    let query = params(query)?;
    Ok(Json(
        state
            .store()?
            .orphan_acquisitions(query.scope_id.as_deref(), page)?,
    ))
}

pub(crate) async fn acquisitions(
    State(state): State<AppState>,
    Path(acquisition_id): Path<String>,
    paging: QueryParams<PageQuery>,
) -> ApiResult<Json<AcquisitionPage>> {
    let page = page(&state, paging)?;
    Ok(Json(
        state
            .store()?
            .acquisitions_by_lens_correction(&acquisition_id, page)?,
    ))
}
