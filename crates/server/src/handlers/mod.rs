#![forbid(unsafe_code)]

pub(crate) mod acquisitions;
pub(crate) mod admin;
pub(crate) mod blocks;
pub(crate) mod cutting_sessions;
pub(crate) mod lens_corrections;
pub(crate) mod rois;
pub(crate) mod sections;
pub(crate) mod specimens;
pub(crate) mod substrates;
pub(crate) mod tasks;
pub(crate) mod tiles;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use temdb_core::model::{AcquisitionStatus, TaskStatus};
use temdb_storage::{Page, parse_rfc3339};

pub(crate) type JsonBody<T> = Result<Json<T>, JsonRejection>;
pub(crate) type QueryParams<T> = Result<Query<T>, QueryRejection>;

/// `skip` / `limit` of list endpoints. Read alongside each endpoint's filters.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageQuery {
    skip: Option<usize>,
    limit: Option<usize>,
}

pub(crate) fn body<T>(payload: JsonBody<T>) -> ApiResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::validation(rejection.body_text()))
}

pub(crate) fn params<T>(query: QueryParams<T>) -> ApiResult<T> {
    query
        .map(|Query(value)| value)
        .map_err(|rejection| ApiError::validation(rejection.body_text()))
}

pub(crate) fn page(state: &AppState, query: QueryParams<PageQuery>) -> ApiResult<Page> {
    let query = params(query)?;
    state.page(query.skip, query.limit)
}

pub(crate) fn created<T>(value: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(value))
}

pub(crate) fn task_status(value: Option<&str>) -> ApiResult<Option<TaskStatus>> {
    value
        .map(|value| {
            TaskStatus::parse(value)
                .ok_or_else(|| ApiError::validation(format!("unknown task status '{value}'")))
        })
        .transpose()
}

pub(crate) fn acquisition_status(value: Option<&str>) -> ApiResult<Option<AcquisitionStatus>> {
    value
        .map(|value| {
            AcquisitionStatus::parse(value).ok_or_else(|| {
                ApiError::validation(format!("unknown acquisition status '{value}'"))
            })
        })
        .transpose()
}

pub(crate) fn timestamp(field: &str, value: Option<&str>) -> ApiResult<Option<i64>> {
    value
        .map(|value| {
            parse_rfc3339(value)
                .map_err(|_| ApiError::validation(format!("{field} must be an RFC 3339 timestamp")))
        })
        .transpose()
}

pub(crate) async fn health(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    state.store()?.ping()?;
    Ok(Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}
