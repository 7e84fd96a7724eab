#![forbid(unsafe_code)]

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use temdb_storage::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Malformed request body or query, and out-of-range paging.
    #[error("{0}")]
    Validation(String),
    #[error("store lock poisoned")]
    LockPoisoned,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::LockPoisoned => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Store(err) => match err.innermost() {
                StoreError::NotFound { .. } | StoreError::LensCorrectionNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                StoreError::Conflict { .. } => StatusCode::CONFLICT,
                StoreError::InconsistentHierarchy(_)
                | StoreError::ResourceInUse { .. }
                | StoreError::InvalidInput(_)
                | StoreError::InvalidReference(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::LockPoisoned => "INTERNAL_SERVER_ERROR",
            Self::Store(err) => match err.innermost() {
                StoreError::NotFound { .. } | StoreError::LensCorrectionNotFound(_) => {
                    "RESOURCE_NOT_FOUND"
                }
                StoreError::Conflict { .. } => "DUPLICATE_RESOURCE",
                StoreError::InconsistentHierarchy(_) => "INCONSISTENT_HIERARCHY",
                StoreError::ResourceInUse { .. } => "RESOURCE_IN_USE",
                StoreError::InvalidInput(_) => "BAD_REQUEST",
                StoreError::InvalidReference(_) => "INVALID_REFERENCE",
                _ => "INTERNAL_SERVER_ERROR",
            },
        }
    }

    fn is_internal(&self) -> bool {
        match self {
            Self::Store(err) => err.is_internal(),
            Self::Validation(_) => false,
            Self::LockPoisoned => true,
        }
    }

    fn context(&self) -> Option<Value> {
        let Self::Store(err) = self else {
            return None;
        };
        let mut context = match err.innermost() {
            StoreError::NotFound { entity, key } => json!({
                "resource": entity.label(),
                "key": key,
            }),
            StoreError::Conflict { entity, key } => json!({
                "resource": entity.label(),
                "key": key,
            }),
            StoreError::ResourceInUse {
                entity,
                key,
                dependent,
                count,
                ..
            } => json!({
                "resource": entity.label(),
                "key": key,
                "dependent": dependent,
                "count": count,
            }),
            _ => json!({}),
        };
        if let StoreError::BatchItem { index, .. } = err
            && let Some(object) = context.as_object_mut()
        {
            object.insert("batch_index".to_string(), json!(index));
        }
        context
            .as_object()
            .is_some_and(|object| !object.is_empty())
            .then_some(context)
    }

    fn detail(&self) -> String {
        match self {
            Self::Store(err) => store_detail(err),
            other => other.to_string(),
        }
    }

    /// The JSON error body. Internal failures carry a generic message only.
    pub fn body(&self) -> Value {
        if self.is_internal() {
            return json!({
                "detail": "Internal server error",
                "error_code": "INTERNAL_SERVER_ERROR",
            });
        }
        let mut body = json!({
            "detail": self.detail(),
            "error_code": self.error_code(),
        });
        if let (Some(context), Some(object)) = (self.context(), body.as_object_mut()) {
            object.insert("context".to_string(), context);
        }
        body
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.is_internal() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "request rejected");
        }
        (status, Json(self.body())).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

fn store_detail(err: &StoreError) -> String {
    match err {
        StoreError::InvalidInput(message) => message.clone(),
        StoreError::BatchItem { index, source } => {
            format!("{} for batch item {index}", store_detail(source))
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use temdb_core::hierarchy::EntityKind;

    fn store(err: StoreError) -> ApiError {
        ApiError::Store(err)
    }

    #[test]
    fn every_store_error_has_a_status() {
        let cases = [
            (
                store(StoreError::NotFound {
                    entity: EntityKind::Roi,
                    key: "R".to_string(),
                }),
                StatusCode::NOT_FOUND,
                "RESOURCE_NOT_FOUND",
            ),
            (
                store(StoreError::LensCorrectionNotFound("none".to_string())),
                StatusCode::NOT_FOUND,
                "RESOURCE_NOT_FOUND",
            ),
            (
                store(StoreError::InconsistentHierarchy("mismatch".to_string())),
                StatusCode::BAD_REQUEST,
                "INCONSISTENT_HIERARCHY",
            ),
            (
                store(StoreError::Conflict {
                    entity: EntityKind::Section,
                    key: "S".to_string(),
                }),
                StatusCode::CONFLICT,
                "DUPLICATE_RESOURCE",
            ),
            (
                store(StoreError::InvalidInput("bad".to_string())),
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
            ),
            (
                store(StoreError::InvalidReference("bad ref".to_string())),
                StatusCode::BAD_REQUEST,
                "INVALID_REFERENCE",
            ),
            (
                ApiError::validation("limit out of range"),
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
            ),
        ];
        assert_eq!(cases[4].0.body()["detail"], "bad");
        for (err, status, code) in cases {
            assert_eq!(err.status(), status, "{err}");
            assert_eq!(err.error_code(), code, "{err}");
        }
    }

    #[test]
    fn resource_in_use_reports_dependent_and_count() {
        let err = store(StoreError::ResourceInUse {
            entity: EntityKind::Roi,
            key: "R1".to_string(),
            dependent_kind: EntityKind::Roi,
            dependent: "child ROIs",
            count: 2,
        });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        let body = err.body();
        assert_eq!(body["detail"], "Cannot delete ROI 'R1' as it has 2 child ROIs");
        assert_eq!(body["error_code"], "RESOURCE_IN_USE");
        assert_eq!(body["context"]["dependent"], "child ROIs");
        assert_eq!(body["context"]["count"], 2);
    }

    #[test]
    fn batch_items_map_through_their_cause() {
        let err = store(StoreError::BatchItem {
            index: 3,
            source: Box::new(StoreError::NotFound {
                entity: EntityKind::Section,
                key: "SEC9".to_string(),
            }),
        });
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        let body = err.body();
        assert_eq!(body["detail"], "Section 'SEC9' not found for batch item 3");
        assert_eq!(body["context"]["batch_index"], 3);

        let err = store(StoreError::BatchItem {
            index: 0,
            source: Box::new(StoreError::InvalidInput(
                "invalid roi_number: number must be greater than zero".to_string(),
            )),
        });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.body()["detail"],
            "invalid roi_number: number must be greater than zero for batch item 0"
        );
    }

    #[test]
    fn internal_errors_hide_their_cause() {
        let err = store(StoreError::Io(std::io::Error::other("disk on fire")));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = err.body();
        assert_eq!(body["detail"], "Internal server error");
        assert_eq!(body["error_code"], "INTERNAL_SERVER_ERROR");
        assert!(body.get("context").is_none());

        let body = ApiError::LockPoisoned.body();
        assert_eq!(body["detail"], "Internal server error");
    }
}
