#![forbid(unsafe_code)]

use temdb_core::hierarchy::EntityKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("sqlite: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{entity} '{key}' not found")]
    NotFound { entity: EntityKind, key: String },
    #[error("{0}")]
    InconsistentHierarchy(String),
    #[error("{entity} '{key}' already exists")]
    Conflict { entity: EntityKind, key: String },
    #[error("Cannot delete {entity} '{key}' as it has {count} {dependent}")]
    ResourceInUse {
        entity: EntityKind,
        key: String,
        dependent_kind: EntityKind,
        dependent: &'static str,
        count: u64,
    },
    #[error("{0}")]
    InvalidReference(String),
    #[error("{0}")]
    LensCorrectionNotFound(String),
    #[error("{source} for batch item {index}")]
    BatchItem {
        index: usize,
        #[source]
        source: Box<StoreError>,
    },
}

impl StoreError {
    pub(crate) fn not_found(entity: EntityKind, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// The error a batch item failed with, or `self` outside a batch.
    pub fn innermost(&self) -> &StoreError {
        match self {
            Self::BatchItem { source, .. } => source.innermost(),
            other => other,
        }
    }

    /// Infrastructure failures, as opposed to rejected requests.
    pub fn is_internal(&self) -> bool {
        matches!(
            self.innermost(),
            Self::Io(_) | Self::Sql(_) | Self::Json(_)
        )
    }
}
