#![forbid(unsafe_code)]

use crate::config::ServerConfig;
use crate::error::{ApiError, ApiResult};
use std::sync::{Arc, Mutex, MutexGuard};
use temdb_storage::{Page, SqliteStore};

/// Shared by every handler. Store work is synchronous and serialized by the
/// mutex; guards must not live across an `.await`.
#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<SqliteStore>>,
    default_page_limit: usize,
    max_page_limit: usize,
}

impl AppState {
    pub fn new(store: SqliteStore, config: &ServerConfig) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            default_page_limit: config.default_page_limit,
            max_page_limit: config.max_page_limit,
        }
    }

    pub fn store(&self) -> ApiResult<MutexGuard<'_, SqliteStore>> {
        self.store.lock().map_err(|_| ApiError::LockPoisoned)
    }

    /// `skip` defaults to 0; `limit` to the configured default and must stay
    /// within `1..=max_page_limit`.
    pub fn page(&self, skip: Option<usize>, limit: Option<usize>) -> ApiResult<Page> {
        let limit = limit.unwrap_or(self.default_page_limit);
        if limit == 0 || limit > self.max_page_limit {
            return Err(ApiError::validation(format!(
                "limit must be between 1 and {}",
                self.max_page_limit
            )));
        }
        Ok(Page {
            limit,
            offset: skip.unwrap_or(0),
        })
    }
}
