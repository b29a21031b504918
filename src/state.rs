// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    config::Config, extractor::CompiledLayout, storage::RecordTable, utils::fetch::PageFetcher,
};

/// Record table handle shared by all handlers.
pub type SharedTable = Arc<dyn RecordTable>;

#[derive(Clone)]
pub struct AppState {
    pub table: SharedTable,
    pub layout: Arc<CompiledLayout>,
    pub fetcher: PageFetcher,
    pub config: Config,
}

impl FromRef<AppState> for SharedTable {
    fn from_ref(state: &AppState) -> Self {
        state.table.clone()
    }
}
