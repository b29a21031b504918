// src/handlers/leaderboard.rs

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{
    error::AppError,
    leaderboard::{self, Leaderboard},
    models::report::StatsResponse,
    state::SharedTable,
    storage::StorageError,
};

const DEFAULT_LIMIT: usize = 10;
const MAX_LIMIT: usize = 100;

/// Query parameters for the leaderboard.
#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    pub limit: Option<usize>,
}

/// Lists the highest-scoring candidates, best first.
pub async fn get_leaderboard(
    State(table): State<SharedTable>,
    Query(params): Query<LeaderboardParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let entries =
        tokio::task::spawn_blocking(move || Leaderboard::new(table.as_ref()).top(limit))
            .await??;

    Ok(Json(entries))
}

/// Overall, per-category and per-shift averages.
pub async fn get_stats(State(table): State<SharedTable>) -> Result<impl IntoResponse, AppError> {
    let stats = tokio::task::spawn_blocking(move || -> Result<StatsResponse, StorageError> {
        let rows = table.read_all()?;
        let overall = leaderboard::overall_stats(&rows);
        let shifts = leaderboard::shift_stats(&rows);
        Ok(StatsResponse {
            candidates: rows.len(),
            overall_average: overall.average,
            category_averages: overall.category_averages,
            shift_averages: shifts.averages,
        })
    })
    .await??;

    Ok(Json(stats))
}
