// src/handlers/submission.rs

use axum::{Form, Json, extract::State, response::IntoResponse};
use validator::Validate;

use crate::{
    error::AppError, extractor, leaderboard::Leaderboard, models::candidate::SubmitRequest,
    state::AppState,
};

/// Scores an answer-key page and reports the candidate's standing.
///
/// * Fetches the submitted link (single attempt, bounded wait).
/// * Extracts identity fields and question outcomes, then computes marks.
/// * Appends the record unless the roll number is already stored.
/// * Ranks and averages are computed over the full table, new row included.
pub async fn submit_answer_key(
    State(state): State<AppState>,
    Form(req): Form<SubmitRequest>,
) -> Result<impl IntoResponse, AppError> {
    // An unusable link fails the same way an unreachable one does.
    if let Err(validation_errors) = req.validate() {
        tracing::warn!("Rejected answer key link {:?}: {}", req.answer_key_link, validation_errors);
        return Err(AppError::FetchFailed(format!(
            "Error fetching content: {}",
            validation_errors
        )));
    }
    let link = req.answer_key_link.trim().to_string();
    let category = req.category.trim().to_string();

    let markup = state.fetcher.fetch(&link).await?;

    let scheme = state.config.marking;
    let (record, tally) = extractor::extract(&markup, &state.layout, &scheme)
        .map_err(|e| {
            tracing::warn!("Rejected page from {}: {}", link, e);
            e
        })?
        .into_record(&link, &category, &scheme);

    let table = state.table.clone();
    let report = tokio::task::spawn_blocking(move || {
        let board = Leaderboard::new(table.as_ref());
        let (stored, newly_recorded) = board.upsert(record)?;
        board.report(stored, newly_recorded, tally)
    })
    .await??;

    tracing::info!(
        roll_number = %report.record.roll_number,
        total_marks = report.record.total_marks,
        overall_rank = ?report.overall_rank,
        "Submission scored"
    );

    Ok(Json(report))
}
