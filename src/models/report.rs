// src/models/report.rs

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{models::candidate::CandidateRecord, scoring::SubjectTally};

/// Result of one submission: the stored record plus comparative statistics.
/// Absent ranks and averages serialize as `null`.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreReport {
    #[serde(flatten)]
    pub record: CandidateRecord,

    #[serde(rename = "Overall Rank")]
    pub overall_rank: Option<usize>,

    #[serde(rename = "Category Rank")]
    pub category_rank: Option<usize>,

    #[serde(rename = "Average Marks for Shift")]
    pub shift_average: Option<f64>,

    #[serde(rename = "Shift Rank")]
    pub shift_rank: Option<usize>,

    #[serde(rename = "Overall Average Marks")]
    pub overall_average: f64,

    /// Mean marks of the candidate's category.
    #[serde(rename = "Category Averages")]
    pub category_average: Option<f64>,

    /// Counts scraped in this submission, one entry per subject block.
    /// `None` when the stored row was kept, since the table has no
    /// per-subject columns to report from.
    #[serde(rename = "Subjects")]
    pub subjects: Option<Vec<SubjectTally>>,

    /// False when the roll number was already stored and this report
    /// reflects the original row.
    #[serde(rename = "Newly Recorded")]
    pub newly_recorded: bool,

    #[serde(rename = "Generated At")]
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

/// One row of the public leaderboard.
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub roll_number: String,
    pub candidate_name: String,
    pub category: String,
    pub total_marks: f64,
}

/// Aggregate statistics over the whole table.
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub candidates: usize,
    pub overall_average: f64,
    pub category_averages: BTreeMap<String, f64>,
    pub shift_averages: BTreeMap<String, f64>,
}
