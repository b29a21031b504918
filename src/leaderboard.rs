// src/leaderboard.rs

use std::{borrow::Borrow, collections::BTreeMap};

use crate::{
    models::{
        candidate::CandidateRecord,
        report::{LeaderboardEntry, ScoreReport},
    },
    scoring::ScoreTally,
    storage::{RecordTable, StorageError},
};

/// Overall and in-category position of one candidate, 1-indexed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ranks {
    pub overall: Option<usize>,
    pub category: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShiftStats {
    /// Shift key -> mean marks in that shift.
    pub averages: BTreeMap<String, f64>,
    /// Shift key -> (roll number -> rank within the shift).
    pub ranks: BTreeMap<String, BTreeMap<String, usize>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverallStats {
    /// Zero when the table is empty.
    pub average: f64,
    pub category_averages: BTreeMap<String, f64>,
}

/// Rank and average computations over a record table.
///
/// Every query rescans the whole table; there is no incremental index.
pub struct Leaderboard<'a, T: RecordTable + ?Sized> {
    table: &'a T,
}

impl<'a, T: RecordTable + ?Sized> Leaderboard<'a, T> {
    pub fn new(table: &'a T) -> Self {
        Self { table }
    }

    pub fn exists(&self, roll_number: &str) -> Result<bool, StorageError> {
        self.table.exists(roll_number)
    }

    pub fn append(&self, record: &CandidateRecord) -> Result<(), StorageError> {
        self.table.append(record)
    }

    /// Inserts `record` unless its roll number is already stored.
    ///
    /// Returns the record as stored and whether it was newly appended. A
    /// duplicate roll number keeps the original row even when marks or venue
    /// differ.
    pub fn upsert(
        &self,
        record: CandidateRecord,
    ) -> Result<(CandidateRecord, bool), StorageError> {
        if let Some(stored) = self
            .table
            .read_all()?
            .into_iter()
            .find(|r| r.roll_number == record.roll_number)
        {
            tracing::info!(
                roll_number = %record.roll_number,
                "Roll number already recorded, keeping stored row"
            );
            return Ok((stored, false));
        }
        self.append(&record)?;
        tracing::info!(
            roll_number = %record.roll_number,
            total_marks = record.total_marks,
            "Recorded new candidate"
        );
        Ok((record, true))
    }

    pub fn rank(&self, roll_number: &str, category: &str) -> Result<Ranks, StorageError> {
        Ok(rank(&self.table.read_all()?, roll_number, category))
    }

    pub fn shift_stats(&self) -> Result<ShiftStats, StorageError> {
        Ok(shift_stats(&self.table.read_all()?))
    }

    pub fn overall_stats(&self) -> Result<OverallStats, StorageError> {
        Ok(overall_stats(&self.table.read_all()?))
    }

    /// The first `limit` rows of the overall ranking.
    pub fn top(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StorageError> {
        let mut rows = self.table.read_all()?;
        sort_by_marks(&mut rows);
        Ok(rows
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(i, record)| LeaderboardEntry {
                rank: i + 1,
                roll_number: record.roll_number,
                candidate_name: record.candidate_name,
                category: record.category,
                total_marks: record.total_marks,
            })
            .collect())
    }

    /// Builds the report for a stored record against the current table.
    ///
    /// `tally` describes the submitted page and is dropped unless that
    /// page is the one now stored.
    pub fn report(
        &self,
        record: CandidateRecord,
        newly_recorded: bool,
        tally: ScoreTally,
    ) -> Result<ScoreReport, StorageError> {
        let ranks = self.rank(&record.roll_number, &record.category)?;
        let shifts = self.shift_stats()?;
        let overall = self.overall_stats()?;

        let shift = record.shift_key();
        let shift_average = shifts.averages.get(&shift).copied();
        let shift_rank = shifts
            .ranks
            .get(&shift)
            .and_then(|ranks| ranks.get(&record.roll_number))
            .copied();
        let category_average = overall.category_averages.get(&record.category).copied();

        Ok(ScoreReport {
            overall_rank: ranks.overall,
            category_rank: ranks.category,
            shift_average,
            shift_rank,
            overall_average: overall.average,
            category_average,
            subjects: newly_recorded.then_some(tally.subjects),
            newly_recorded,
            generated_at: chrono::Utc::now(),
            record,
        })
    }
}

/// Descending by marks. `sort_by` is stable, so ties keep table order.
fn sort_by_marks<R: Borrow<CandidateRecord>>(rows: &mut [R]) {
    let marks = |r: &R| Borrow::<CandidateRecord>::borrow(r).total_marks;
    rows.sort_by(|a, b| marks(b).total_cmp(&marks(a)));
}

fn position(rows: &[&CandidateRecord], roll_number: &str) -> Option<usize> {
    rows.iter()
        .position(|r| r.roll_number == roll_number)
        .map(|i| i + 1)
}

pub fn rank(rows: &[CandidateRecord], roll_number: &str, category: &str) -> Ranks {
    let mut sorted: Vec<&CandidateRecord> = rows.iter().collect();
    sort_by_marks(&mut sorted);
    let in_category: Vec<&CandidateRecord> = sorted
        .iter()
        .copied()
        .filter(|r| r.category == category)
        .collect();

    Ranks {
        overall: position(&sorted, roll_number),
        category: position(&in_category, roll_number),
    }
}

pub fn shift_stats(rows: &[CandidateRecord]) -> ShiftStats {
    let mut by_shift: BTreeMap<String, Vec<&CandidateRecord>> = BTreeMap::new();
    for row in rows {
        by_shift.entry(row.shift_key()).or_default().push(row);
    }

    let mut stats = ShiftStats::default();
    for (shift, mut members) in by_shift {
        stats.averages.insert(shift.clone(), mean(members.iter().map(|r| r.total_marks)));
        sort_by_marks(&mut members);
        let ranks = members
            .iter()
            .enumerate()
            .map(|(i, r)| (r.roll_number.clone(), i + 1))
            .collect();
        stats.ranks.insert(shift, ranks);
    }
    stats
}

pub fn overall_stats(rows: &[CandidateRecord]) -> OverallStats {
    let mut by_category: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for row in rows {
        by_category.entry(&row.category).or_default().push(row.total_marks);
    }

    OverallStats {
        average: if rows.is_empty() {
            0.0
        } else {
            mean(rows.iter().map(|r| r.total_marks))
        },
        category_averages: by_category
            .into_iter()
            .map(|(category, marks)| (category.to_string(), mean(marks.into_iter())))
            .collect(),
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    sum / count as f64
}
