// src/scoring.rs

use serde::{Deserialize, Serialize};

use crate::models::candidate::QuestionOutcome;

/// Marks awarded and deducted per question, and the paper's shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkingScheme {
    pub per_correct: f64,
    pub per_wrong: f64,
    pub questions_per_subject: usize,
    pub total_subjects: usize,
}

impl Default for MarkingScheme {
    fn default() -> Self {
        Self {
            per_correct: 2.0,
            per_wrong: 0.5,
            questions_per_subject: 25,
            total_subjects: 4,
        }
    }
}

impl MarkingScheme {
    pub fn total_questions(&self) -> usize {
        self.total_subjects * self.questions_per_subject
    }

    /// Questions neither right nor skipped count as wrong.
    /// Inconsistent counts produce a negative value, which is not rejected here.
    pub fn total_wrong(&self, total_right: usize, total_not_attempted: usize) -> i64 {
        self.total_questions() as i64 - total_right as i64 - total_not_attempted as i64
    }

    pub fn total_marks(&self, total_right: usize, total_not_attempted: usize) -> f64 {
        let wrong = self.total_wrong(total_right, total_not_attempted);
        total_right as f64 * self.per_correct - wrong as f64 * self.per_wrong
    }
}

/// Right/skipped/wrong counts for one subject block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SubjectTally {
    pub right: usize,
    pub not_attempted: usize,
    pub wrong: usize,
}

impl SubjectTally {
    pub fn record(&mut self, outcome: QuestionOutcome) {
        match outcome {
            QuestionOutcome::Correct => self.right += 1,
            QuestionOutcome::NotAttempted => self.not_attempted += 1,
            QuestionOutcome::Incorrect => self.wrong += 1,
        }
    }
}

/// Outcome counts for the whole paper, kept per subject.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreTally {
    pub subjects: Vec<SubjectTally>,
}

impl ScoreTally {
    /// Groups a flat outcome sequence into consecutive subject blocks.
    pub fn from_outcomes(outcomes: &[QuestionOutcome], scheme: &MarkingScheme) -> Self {
        let subjects = outcomes
            .chunks(scheme.questions_per_subject.max(1))
            .take(scheme.total_subjects)
            .map(|block| {
                let mut tally = SubjectTally::default();
                for &outcome in block {
                    tally.record(outcome);
                }
                tally
            })
            .collect();
        Self { subjects }
    }

    pub fn total_right(&self) -> usize {
        self.subjects.iter().map(|s| s.right).sum()
    }

    pub fn total_not_attempted(&self) -> usize {
        self.subjects.iter().map(|s| s.not_attempted).sum()
    }

    pub fn total_marks(&self, scheme: &MarkingScheme) -> f64 {
        scheme.total_marks(self.total_right(), self.total_not_attempted())
    }
}
