// src/models/candidate.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// One row of the record table.
/// Field names map onto the CSV header columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    /// The answer-key URL the record was scraped from (provenance only).
    #[serde(rename = "Answer Key Link")]
    pub source_link: String,

    /// User-supplied grouping key, e.g. "General" or "OBC".
    #[serde(rename = "Category")]
    pub category: String,

    /// Identity key. Unique within the table.
    #[serde(rename = "Roll Number")]
    pub roll_number: String,

    #[serde(rename = "Candidate Name")]
    pub candidate_name: String,

    #[serde(rename = "Venue Name")]
    pub venue_name: String,

    #[serde(rename = "Exam Date")]
    pub exam_date: String,

    #[serde(rename = "Exam Time")]
    pub exam_time: String,

    #[serde(rename = "Total Marks")]
    pub total_marks: f64,
}

impl CandidateRecord {
    /// Identifies the exam session the candidate sat in.
    pub fn shift_key(&self) -> String {
        shift_key(&self.exam_date, &self.exam_time)
    }
}

pub fn shift_key(exam_date: &str, exam_time: &str) -> String {
    format!("{} {}", exam_date, exam_time)
}

/// Per-question result, derived while scraping and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionOutcome {
    Correct,
    Incorrect,
    NotAttempted,
}

/// Form submitted by the candidate.
///
/// Only the link is checked: a value that cannot be requested over
/// http(s) is a fetch failure like any other.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitRequest {
    #[serde(rename = "answerKeyLink")]
    #[validate(custom(function = validate_link))]
    pub answer_key_link: String,

    /// Free text; any value, empty included, becomes its own group.
    pub category: String,
}

fn validate_link(link: &str) -> Result<(), validator::ValidationError> {
    let url = url::Url::parse(link.trim())
        .map_err(|e| {
            validator::ValidationError::new("answer_key_link_not_a_url")
                .with_message(format!("invalid URL {:?}: {}", link, e).into())
        })?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(validator::ValidationError::new("answer_key_link_scheme")
            .with_message(format!("unsupported URL scheme {:?}", other).into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(link: &str, category: &str) -> SubmitRequest {
        SubmitRequest {
            answer_key_link: link.to_string(),
            category: category.to_string(),
        }
    }

    #[test]
    fn accepts_http_links() {
        assert!(request("https://example.com/key.html", "General").validate().is_ok());
        assert!(request("http://10.0.0.1:8080/a?b=c", "OBC").validate().is_ok());
    }

    #[test]
    fn rejects_bad_links() {
        assert!(request("not a url", "General").validate().is_err());
        assert!(request("ftp://example.com/key.html", "General").validate().is_err());
    }

    #[test]
    fn accepts_any_category() {
        assert!(request("https://example.com/key.html", "").validate().is_ok());
        assert!(request("https://example.com/key.html", &"x".repeat(51)).validate().is_ok());
    }

    #[test]
    fn shift_key_joins_date_and_time() {
        assert_eq!(shift_key("12/03/2024", "9:00 AM - 10:00 AM"), "12/03/2024 9:00 AM - 10:00 AM");
    }
}
