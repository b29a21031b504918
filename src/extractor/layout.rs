// src/extractor/layout.rs

use std::path::{Path, PathBuf};

use scraper::Selector;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("failed to read layout file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("layout file {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("locator `{field}` has an invalid selector {selector:?}: {reason}")]
    Selector {
        field: &'static str,
        selector: String,
        reason: String,
    },
    #[error("page does not match layout {version}: {reason}")]
    Mismatch { version: String, reason: String },
}

/// Identity fields read from the candidate table at the top of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityField {
    RollNumber,
    CandidateName,
    VenueName,
    ExamDate,
    ExamTime,
}

impl IdentityField {
    pub const ALL: [IdentityField; 5] = [
        IdentityField::RollNumber,
        IdentityField::CandidateName,
        IdentityField::VenueName,
        IdentityField::ExamDate,
        IdentityField::ExamTime,
    ];

    pub fn label(self) -> &'static str {
        match self {
            IdentityField::RollNumber => "Roll Number",
            IdentityField::CandidateName => "Candidate Name",
            IdentityField::VenueName => "Venue Name",
            IdentityField::ExamDate => "Exam Date",
            IdentityField::ExamTime => "Exam Time",
        }
    }

    /// Placeholder stored when the field's locator matches nothing.
    pub fn sentinel(self) -> String {
        format!("{} not found", self.label())
    }

    fn key(self) -> &'static str {
        match self {
            IdentityField::RollNumber => "roll_number",
            IdentityField::CandidateName => "candidate_name",
            IdentityField::VenueName => "venue_name",
            IdentityField::ExamDate => "exam_date",
            IdentityField::ExamTime => "exam_time",
        }
    }
}

/// Field-locator map for an answer-key page, as CSS selectors.
///
/// Missing keys in a layout file fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageLayout {
    pub version: String,
    pub roll_number: String,
    pub candidate_name: String,
    pub venue_name: String,
    pub exam_date: String,
    pub exam_time: String,
    /// One element per question, in paper order.
    pub question_panel: String,
    /// Highlighted cells inside a panel; the candidate's choice is one of them.
    pub marked_cell: String,
    pub marked_cell_index: usize,
    /// Cell flagged as holding the correct option.
    pub correct_cell: String,
}

fn candidate_row(row: usize) -> String {
    format!(
        "body > div > div:nth-of-type(2) > table > tbody > tr:nth-of-type({row}) > td:nth-of-type(2)"
    )
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            version: "answer-key-v1".to_string(),
            roll_number: candidate_row(1),
            candidate_name: candidate_row(2),
            venue_name: candidate_row(3),
            exam_date: candidate_row(4),
            exam_time: candidate_row(5),
            question_panel: r#"div[class*="question-pnl"]"#.to_string(),
            marked_cell: r#"td[class*="bold"]"#.to_string(),
            marked_cell_index: 9,
            correct_cell: r#"td[class*="rightAns"]"#.to_string(),
        }
    }
}

impl PageLayout {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LayoutError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| LayoutError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| LayoutError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn locator(&self, field: IdentityField) -> &str {
        match field {
            IdentityField::RollNumber => &self.roll_number,
            IdentityField::CandidateName => &self.candidate_name,
            IdentityField::VenueName => &self.venue_name,
            IdentityField::ExamDate => &self.exam_date,
            IdentityField::ExamTime => &self.exam_time,
        }
    }

    /// Parses every locator, failing on the first invalid selector.
    pub fn compile(&self) -> Result<CompiledLayout, LayoutError> {
        let identity = IdentityField::ALL
            .iter()
            .map(|&field| Ok((field, parse_selector(field.key(), self.locator(field))?)))
            .collect::<Result<Vec<_>, LayoutError>>()?;

        Ok(CompiledLayout {
            version: self.version.clone(),
            identity,
            question_panel: parse_selector("question_panel", &self.question_panel)?,
            marked_cell: parse_selector("marked_cell", &self.marked_cell)?,
            marked_cell_index: self.marked_cell_index,
            correct_cell: parse_selector("correct_cell", &self.correct_cell)?,
        })
    }
}

fn parse_selector(field: &'static str, selector: &str) -> Result<Selector, LayoutError> {
    Selector::parse(selector).map_err(|e| LayoutError::Selector {
        field,
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// A `PageLayout` with its selectors parsed, ready for extraction.
#[derive(Debug, Clone)]
pub struct CompiledLayout {
    pub(crate) version: String,
    pub(crate) identity: Vec<(IdentityField, Selector)>,
    pub(crate) question_panel: Selector,
    pub(crate) marked_cell: Selector,
    pub(crate) marked_cell_index: usize,
    pub(crate) correct_cell: Selector,
}

impl CompiledLayout {
    pub fn version(&self) -> &str {
        &self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_compiles() {
        let layout = PageLayout::default().compile().unwrap();
        assert_eq!(layout.version(), "answer-key-v1");
        assert_eq!(layout.identity.len(), 5);
        assert_eq!(layout.marked_cell_index, 9);
    }

    #[test]
    fn invalid_selector_names_the_field() {
        let layout = PageLayout {
            correct_cell: "td[[".to_string(),
            ..PageLayout::default()
        };
        match layout.compile() {
            Err(LayoutError::Selector { field, selector, .. }) => {
                assert_eq!(field, "correct_cell");
                assert_eq!(selector, "td[[");
            }
            other => panic!("expected selector error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn partial_layout_file_uses_defaults() {
        let layout: PageLayout = serde_json::from_str(
            r#"{ "version": "answer-key-v2", "marked_cell_index": 4 }"#,
        )
        .unwrap();
        assert_eq!(layout.version, "answer-key-v2");
        assert_eq!(layout.marked_cell_index, 4);
        assert_eq!(layout.question_panel, PageLayout::default().question_panel);
    }

    #[test]
    fn bundled_layout_file_matches_default() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("layouts/answer-key-v1.json");
        assert_eq!(PageLayout::load(path).unwrap(), PageLayout::default());
    }

    #[test]
    fn missing_layout_file_is_io_error() {
        assert!(matches!(
            PageLayout::load("/nonexistent/layout.json"),
            Err(LayoutError::Io { .. })
        ));
    }

    #[test]
    fn sentinel_names_the_field() {
        assert_eq!(IdentityField::RollNumber.sentinel(), "Roll Number not found");
        assert_eq!(IdentityField::ExamTime.sentinel(), "Exam Time not found");
    }
}
