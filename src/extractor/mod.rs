// src/extractor/mod.rs

pub mod layout;

use scraper::{ElementRef, Html};

pub use layout::{CompiledLayout, IdentityField, LayoutError, PageLayout};

use crate::{
    models::candidate::{CandidateRecord, QuestionOutcome},
    scoring::{MarkingScheme, ScoreTally},
};

/// Marker text for a question the candidate skipped.
pub const NOT_ATTEMPTED: &str = "--";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub roll_number: String,
    pub candidate_name: String,
    pub venue_name: String,
    pub exam_date: String,
    pub exam_time: String,
}

/// Everything read off one answer-key page.
#[derive(Debug, Clone)]
pub struct ExtractedPage {
    pub identity: Identity,
    pub outcomes: Vec<QuestionOutcome>,
    pub tally: ScoreTally,
}

impl ExtractedPage {
    /// Scores the page and turns it into a table row.
    pub fn into_record(
        self,
        source_link: &str,
        category: &str,
        scheme: &MarkingScheme,
    ) -> (CandidateRecord, ScoreTally) {
        let total_marks = self.tally.total_marks(scheme);
        let record = CandidateRecord {
            source_link: source_link.to_string(),
            category: category.to_string(),
            roll_number: self.identity.roll_number,
            candidate_name: self.identity.candidate_name,
            venue_name: self.identity.venue_name,
            exam_date: self.identity.exam_date,
            exam_time: self.identity.exam_time,
            total_marks,
        };
        (record, self.tally)
    }
}

/// Reads identity fields and per-question outcomes from answer-key markup.
///
/// A single missing identity field becomes its sentinel text. The page is
/// rejected when no identity field matches or when it holds fewer question
/// panels than the marking scheme expects.
pub fn extract(
    markup: &str,
    layout: &CompiledLayout,
    scheme: &MarkingScheme,
) -> Result<ExtractedPage, LayoutError> {
    let html = Html::parse_document(markup);

    let mut found = 0;
    let mut field = |wanted: IdentityField| -> String {
        let selector = layout
            .identity
            .iter()
            .find(|(f, _)| *f == wanted)
            .map(|(_, s)| s);
        match selector.and_then(|s| html.select(s).next()).and_then(first_text) {
            Some(text) => {
                found += 1;
                text
            }
            None => {
                tracing::warn!(field = wanted.label(), "Identity field not found");
                wanted.sentinel()
            }
        }
    };
    let identity = Identity {
        roll_number: field(IdentityField::RollNumber),
        candidate_name: field(IdentityField::CandidateName),
        venue_name: field(IdentityField::VenueName),
        exam_date: field(IdentityField::ExamDate),
        exam_time: field(IdentityField::ExamTime),
    };
    if found == 0 {
        return Err(mismatch(layout, "no candidate identity field matched".to_string()));
    }

    let panels: Vec<ElementRef> = html.select(&layout.question_panel).collect();
    let expected = scheme.total_questions();
    if panels.len() < expected {
        return Err(mismatch(
            layout,
            format!("found {} question panels, expected {}", panels.len(), expected),
        ));
    }

    let outcomes: Vec<QuestionOutcome> = panels
        .iter()
        .take(expected)
        .enumerate()
        .map(|(i, panel)| {
            let subject = i / scheme.questions_per_subject.max(1);
            question_outcome(*panel, layout, i, subject)
        })
        .collect();
    let tally = ScoreTally::from_outcomes(&outcomes, scheme);

    tracing::debug!(
        roll_number = %identity.roll_number,
        right = tally.total_right(),
        not_attempted = tally.total_not_attempted(),
        "Extracted answer key"
    );

    Ok(ExtractedPage {
        identity,
        outcomes,
        tally,
    })
}

fn mismatch(layout: &CompiledLayout, reason: String) -> LayoutError {
    LayoutError::Mismatch {
        version: layout.version.clone(),
        reason,
    }
}

fn question_outcome(
    panel: ElementRef,
    layout: &CompiledLayout,
    index: usize,
    subject: usize,
) -> QuestionOutcome {
    let marker = panel
        .select(&layout.marked_cell)
        .nth(layout.marked_cell_index)
        .and_then(first_text)
        .unwrap_or_else(|| NOT_ATTEMPTED.to_string());
    tracing::trace!(question = index, marker = %marker);

    if marker == NOT_ATTEMPTED {
        return QuestionOutcome::NotAttempted;
    }

    // First cell that carries text of its own; an empty one is skipped.
    let correct = panel
        .select(&layout.correct_cell)
        .find_map(|cell| first_text(cell).filter(|text| !text.is_empty()))
        .and_then(|text| text.chars().next());
    match correct {
        Some(option) if marker.chars().eq(std::iter::once(option)) => QuestionOutcome::Correct,
        Some(_) => QuestionOutcome::Incorrect,
        None => {
            tracing::warn!(
                question = index,
                subject,
                "Correct answer cell missing, counting question as wrong"
            );
            QuestionOutcome::Incorrect
        }
    }
}

/// Trimmed first direct text node of `element`.
fn first_text(element: ElementRef) -> Option<String> {
    element
        .children()
        .find_map(|node| node.value().as_text().map(|text| text.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Question {
        marker: Option<&'static str>,
        correct: Option<&'static str>,
    }

    fn page(identity: [Option<&str>; 5], questions: &[Question]) -> String {
        let rows: String = identity
            .iter()
            .map(|value| match value {
                Some(v) => format!("<tr><td>Label</td><td>{v}</td></tr>"),
                None => "<tr><td>Label</td></tr>".to_string(),
            })
            .collect();
        let panels: String = questions
            .iter()
            .map(|q| {
                let mut cells = String::new();
                for n in 0..9 {
                    cells.push_str(&format!("<tr><td class=\"bold\">c{n}</td></tr>"));
                }
                if let Some(m) = q.marker {
                    cells.push_str(&format!("<tr><td class=\"bold\">{m}</td></tr>"));
                }
                if let Some(c) = q.correct {
                    cells.push_str(&format!("<tr><td class=\"rightAns\">{c}</td></tr>"));
                }
                format!("<div class=\"question-pnl\"><table>{cells}</table></div>")
            })
            .collect();
        format!(
            "<html><body><div><div>Answer Key</div><div><table>{rows}</table></div></div>\
             <section>{panels}</section></body></html>"
        )
    }

    fn small_scheme() -> MarkingScheme {
        MarkingScheme {
            questions_per_subject: 2,
            total_subjects: 2,
            ..MarkingScheme::default()
        }
    }

    const IDENTITY: [Option<&str>; 5] = [
        Some(" 2201001 "),
        Some("Asha Kumari"),
        Some("City Hall"),
        Some("12/03/2024"),
        Some("9:00 AM - 10:00 AM"),
    ];

    fn layout() -> CompiledLayout {
        PageLayout::default().compile().unwrap()
    }

    #[test]
    fn classifies_each_question() {
        let questions = [
            Question { marker: Some("2"), correct: Some("2. Paris") },
            Question { marker: Some("3"), correct: Some("1. Delhi") },
            Question { marker: Some("--"), correct: Some("4. Rome") },
            Question { marker: None, correct: Some("4. Rome") },
        ];
        let page = extract(&page(IDENTITY, &questions), &layout(), &small_scheme()).unwrap();

        assert_eq!(
            page.outcomes,
            vec![
                QuestionOutcome::Correct,
                QuestionOutcome::Incorrect,
                QuestionOutcome::NotAttempted,
                QuestionOutcome::NotAttempted,
            ]
        );
        assert_eq!(page.identity.roll_number, "2201001");
        assert_eq!(page.identity.exam_time, "9:00 AM - 10:00 AM");
        assert_eq!(page.tally.total_right(), 1);
        assert_eq!(page.tally.total_not_attempted(), 2);
    }

    #[test]
    fn missing_correct_cell_counts_as_wrong() {
        let questions = [
            Question { marker: Some("1"), correct: None },
            Question { marker: Some("--"), correct: None },
            Question { marker: Some("1"), correct: Some("1. A") },
            Question { marker: Some("1"), correct: Some("") },
        ];
        let page = extract(&page(IDENTITY, &questions), &layout(), &small_scheme()).unwrap();
        assert_eq!(
            page.outcomes,
            vec![
                QuestionOutcome::Incorrect,
                QuestionOutcome::NotAttempted,
                QuestionOutcome::Correct,
                QuestionOutcome::Incorrect,
            ]
        );
    }

    #[test]
    fn correct_answer_is_read_from_first_cell_with_text() {
        let cells: String = (0..9)
            .map(|n| format!("<tr><td class=\"bold\">c{n}</td></tr>"))
            .collect();
        let panel = |marker: &str| {
            format!(
                "<div class=\"question-pnl\"><table>{cells}\
                 <tr><td class=\"bold\">{marker}</td></tr>\
                 <tr><td class=\"rightAns\"><img src=\"tick.png\"></td></tr>\
                 <tr><td class=\"rightAns\">2. B</td></tr></table></div>"
            )
        };
        let shell = page(IDENTITY, &[]);
        let markup = shell.replace(
            "<section></section>",
            &format!("<section>{}{}{}{}</section>", panel("2"), panel("1"), panel("2"), panel("--")),
        );

        let page = extract(&markup, &layout(), &small_scheme()).unwrap();
        assert_eq!(
            page.outcomes,
            vec![
                QuestionOutcome::Correct,
                QuestionOutcome::Incorrect,
                QuestionOutcome::Correct,
                QuestionOutcome::NotAttempted,
            ]
        );
    }

    #[test]
    fn missing_identity_field_uses_sentinel() {
        let identity = [Some("2201001"), None, Some("City Hall"), Some("12/03/2024"), None];
        let questions: Vec<_> = (0..4)
            .map(|_| Question { marker: Some("--"), correct: None })
            .collect();
        let page = extract(&page(identity, &questions), &layout(), &small_scheme()).unwrap();

        assert_eq!(page.identity.candidate_name, "Candidate Name not found");
        assert_eq!(page.identity.exam_time, "Exam Time not found");
        assert_eq!(page.identity.venue_name, "City Hall");
    }

    #[test]
    fn rejects_page_without_identity_table() {
        let err = extract(
            "<html><body><p>Maintenance</p></body></html>",
            &layout(),
            &small_scheme(),
        )
        .unwrap_err();
        assert!(matches!(err, LayoutError::Mismatch { ref version, .. } if version == "answer-key-v1"));
    }

    #[test]
    fn rejects_page_with_too_few_panels() {
        let questions = [Question { marker: Some("1"), correct: Some("1. A") }];
        let err = extract(&page(IDENTITY, &questions), &layout(), &small_scheme()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "page does not match layout answer-key-v1: found 1 question panels, expected 4"
        );
    }

    #[test]
    fn record_carries_marks_and_submission_fields() {
        let questions = [
            Question { marker: Some("2"), correct: Some("2. Paris") },
            Question { marker: Some("2"), correct: Some("2. Paris") },
            Question { marker: Some("1"), correct: Some("2. Paris") },
            Question { marker: Some("--"), correct: Some("2. Paris") },
        ];
        let scheme = small_scheme();
        let (record, tally) = extract(&page(IDENTITY, &questions), &layout(), &scheme)
            .unwrap()
            .into_record("https://example.com/k", "OBC", &scheme);

        // 2 right, 1 wrong: 2 * 2 - 0.5
        assert_eq!(record.total_marks, 3.5);
        assert_eq!(record.category, "OBC");
        assert_eq!(record.source_link, "https://example.com/k");
        assert_eq!(tally.subjects.len(), 2);
    }
}
