// src/models/test_record.rs

use serde::Serialize;
use validator::Validate;

/// Column header of the test ledger, written once when the ledger is empty.
pub const TEST_LEDGER_HEADER: [&str; 9] = [
    "Name",
    "Time",
    "Date",
    "Duration",
    "Subject",
    "Faculty Name",
    "Total Marks",
    "Unique Test Code",
    "Question PDF",
];

/// Placeholder for fields the ledger has no column for.
pub const MISSING_FIELD: &str = "N/A";

/// A published test, one row of the test ledger.
/// Keyed by `unique_code`; never modified once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestRecord {
    pub name: String,
    pub time: String,
    pub date: String,
    pub duration: String,
    pub subject: String,
    pub faculty: String,
    pub total_marks: String,
    pub unique_code: String,

    /// File name under `papers/`, when the teacher attached a PDF.
    pub question_pdf: Option<String>,
}

impl TestRecord {
    /// Ledger row in `TEST_LEDGER_HEADER` order.
    pub fn to_row(&self) -> [&str; 9] {
        [
            &self.name,
            &self.time,
            &self.date,
            &self.duration,
            &self.subject,
            &self.faculty,
            &self.total_marks,
            &self.unique_code,
            self.question_pdf.as_deref().unwrap_or(""),
        ]
    }
}

/// Validated metadata of the "create test" form.
#[derive(Debug, Clone, Validate)]
pub struct CreateTestRequest {
    #[validate(length(min = 1, max = 200, message = "Test name must not be empty."))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub time: String,
    #[validate(length(min = 1, max = 50))]
    pub date: String,
    #[validate(length(min = 1, max = 50))]
    pub duration: String,
    #[validate(length(min = 1, max = 200))]
    pub subject: String,
    #[validate(length(min = 1, max = 200))]
    pub faculty: String,
    #[validate(length(min = 1, max = 20))]
    pub total_marks: String,
    #[validate(custom(function = validate_questions))]
    pub questions: Vec<String>,
    #[validate(custom(function = validate_marks))]
    pub marks: Vec<String>,
}

impl CreateTestRequest {
    /// Builds the ledger record once a code has been assigned.
    pub fn into_record(self, unique_code: String) -> TestRecord {
        TestRecord {
            name: self.name,
            time: self.time,
            date: self.date,
            duration: self.duration,
            subject: self.subject,
            faculty: self.faculty,
            total_marks: self.total_marks,
            unique_code,
            question_pdf: None,
        }
    }
}

fn validate_questions(questions: &[String]) -> Result<(), validator::ValidationError> {
    for q in questions {
        if q.trim().is_empty() {
            return Err(validator::ValidationError::new("question_cannot_be_empty"));
        }
        if q.len() > 2000 {
            return Err(validator::ValidationError::new("question_too_long"));
        }
    }
    Ok(())
}

fn validate_marks(marks: &[String]) -> Result<(), validator::ValidationError> {
    for m in marks {
        if m.trim().is_empty() || m.len() > 20 {
            return Err(validator::ValidationError::new("invalid_marks"));
        }
    }
    Ok(())
}
