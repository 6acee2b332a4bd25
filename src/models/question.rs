// src/models/question.rs

use serde::{Deserialize, Serialize};

/// One row of a per-test question file (`<code>_questions.csv`).
///
/// The file header is exactly `Question,Marks`; the serde renames keep the
/// CSV column names while the JSON side uses snake_case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionEntry {
    #[serde(rename(serialize = "question", deserialize = "Question"))]
    pub question: String,

    /// Marks are kept verbatim as the teacher typed them.
    #[serde(rename(serialize = "marks", deserialize = "Marks"))]
    pub marks: String,
}

impl QuestionEntry {
    pub fn new(question: impl Into<String>, marks: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            marks: marks.into(),
        }
    }
}
