// src/evaluation/mod.rs

//! Seam to the external OCR and grading modules, plus the upload/output
//! directory layout of the evaluation service.

pub mod command;
pub mod results;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

pub use command::CommandEvaluator;

/// Fixed upload slot of the question paper.
pub const QUESTION_PAPER_SLOT: &str = "question_paper.pdf";
/// Fixed upload slot of the answer sheet.
pub const ANSWER_SHEET_SLOT: &str = "answer_sheet.pdf";

#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("failed to launch {command}: {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("{command} did not report an output file")]
    NoOutput { command: String },

    #[error("{0} was reported as output but does not exist")]
    MissingOutput(PathBuf),
}

/// OCR extraction and grading, delegated to external tooling.
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Extracts question/answer text into a spreadsheet under `output_dir`
    /// and returns its path.
    async fn extract(
        &self,
        question_pdf: &Path,
        answer_pdf: &Path,
        output_dir: &Path,
    ) -> Result<PathBuf, EvaluationError>;

    /// Grades the extracted spreadsheet into a report document under
    /// `output_dir` and returns its path.
    async fn evaluate(&self, spreadsheet: &Path, output_dir: &Path)
    -> Result<PathBuf, EvaluationError>;
}

/// True for names that address a file directly inside a directory.
pub fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.contains("..")
}

/// Case-insensitive extension check, e.g. `has_extension("A.PDF", "pdf")`.
pub fn has_extension(name: &str, ext: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_extension_is_case_insensitive() {
        assert!(has_extension("paper.PDF", "pdf"));
        assert!(has_extension("paper.pdf", "pdf"));
        assert!(!has_extension("notes.txt", "pdf"));
        assert!(!has_extension("pdf", "pdf"));
    }

    #[test]
    fn traversal_names_are_not_plain() {
        assert!(is_plain_file_name("report.xlsx"));
        assert!(!is_plain_file_name("../secret.xlsx"));
        assert!(!is_plain_file_name("a/b.xlsx"));
        assert!(!is_plain_file_name("a\\b.xlsx"));
        assert!(!is_plain_file_name(""));
    }
}
