// src/store/mod.rs

pub mod csv_store;
pub mod ledger;
pub mod matcher;

use async_trait::async_trait;

use crate::models::{question::QuestionEntry, student::StudentSubmission, test_record::TestRecord};

pub use csv_store::CsvStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Could not generate an unused test code after {0} attempts")]
    CodeSpaceExhausted(usize),
}

/// Persistence seam for the exam applications.
///
/// Handlers only see this trait, so the CSV layout can be swapped for a real
/// datastore without touching them.
#[async_trait]
pub trait ExamStore: Send + Sync {
    /// True if any ledger row carries `code` in a code-like column.
    async fn code_exists(&self, code: &str) -> Result<bool, StoreError>;

    /// First ledger row carrying `code`, with fields resolved by fuzzy header matching.
    async fn find_test(&self, code: &str) -> Result<Option<TestRecord>, StoreError>;

    /// Every code already present in the ledger.
    async fn codes(&self) -> Result<Vec<String>, StoreError>;

    /// Publishes a test: the question paper (if any), the question set, then
    /// the ledger row. A code visible in the ledger always has its files, and
    /// a failed publish leaves nothing behind.
    ///
    /// Returns the record as stored, with `question_pdf` filled in.
    async fn append_test(
        &self,
        record: TestRecord,
        questions: &[QuestionEntry],
        paper: Option<Vec<u8>>,
    ) -> Result<TestRecord, StoreError>;

    /// Question set of a test. `None` when missing or malformed.
    async fn load_questions(&self, code: &str) -> Result<Option<Vec<QuestionEntry>>, StoreError>;

    async fn append_student(&self, submission: &StudentSubmission) -> Result<(), StoreError>;
}
