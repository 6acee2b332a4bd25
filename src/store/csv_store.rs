// src/store/csv_store.rs

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    models::{
        question::QuestionEntry,
        student::{STUDENT_LEDGER_HEADER, StudentSubmission},
        test_record::{TEST_LEDGER_HEADER, TestRecord},
    },
    utils::code::is_safe_code,
};

use super::{ExamStore, StoreError, ledger, matcher};

pub const TEST_LEDGER_FILE: &str = "test_details.csv";
pub const STUDENT_LEDGER_FILE: &str = "student_details.csv";
pub const QUESTIONS_DIR: &str = "questions";
pub const PAPERS_DIR: &str = "papers";

/// `ExamStore` over flat CSV files:
///
/// ```text
/// <root>/test_details.csv
/// <root>/student_details.csv
/// <root>/questions/<code>_questions.csv
/// <root>/papers/<code>_paper.pdf
/// ```
///
/// Appends from this process are serialized; other processes writing the
/// same files are not coordinated with.
#[derive(Debug, Clone)]
pub struct CsvStore {
    root: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl CsvStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the root, question and paper directories if missing.
    pub async fn ensure_layout(&self) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(self.questions_dir()).await?;
        tokio::fs::create_dir_all(self.papers_dir()).await?;
        Ok(())
    }

    pub fn test_ledger_path(&self) -> PathBuf {
        self.root.join(TEST_LEDGER_FILE)
    }

    pub fn student_ledger_path(&self) -> PathBuf {
        self.root.join(STUDENT_LEDGER_FILE)
    }

    pub fn questions_dir(&self) -> PathBuf {
        self.root.join(QUESTIONS_DIR)
    }

    pub fn papers_dir(&self) -> PathBuf {
        self.root.join(PAPERS_DIR)
    }

    pub fn questions_path(&self, code: &str) -> PathBuf {
        self.questions_dir().join(format!("{}_questions.csv", code))
    }

    pub fn paper_file_name(code: &str) -> String {
        format!("{}_paper.pdf", code)
    }

    async fn read_test_ledger(&self) -> Result<Option<ledger::Table>, StoreError> {
        let path = self.test_ledger_path();
        tokio::task::spawn_blocking(move || ledger::read_table(&path)).await?
    }
}

/// Paper as (path, file name, content).
type PaperFile = (PathBuf, String, Vec<u8>);

fn write_test_files(
    paper: Option<&PaperFile>,
    questions_path: &Path,
    questions: &[QuestionEntry],
) -> Result<(), StoreError> {
    if let Some((path, _, bytes)) = paper {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, bytes)?;
    }
    ledger::write_questions(questions_path, questions)
}

#[async_trait]
impl ExamStore for CsvStore {
    async fn code_exists(&self, code: &str) -> Result<bool, StoreError> {
        let Some((headers, rows)) = self.read_test_ledger().await? else {
            return Ok(false);
        };
        Ok(matcher::find_row(&headers, &rows, code).is_some())
    }

    async fn find_test(&self, code: &str) -> Result<Option<TestRecord>, StoreError> {
        let Some((headers, rows)) = self.read_test_ledger().await? else {
            tracing::warn!("Test ledger {} does not exist", self.test_ledger_path().display());
            return Ok(None);
        };

        let record = matcher::find_row(&headers, &rows, code)
            .map(|row| matcher::ColumnMap::from_headers(&headers).to_record(row, code));
        Ok(record)
    }

    async fn codes(&self) -> Result<Vec<String>, StoreError> {
        Ok(self
            .read_test_ledger()
            .await?
            .map(|(headers, rows)| matcher::codes(&headers, &rows))
            .unwrap_or_default())
    }

    async fn append_test(
        &self,
        mut record: TestRecord,
        questions: &[QuestionEntry],
        paper: Option<Vec<u8>>,
    ) -> Result<TestRecord, StoreError> {
        let code = record.unique_code.clone();
        let questions_path = self.questions_path(&code);
        let ledger_path = self.test_ledger_path();
        let paper = paper.map(|bytes| {
            let file_name = Self::paper_file_name(&code);
            (self.papers_dir().join(&file_name), file_name, bytes)
        });
        record.question_pdf = paper.as_ref().map(|(_, name, _)| name.clone());

        let row = record.clone();
        let questions = questions.to_vec();

        let _guard = self.write_lock.lock().await;
        tokio::task::spawn_blocking(move || {
            let written = write_test_files(paper.as_ref(), &questions_path, &questions)
                .and_then(|()| ledger::append_row(&ledger_path, &TEST_LEDGER_HEADER, &row.to_row()));

            if written.is_err() {
                let paper_path = paper.as_ref().map(|(path, _, _)| path);
                for path in paper_path.into_iter().chain([&questions_path]) {
                    if let Err(e) = std::fs::remove_file(path) {
                        if e.kind() != std::io::ErrorKind::NotFound {
                            tracing::warn!("Failed to roll back {}: {}", path.display(), e);
                        }
                    }
                }
            }
            written
        })
        .await??;

        Ok(record)
    }

    async fn load_questions(&self, code: &str) -> Result<Option<Vec<QuestionEntry>>, StoreError> {
        let code = code.trim();
        if !is_safe_code(code) {
            tracing::warn!("Refusing to load questions for malformed code {:?}", code);
            return Ok(None);
        }

        let path = self.questions_path(code);
        let questions = tokio::task::spawn_blocking(move || ledger::read_questions(&path)).await?;
        Ok(questions)
    }

    async fn append_student(&self, submission: &StudentSubmission) -> Result<(), StoreError> {
        let path = self.student_ledger_path();
        let submission = submission.clone();

        let _guard = self.write_lock.lock().await;
        tokio::task::spawn_blocking(move || {
            ledger::append_row(&path, &STUDENT_LEDGER_HEADER, &submission.to_row())
        })
        .await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str) -> TestRecord {
        TestRecord {
            name: "Midterm".to_string(),
            time: "10:00".to_string(),
            date: "2024-03-01".to_string(),
            duration: "90".to_string(),
            subject: "Physics".to_string(),
            faculty: "Dr. Rao".to_string(),
            total_marks: "15".to_string(),
            unique_code: code.to_string(),
            question_pdf: None,
        }
    }

    #[tokio::test]
    async fn published_test_can_be_found_and_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path());
        let questions = vec![
            QuestionEntry::new("Define work.", "5"),
            QuestionEntry::new("Define power.", "10"),
        ];

        store.append_test(record("ab12cd34"), &questions, None).await.unwrap();

        assert!(store.code_exists("ab12cd34").await.unwrap());
        assert!(store.code_exists(" ab12cd34 ").await.unwrap());
        assert!(!store.code_exists("ab12cd3").await.unwrap());

        let found = store.find_test("ab12cd34").await.unwrap().unwrap();
        assert_eq!(found, record("ab12cd34"));

        let loaded = store.load_questions("ab12cd34").await.unwrap();
        assert_eq!(loaded, Some(questions));
    }

    #[tokio::test]
    async fn empty_store_has_no_tests() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path());

        assert!(!store.code_exists("anything").await.unwrap());
        assert!(store.find_test("anything").await.unwrap().is_none());
        assert!(store.load_questions("anything").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn legacy_ledger_headers_are_understood() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(TEST_LEDGER_FILE),
            "Faculty Name,Subject,Test Code,Name,Marks\nDr. Rao,Maths,q1,Quiz 1,20\n",
        )
        .unwrap();
        let store = CsvStore::new(dir.path());

        let found = store.find_test("q1").await.unwrap().unwrap();
        assert_eq!(found.name, "Quiz 1");
        assert_eq!(found.faculty, "Dr. Rao");
        assert_eq!(found.total_marks, "20");
        assert_eq!(found.date, "N/A");
    }

    #[tokio::test]
    async fn path_like_codes_are_not_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path());

        assert!(store.load_questions("../test_details").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn students_are_appended_under_one_header() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path());
        let submission = StudentSubmission {
            name: "Asha".to_string(),
            roll_number: "12".to_string(),
            email: "a@x.com".to_string(),
            unique_code: "ab12cd34".to_string(),
        };

        store.append_student(&submission).await.unwrap();
        store.append_student(&submission).await.unwrap();

        let content = std::fs::read_to_string(store.student_ledger_path()).unwrap();
        assert_eq!(
            content,
            "Name,Roll Number,Email ID,Unique Code\n\
             Asha,12,a@x.com,ab12cd34\n\
             Asha,12,a@x.com,ab12cd34\n"
        );
    }

    #[tokio::test]
    async fn paper_is_saved_under_code_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path());

        let stored = store
            .append_test(record("ab12cd34"), &[QuestionEntry::new("Q", "1")], Some(b"%PDF-1.4".to_vec()))
            .await
            .unwrap();

        assert_eq!(stored.question_pdf.as_deref(), Some("ab12cd34_paper.pdf"));
        assert!(store.papers_dir().join("ab12cd34_paper.pdf").exists());
        assert_eq!(store.find_test("ab12cd34").await.unwrap(), Some(stored));
    }

    #[tokio::test]
    async fn failed_publish_leaves_no_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path());
        // A directory where the ledger file should be makes the append fail.
        std::fs::create_dir_all(store.test_ledger_path()).unwrap();

        let result = store
            .append_test(record("ab12cd34"), &[QuestionEntry::new("Q", "1")], Some(b"%PDF-1.4".to_vec()))
            .await;

        assert!(result.is_err());
        assert!(!store.papers_dir().join("ab12cd34_paper.pdf").exists());
        assert!(!store.questions_path("ab12cd34").exists());
    }

    #[tokio::test]
    async fn codes_lists_every_code_column() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(TEST_LEDGER_FILE),
            "Name,Unique Test Code\nQuiz 1, q1 \nQuiz 2,\nQuiz 3,q3\n",
        )
        .unwrap();
        let store = CsvStore::new(dir.path());

        assert_eq!(store.codes().await.unwrap(), vec!["q1", "q3"]);
        assert!(CsvStore::new(dir.path().join("empty")).codes().await.unwrap().is_empty());
    }
}
