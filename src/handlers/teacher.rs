// src/handlers/teacher.rs

use std::collections::HashMap;

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, State},
    response::IntoResponse,
};
use serde_json::json;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    evaluation::has_extension,
    models::{question::QuestionEntry, response::ApiResponse, test_record::CreateTestRequest},
    state::SharedStore,
    store::csv_store::{PAPERS_DIR, QUESTIONS_DIR},
    utils::code::generate_unique_code,
};

/// Metadata fields the create-test form must carry, in form order.
const REQUIRED_FIELDS: [&str; 7] = [
    "name",
    "time",
    "date",
    "duration",
    "subject",
    "faculty",
    "total_marks",
];

/// Raw multipart payload of the create-test form.
#[derive(Debug, Default)]
struct TestForm {
    fields: HashMap<String, String>,
    questions: Vec<String>,
    marks: Vec<String>,
    /// (client file name, content) of the optional question paper.
    paper: Option<(String, Bytes)>,
}

impl TestForm {
    async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = TestForm::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match name.as_str() {
                "question_pdf" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let bytes = field.bytes().await?;
                    // Browsers send an empty part when no file was picked.
                    if !file_name.is_empty() {
                        form.paper = Some((file_name, bytes));
                    }
                }
                "questions" | "questions[]" => form.questions.push(field.text().await?),
                "marks" | "marks[]" => form.marks.push(field.text().await?),
                _ => {
                    let value = field.text().await?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    fn take(&mut self, key: &str) -> Result<String, AppError> {
        self.fields
            .remove(key)
            .map(|v| v.trim().to_string())
            .ok_or_else(|| AppError::BadRequest(format!("Missing form field: {}", key)))
    }

    /// Checks presence of every field and builds the trimmed request.
    fn into_request(mut self) -> Result<(CreateTestRequest, Option<(String, Bytes)>), AppError> {
        if let Some(missing) = REQUIRED_FIELDS.iter().find(|f| !self.fields.contains_key(**f)) {
            return Err(AppError::BadRequest(format!("Missing form field: {}", missing)));
        }

        if self.questions.is_empty() || self.marks.is_empty() {
            return Err(AppError::BadRequest(
                "Questions and marks are required".to_string(),
            ));
        }

        if self.questions.len() != self.marks.len() {
            return Err(AppError::BadRequest(format!(
                "Got {} questions but {} marks",
                self.questions.len(),
                self.marks.len()
            )));
        }

        let request = CreateTestRequest {
            name: self.take("name")?,
            time: self.take("time")?,
            date: self.take("date")?,
            duration: self.take("duration")?,
            subject: self.take("subject")?,
            faculty: self.take("faculty")?,
            total_marks: self.take("total_marks")?,
            questions: self.questions.iter().map(|q| q.trim().to_string()).collect(),
            marks: self.marks.iter().map(|m| m.trim().to_string()).collect(),
        };

        Ok((request, self.paper))
    }
}

/// Publishes a new test.
///
/// * Validates the form (metadata, questions, marks, optional PDF).
/// * Assigns an unused 8-character code.
/// * Stores the question paper, the question file and the ledger row.
pub async fn submit_test_details(
    State(store): State<SharedStore>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let (request, paper) = TestForm::read(multipart).await?.into_request()?;

    if let Err(validation_errors) = request.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    if let Some((file_name, _)) = &paper {
        if !has_extension(file_name, "pdf") {
            return Err(AppError::BadRequest("Uploaded file must be a PDF".to_string()));
        }
    }

    let code = generate_unique_code(store.as_ref()).await?;

    let questions: Vec<QuestionEntry> = request
        .questions
        .iter()
        .zip(request.marks.iter())
        .map(|(q, m)| QuestionEntry::new(q.as_str(), m.as_str()))
        .collect();

    let paper = paper.map(|(_, bytes)| bytes.to_vec());
    let record = store
        .append_test(request.into_record(code.clone()), &questions, paper)
        .await
        .map_err(|e| {
            tracing::error!("Failed to publish test {}: {:?}", code, e);
            AppError::internal("Error", e)
        })?;

    tracing::info!(
        "Published test {} ({}, {} questions)",
        code,
        record.subject,
        questions.len()
    );

    Ok(Json(ApiResponse::with_message(
        "Test created successfully",
        json!({
            "test_code": code,
            "question_pdf": record.question_pdf,
        }),
    )))
}

/// Reports where the teacher app keeps its files and whether they exist.
pub async fn check_directories(State(config): State<Config>) -> impl IntoResponse {
    let questions_dir = config.data_dir.join(QUESTIONS_DIR);
    let papers_dir = config.data_dir.join(PAPERS_DIR);

    Json(json!({
        "database_dir": config.data_dir.display().to_string(),
        "questions_dir": questions_dir.display().to_string(),
        "papers_dir": papers_dir.display().to_string(),
        "static_dir": config.static_dir.display().to_string(),
        "database_exists": config.data_dir.exists(),
        "questions_exists": questions_dir.exists(),
        "papers_exists": papers_dir.exists(),
        "static_exists": config.static_dir.exists(),
    }))
}
