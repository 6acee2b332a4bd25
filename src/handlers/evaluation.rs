// src/handlers/evaluation.rs

use std::path::{Path as FsPath, PathBuf};

use axum::{
    Json,
    body::{Body, Bytes},
    extract::{Multipart, Path, Request, State},
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use chrono::Local;
use serde_json::json;
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::{
    config::Config,
    error::AppError,
    evaluation::{
        ANSWER_SHEET_SLOT, QUESTION_PAPER_SLOT, has_extension, is_plain_file_name,
        results::{is_tabular, read_records},
    },
    models::response::ApiResponse,
    state::SharedEvaluator,
};

/// Liveness probe.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": Local::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Stores the question paper and answer sheet in the fixed upload slots.
///
/// Both parts are required and both must be PDFs; nothing is written unless
/// both pass. A new upload replaces the previous pair.
pub async fn upload_files(
    State(config): State<Config>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut question_paper: Option<(String, Bytes)> = None;
    let mut answer_sheet: Option<(String, Bytes)> = None;

    while let Some(field) = multipart.next_field().await? {
        let slot = match field.name() {
            Some("question_paper") => &mut question_paper,
            Some("answer_sheet") => &mut answer_sheet,
            _ => continue,
        };
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        if !file_name.is_empty() {
            *slot = Some((file_name, bytes));
        }
    }

    let (Some(question_paper), Some(answer_sheet)) = (question_paper, answer_sheet) else {
        return Err(AppError::BadRequest(
            "Both question_paper and answer_sheet files are required".to_string(),
        ));
    };

    if !has_extension(&question_paper.0, "pdf") || !has_extension(&answer_sheet.0, "pdf") {
        return Err(AppError::BadRequest("Only PDF files are allowed".to_string()));
    }

    let upload_dir = &config.upload_dir;
    let save = async {
        tokio::fs::create_dir_all(upload_dir).await?;
        tokio::fs::write(upload_dir.join(QUESTION_PAPER_SLOT), &question_paper.1).await?;
        tokio::fs::write(upload_dir.join(ANSWER_SHEET_SLOT), &answer_sheet.1).await?;
        Ok::<_, std::io::Error>(())
    };
    save.await.map_err(|e| AppError::internal("Upload failed", e))?;

    tracing::info!(
        "Uploaded {} ({} bytes) and {} ({} bytes)",
        question_paper.0,
        question_paper.1.len(),
        answer_sheet.0,
        answer_sheet.1.len()
    );

    Ok(Json(ApiResponse::with_message(
        "Files uploaded successfully",
        json!({
            "question_paper": QUESTION_PAPER_SLOT,
            "answer_sheet": ANSWER_SHEET_SLOT,
            "upload_time": Local::now().to_rfc3339(),
        }),
    )))
}

fn file_name_of(path: &FsPath) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Runs OCR extraction and grading over the uploaded pair.
pub async fn process(
    State(config): State<Config>,
    State(evaluator): State<SharedEvaluator>,
) -> Result<impl IntoResponse, AppError> {
    let question_pdf = config.upload_dir.join(QUESTION_PAPER_SLOT);
    let answer_pdf = config.upload_dir.join(ANSWER_SHEET_SLOT);

    if !(question_pdf.exists() && answer_pdf.exists()) {
        return Err(AppError::BadRequest(
            "Please upload both question paper and answer sheet first".to_string(),
        ));
    }

    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .map_err(|e| AppError::internal("Processing failed", e))?;

    let excel_path = evaluator
        .extract(&question_pdf, &answer_pdf, &config.output_dir)
        .await
        .map_err(|e| AppError::internal("Processing failed", e))?;
    let doc_path = evaluator
        .evaluate(&excel_path, &config.output_dir)
        .await
        .map_err(|e| AppError::internal("Processing failed", e))?;

    let excel_file = file_name_of(&excel_path);
    let doc_file = file_name_of(&doc_path);
    tracing::info!("Evaluation produced {} and {}", excel_file, doc_file);

    Ok(Json(ApiResponse::with_message(
        "Processing completed successfully",
        json!({
            "excel_download_url": format!("/api/download/{}", excel_file),
            "doc_download_url": format!("/api/download/{}", doc_file),
            "excel_file": excel_file,
            "doc_file": doc_file,
            "processed_time": Local::now().to_rfc3339(),
        }),
    )))
}

/// Resolves `filename` inside the output directory, rejecting anything that
/// is not a plain file name.
fn output_path(config: &Config, filename: &str) -> Result<PathBuf, AppError> {
    if !is_plain_file_name(filename) {
        return Err(AppError::BadRequest("Invalid file name".to_string()));
    }
    Ok(config.output_dir.join(filename))
}

fn content_type(filename: &str) -> &'static str {
    if has_extension(filename, "xlsx") {
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    } else if has_extension(filename, "docx") {
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    } else if has_extension(filename, "pdf") {
        "application/pdf"
    } else if has_extension(filename, "csv") {
        "text/csv"
    } else {
        "application/octet-stream"
    }
}

/// Streams a generated artifact as an attachment. Range requests are honoured.
pub async fn download_file(
    State(config): State<Config>,
    Path(filename): Path<String>,
    request: Request,
) -> Result<Response, AppError> {
    let path = output_path(&config, &filename)?;
    if !path.is_file() {
        return Err(AppError::NotFound("File not found".to_string()));
    }

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
        .map_err(|e| AppError::BadRequest(format!("Invalid file name: {}", e)))?;

    let mut response = ServeFile::new(&path)
        .oneshot(request)
        .await
        .map_err(|e| AppError::internal("Download failed", e))?
        .map(Body::new);

    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type(&filename)));
    headers.insert(header::CONTENT_DISPOSITION, disposition);
    Ok(response)
}

/// File names in `dir` accepted by `keep`, sorted. A missing directory is empty.
async fn list_files(dir: &FsPath, keep: impl Fn(&str) -> bool) -> std::io::Result<Vec<String>> {
    let mut names = Vec::new();
    if !dir.is_dir() {
        return Ok(names);
    }

    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if keep(&name) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Lists uploaded PDFs and generated artifacts.
pub async fn status(State(config): State<Config>) -> Result<impl IntoResponse, AppError> {
    let uploaded_files = list_files(&config.upload_dir, |n| n.ends_with(".pdf"))
        .await
        .map_err(|e| AppError::internal("Status check failed", e))?;
    let output_files = list_files(&config.output_dir, |n| {
        n.ends_with(".xlsx") || n.ends_with(".docx")
    })
    .await
    .map_err(|e| AppError::internal("Status check failed", e))?;

    Ok(Json(ApiResponse::data(json!({
        "uploaded_files": uploaded_files,
        "output_files": output_files,
        "upload_folder_exists": config.upload_dir.is_dir(),
        "output_folder_exists": config.output_dir.is_dir(),
        "timestamp": Local::now().to_rfc3339(),
    }))))
}

/// Returns a tabular artifact as JSON records.
pub async fn results(
    State(config): State<Config>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let path = output_path(&config, &filename)?;
    if !path.is_file() {
        return Err(AppError::NotFound("Results file not found".to_string()));
    }

    if !is_tabular(&filename) {
        return Err(AppError::BadRequest(
            "Only Excel files can be returned as JSON".to_string(),
        ));
    }

    let records = tokio::task::spawn_blocking(move || read_records(&path))
        .await?
        .map_err(|e| AppError::internal("Failed to get results", e))?;

    Ok(Json(ApiResponse::data(json!({
        "total_questions": records.len(),
        "results": records,
        "filename": filename,
    }))))
}
