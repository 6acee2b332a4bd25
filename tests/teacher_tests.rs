// tests/teacher_tests.rs

use std::{path::Path, sync::Arc};

use exam_desk::{
    config::{Config, DEFAULT_MAX_UPLOAD_BYTES},
    routes,
    state::AppState,
    store::CsvStore,
};
use reqwest::multipart::{Form, Part};
use tempfile::TempDir;

fn test_config(root: &Path) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        data_dir: root.join("Database"),
        upload_dir: root.join("uploads"),
        output_dir: root.join("outputs"),
        static_dir: root.join("UI"),
        session_secret: Some("teacher_test_secret".to_string()),
        session_ttl_secs: 600,
        ocr_command: None,
        evaluate_command: None,
        max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        rust_log: "error".to_string(),
    }
}

/// Spawns the teacher app on a random port over a fresh data directory.
/// Returns the base URL and the directory guard.
async fn spawn_app() -> (String, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = test_config(dir.path());

    let state = AppState {
        store: Arc::new(CsvStore::new(config.data_dir.clone())),
        evaluator: Arc::new(exam_desk::evaluation::CommandEvaluator::default()),
        config,
    };
    let app = routes::teacher_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, dir)
}

fn test_form() -> Form {
    Form::new()
        .text("name", "Midterm")
        .text("time", "10:00")
        .text("date", "2024-03-01")
        .text("duration", "90")
        .text("subject", "Physics")
        .text("faculty", "Dr. Rao")
        .text("total_marks", "15")
        .text("questions", "Define work.")
        .text("marks", "5")
        .text("questions", "State Newton's second law.")
        .text("marks", "10")
}

async fn submit(address: &str, form: Form) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{}/submit_test_details", address))
        .multipart(form)
        .send()
        .await
        .expect("Failed to execute request")
}

#[tokio::test]
async fn unknown_path_is_404() {
    let (address, _dir) = spawn_app().await;

    let response = reqwest::get(format!("{}/random_path_that_does_not_exist", address))
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn publishing_a_test_writes_ledger_and_questions() {
    let (address, dir) = spawn_app().await;

    let response = submit(&address, test_form()).await;
    assert_eq!(response.status().as_u16(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    let code = body["data"]["test_code"].as_str().expect("test_code missing");
    assert_eq!(code.len(), 8);
    assert!(body["data"]["question_pdf"].is_null());

    let ledger = std::fs::read_to_string(dir.path().join("Database/test_details.csv")).unwrap();
    let lines: Vec<&str> = ledger.lines().collect();
    assert_eq!(
        lines[0],
        "Name,Time,Date,Duration,Subject,Faculty Name,Total Marks,Unique Test Code,Question PDF"
    );
    assert_eq!(
        lines[1],
        format!("Midterm,10:00,2024-03-01,90,Physics,Dr. Rao,15,{},", code)
    );

    let questions = std::fs::read_to_string(
        dir.path()
            .join("Database/questions")
            .join(format!("{}_questions.csv", code)),
    )
    .unwrap();
    assert_eq!(
        questions,
        "Question,Marks\nDefine work.,5\nState Newton's second law.,10\n"
    );
}

#[tokio::test]
async fn two_tests_share_one_ledger_header() {
    let (address, dir) = spawn_app().await;

    let first = submit(&address, test_form()).await.json::<serde_json::Value>().await.unwrap();
    let second = submit(&address, test_form()).await.json::<serde_json::Value>().await.unwrap();
    assert_ne!(first["data"]["test_code"], second["data"]["test_code"]);

    let ledger = std::fs::read_to_string(dir.path().join("Database/test_details.csv")).unwrap();
    assert_eq!(ledger.lines().count(), 3);
    assert_eq!(ledger.lines().filter(|l| l.starts_with("Name,")).count(), 1);
}

#[tokio::test]
async fn missing_field_is_rejected() {
    let (address, dir) = spawn_app().await;
    let form = Form::new()
        .text("name", "Midterm")
        .text("time", "10:00")
        .text("date", "2024-03-01")
        .text("duration", "90")
        .text("faculty", "Dr. Rao")
        .text("total_marks", "15")
        .text("questions", "Define work.")
        .text("marks", "5");

    let response = submit(&address, form).await;

    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Missing form field: subject");
    assert!(!dir.path().join("Database/test_details.csv").exists());
}

#[tokio::test]
async fn questions_are_required() {
    let (address, _dir) = spawn_app().await;
    let form = Form::new()
        .text("name", "Midterm")
        .text("time", "10:00")
        .text("date", "2024-03-01")
        .text("duration", "90")
        .text("subject", "Physics")
        .text("faculty", "Dr. Rao")
        .text("total_marks", "15");

    let response = submit(&address, form).await;

    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Questions and marks are required");
}

#[tokio::test]
async fn mismatched_marks_are_rejected() {
    let (address, _dir) = spawn_app().await;
    let form = test_form().text("questions", "A third question without marks.");

    let response = submit(&address, form).await;

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn non_pdf_paper_is_rejected_and_not_stored() {
    let (address, dir) = spawn_app().await;
    let form = test_form().part(
        "question_pdf",
        Part::bytes(b"just notes".to_vec()).file_name("notes.txt"),
    );

    let response = submit(&address, form).await;

    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Uploaded file must be a PDF");
    assert!(!dir.path().join("Database/test_details.csv").exists());
    let papers = dir.path().join("Database/papers");
    assert!(!papers.exists() || std::fs::read_dir(papers).unwrap().next().is_none());
}

#[tokio::test]
async fn pdf_paper_is_stored_under_the_code() {
    let (address, dir) = spawn_app().await;
    let form = test_form().part(
        "question_pdf",
        Part::bytes(b"%PDF-1.4 sample".to_vec()).file_name("Physics.PDF"),
    );

    let response = submit(&address, form).await;
    assert_eq!(response.status().as_u16(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    let code = body["data"]["test_code"].as_str().unwrap();
    let paper = format!("{}_paper.pdf", code);
    assert_eq!(body["data"]["question_pdf"], paper.as_str());

    let saved = std::fs::read(dir.path().join("Database/papers").join(&paper)).unwrap();
    assert_eq!(saved, b"%PDF-1.4 sample");

    let ledger = std::fs::read_to_string(dir.path().join("Database/test_details.csv")).unwrap();
    assert!(ledger.lines().nth(1).unwrap().ends_with(&paper));
}

#[tokio::test]
async fn plain_text_symbols_are_stored_verbatim() {
    let (address, dir) = spawn_app().await;
    let form = Form::new()
        .text("name", "Quiz")
        .text("time", "09:00")
        .text("date", "2024-04-01")
        .text("duration", "30")
        .text("subject", "R&D <Maths>")
        .text("faculty", "Dr. Iyer")
        .text("total_marks", "5")
        .text("questions", "  Is 3 < 5 & 7 > 2?  ")
        .text("marks", "5");

    let body: serde_json::Value = submit(&address, form).await.json().await.unwrap();
    let code = body["data"]["test_code"].as_str().unwrap();

    let questions = std::fs::read_to_string(
        dir.path()
            .join("Database/questions")
            .join(format!("{}_questions.csv", code)),
    )
    .unwrap();
    assert_eq!(questions, "Question,Marks\nIs 3 < 5 & 7 > 2?,5\n");

    let ledger = std::fs::read_to_string(dir.path().join("Database/test_details.csv")).unwrap();
    assert!(ledger.contains(",R&D <Maths>,"));
}

#[tokio::test]
async fn check_directories_reports_layout() {
    let (address, _dir) = spawn_app().await;

    let body: serde_json::Value = reqwest::get(format!("{}/check_directories", address))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["database_exists"], false);
    assert_eq!(body["static_exists"], false);
    assert!(body["questions_dir"].as_str().unwrap().ends_with("questions"));
}
