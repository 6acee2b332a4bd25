// src/routes.rs

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{Method, header},
    middleware,
    routing::{get, get_service, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::{
    handlers::{evaluation, student, teacher},
    state::AppState,
    utils::session::session_middleware,
};

/// Assembles the teacher application.
///
/// * `POST /submit_test_details` publishes a test.
/// * `GET /check_directories` reports the storage layout.
/// * Everything else is served from the static frontend directory.
pub fn teacher_router(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();

    Router::new()
        .route("/submit_test_details", post(teacher::submit_test_details))
        .route("/check_directories", get(teacher::check_directories))
        .route_service(
            "/TP_create_exam",
            ServeFile::new(static_dir.join("TP_create_exam.html")),
        )
        .fallback_service(ServeDir::new(static_dir))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Assembles the student application.
///
/// Login and the instruction step need the session opened by `POST /`.
pub fn student_router(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();

    let session_routes = Router::new()
        .route(
            "/student_login",
            get(student::login_page).post(student::student_login),
        )
        .route(
            "/test_instruction",
            get_service(ServeFile::new(static_dir.join("test_instruction.html")))
                .post(student::test_instruction),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ));

    Router::new()
        .route(
            "/",
            get_service(ServeFile::new(static_dir.join("index.html"))).post(student::enter_code),
        )
        .route(
            "/student_test_portal/{test_code}",
            get(student::student_test_portal),
        )
        .route("/submit", post(student::submit))
        .merge(session_routes)
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Assembles the evaluation service: the JSON API under `/api` plus the
/// legacy unprefixed upload/process/download routes.
pub fn evaluator_router(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let api_routes = Router::new()
        .route("/health", get(evaluation::health_check))
        .route("/upload", post(evaluation::upload_files))
        .route("/process", post(evaluation::process))
        .route("/download/{filename}", get(evaluation::download_file))
        .route("/status", get(evaluation::status))
        .route("/results/{filename}", get(evaluation::results));

    let legacy_routes = Router::new()
        .route("/upload", post(evaluation::upload_files))
        .route("/process", post(evaluation::process))
        .route("/download/{filename}", get(evaluation::download_file));

    Router::new()
        .nest("/api", api_routes)
        .merge(legacy_routes)
        .fallback_service(ServeDir::new(static_dir))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
