// src/handlers/student.rs

use axum::{
    Extension, Form, Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::{
        response::ApiResponse,
        student::{StudentLoginForm, StudentSubmission, TestCodeForm},
    },
    state::SharedStore,
    utils::session::{SessionClaims, session_cookie, sign_session},
};

/// Checks a test code against the ledger and opens a session for it.
///
/// On success the session cookie is set and the student is sent on to the
/// login page; unknown codes get 400.
pub async fn enter_code(
    State(store): State<SharedStore>,
    State(config): State<Config>,
    Form(form): Form<TestCodeForm>,
) -> Result<Response, AppError> {
    let code = form.test_code.trim();

    if code.is_empty() || !store.code_exists(code).await? {
        tracing::info!("Rejected test code {:?}", code);
        return Err(AppError::BadRequest("Enter a valid test code.".to_string()));
    }

    let token = sign_session(code, config.session_key()?, config.session_ttl_secs)?;
    let cookie = session_cookie(&token, config.session_ttl_secs);

    Ok((
        [(header::SET_COOKIE, cookie)],
        Redirect::to("/student_login"),
    )
        .into_response())
}

/// Returns the test code of the current session for the login page.
pub async fn login_page(Extension(claims): Extension<SessionClaims>) -> impl IntoResponse {
    Json(json!({ "test_code": claims.test_code() }))
}

/// Records the student's identity against the session's test code.
/// Every login appends a row; repeats are not merged.
pub async fn student_login(
    State(store): State<SharedStore>,
    Extension(claims): Extension<SessionClaims>,
    Form(form): Form<StudentLoginForm>,
) -> Result<Redirect, AppError> {
    let form = StudentLoginForm {
        name: form.name.trim().to_string(),
        roll_number: form.roll_number.trim().to_string(),
        email: form.email.trim().to_string(),
    };
    if let Err(validation_errors) = form.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let submission = StudentSubmission {
        name: form.name,
        roll_number: form.roll_number,
        email: form.email,
        unique_code: claims.test_code().to_string(),
    };

    store.append_student(&submission).await.map_err(|e| {
        tracing::error!("Error saving student details: {:?}", e);
        AppError::from(e)
    })?;

    tracing::info!(
        "Student {} registered for test {}",
        submission.roll_number,
        submission.unique_code
    );

    Ok(Redirect::to("/test_instruction"))
}

/// Moves from the instruction page to the test itself.
pub async fn test_instruction(Extension(claims): Extension<SessionClaims>) -> Redirect {
    Redirect::to(&format!("/student_test_portal/{}", claims.test_code()))
}

/// Returns a test's details and questions, or a plain-text 404.
pub async fn student_test_portal(
    State(store): State<SharedStore>,
    Path(test_code): Path<String>,
) -> Result<Response, AppError> {
    let details = store.find_test(&test_code).await?;
    let questions = store.load_questions(&test_code).await?;

    match (details, questions) {
        (Some(details), Some(questions)) if !questions.is_empty() => Ok(Json(json!({
            "test_details": details,
            "questions": questions,
        }))
        .into_response()),
        _ => Ok((
            StatusCode::NOT_FOUND,
            "Test details or questions not found",
        )
            .into_response()),
    }
}

/// Final hand-in of a test. Answers are not graded here.
pub async fn submit() -> impl IntoResponse {
    Json(ApiResponse::message("Test submitted successfully"))
}
