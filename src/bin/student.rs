// src/bin/student.rs

use exam_desk::config::Config;
use exam_desk::routes;
use exam_desk::state::AppState;
use exam_desk::utils::logging::init_tracing;

#[tokio::main]
async fn main() {
    let config = Config::from_env("STUDENT_PORT", 5001);
    assert!(config.session_secret.is_some(), "SESSION_SECRET must be set");
    let _guard = init_tracing(&config, "student");

    let state = AppState::from_config(config.clone());
    let app = routes::student_router(state);

    let addr = config.socket_addr();
    tracing::info!("Student portal listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();

    axum::serve(listener, app).await.unwrap();
}
