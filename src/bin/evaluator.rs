// src/bin/evaluator.rs

use exam_desk::config::Config;
use exam_desk::routes;
use exam_desk::state::AppState;
use exam_desk::utils::logging::init_tracing;

#[tokio::main]
async fn main() {
    let config = Config::from_env("EVALUATOR_PORT", 5002);
    let _guard = init_tracing(&config, "evaluator");

    for dir in [&config.upload_dir, &config.output_dir] {
        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            tracing::error!("Failed to create {}: {:?}", dir.display(), e);
        }
    }

    if config.ocr_command.is_none() || config.evaluate_command.is_none() {
        tracing::warn!("OCR_COMMAND or EVALUATE_COMMAND is unset; /api/process will fail");
    }

    let state = AppState::from_config(config.clone());
    let app = routes::evaluator_router(state);

    let addr = config.socket_addr();
    tracing::info!("Evaluation service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();

    axum::serve(listener, app).await.unwrap();
}
