// src/bin/teacher.rs

use exam_desk::config::Config;
use exam_desk::routes;
use exam_desk::state::AppState;
use exam_desk::store::CsvStore;
use exam_desk::utils::logging::init_tracing;

#[tokio::main]
async fn main() {
    // Load configuration from environment (.env included)
    let config = Config::from_env("TEACHER_PORT", 5000);
    let _guard = init_tracing(&config, "teacher");

    // Create the ledger directories up front
    let store = CsvStore::new(config.data_dir.clone());
    if let Err(e) = store.ensure_layout().await {
        tracing::error!("Failed to prepare {}: {:?}", config.data_dir.display(), e);
    }
    tracing::info!("Database directory: {}", store.root().display());
    tracing::info!("Static directory: {}", config.static_dir.display());

    let state = AppState::from_config(config.clone());
    let app = routes::teacher_router(state);

    let addr = config.socket_addr();
    tracing::info!("Teacher portal listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();

    axum::serve(listener, app).await.unwrap();
}
