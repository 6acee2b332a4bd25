use std::sync::Arc;

use crate::config::Config;
use crate::evaluation::{CommandEvaluator, Evaluator};
use crate::store::{CsvStore, ExamStore};
use axum::extract::FromRef;

pub type SharedStore = Arc<dyn ExamStore>;
pub type SharedEvaluator = Arc<dyn Evaluator>;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: SharedStore,
    pub evaluator: SharedEvaluator,
}

impl AppState {
    /// State backed by the CSV store under `config.data_dir` and the
    /// configured external commands.
    pub fn from_config(config: Config) -> Self {
        let store = Arc::new(CsvStore::new(config.data_dir.clone()));
        let evaluator = Arc::new(CommandEvaluator::new(
            config.ocr_command.clone(),
            config.evaluate_command.clone(),
        ));
        Self {
            config,
            store,
            evaluator,
        }
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for SharedStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for SharedEvaluator {
    fn from_ref(state: &AppState) -> Self {
        state.evaluator.clone()
    }
}
