// src/evaluation/command.rs

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;

use super::{EvaluationError, Evaluator};

/// Runs the OCR and grading modules as external commands.
///
/// * extract: `<ocr_command> <question.pdf> <answer.pdf> <output_dir>`
/// * evaluate: `<evaluate_command> <spreadsheet> <output_dir>`
///
/// Each command prints the path of the file it produced as the last line of
/// stdout. A bare file name is resolved against `output_dir`.
#[derive(Debug, Clone, Default)]
pub struct CommandEvaluator {
    ocr_command: Option<String>,
    evaluate_command: Option<String>,
}

impl CommandEvaluator {
    pub fn new(ocr_command: Option<String>, evaluate_command: Option<String>) -> Self {
        Self {
            ocr_command,
            evaluate_command,
        }
    }

    async fn run(
        &self,
        command_line: &str,
        args: &[&Path],
        output_dir: &Path,
    ) -> Result<PathBuf, EvaluationError> {
        let mut parts = command_line.split_whitespace();
        let program = parts
            .next()
            .ok_or(EvaluationError::NoOutput { command: command_line.to_string() })?;

        tracing::info!("Running {} on {:?}", command_line, args);
        let output = Command::new(program)
            .args(parts)
            .args(args)
            .arg(output_dir)
            .output()
            .await
            .map_err(|source| EvaluationError::Launch {
                command: command_line.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(EvaluationError::Failed {
                command: command_line.to_string(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let reported = stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .last()
            .ok_or(EvaluationError::NoOutput { command: command_line.to_string() })?;

        let mut path = PathBuf::from(reported);
        if path.is_relative() && !path.exists() {
            path = output_dir.join(path);
        }
        if !path.exists() {
            return Err(EvaluationError::MissingOutput(path));
        }
        Ok(path)
    }
}

#[async_trait]
impl Evaluator for CommandEvaluator {
    async fn extract(
        &self,
        question_pdf: &Path,
        answer_pdf: &Path,
        output_dir: &Path,
    ) -> Result<PathBuf, EvaluationError> {
        let command = self
            .ocr_command
            .as_deref()
            .ok_or(EvaluationError::NotConfigured("OCR_COMMAND"))?;
        self.run(command, &[question_pdf, answer_pdf], output_dir).await
    }

    async fn evaluate(
        &self,
        spreadsheet: &Path,
        output_dir: &Path,
    ) -> Result<PathBuf, EvaluationError> {
        let command = self
            .evaluate_command
            .as_deref()
            .ok_or(EvaluationError::NotConfigured("EVALUATE_COMMAND"))?;
        self.run(command, &[spreadsheet], output_dir).await
    }
}
