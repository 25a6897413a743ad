//! Error types.
//!
//! - [`PipelineError`]: failures of the data pipeline (schema, parsing, forecasting).
//! - [`AppError`]: what the binary reports; a message plus the process exit code.

use chrono::NaiveDate;
use thiserror::Error;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors raised by the validate → filter → aggregate → forecast → evaluate pipeline.
///
/// Every variant is terminal for the current run only.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("Missing required column(s): {}", fmt_columns(.missing))]
    Schema { missing: Vec<String> },

    #[error("Line {line}: invalid `{column}` value '{value}': {reason}")]
    Format {
        line: usize,
        column: String,
        value: String,
        reason: String,
    },

    #[error("No data for selected filters")]
    EmptyResult,

    #[error("Invalid forecast horizon {0}: must be a positive number of days")]
    InvalidHorizon(i64),

    #[error("Insufficient data: need at least {needed} daily points, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("Forecast of {horizon} day(s) after {last} runs past the supported calendar range")]
    DateOverflow { last: NaiveDate, horizon: usize },

    #[error("Failed to read CSV: {0}")]
    Read(String),
}

impl PipelineError {
    /// Process exit code used when this error ends a CLI run.
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::Schema { .. }
            | PipelineError::Format { .. }
            | PipelineError::InvalidHorizon(_)
            | PipelineError::Read(_) => 2,
            PipelineError::EmptyResult
            | PipelineError::InsufficientData { .. }
            | PipelineError::DateOverflow { .. } => 3,
        }
    }
}

fn fmt_columns(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| format!("`{c}`"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
