//! Error types.
//!
//! Two layers:
//!
//! - [`PipelineError`]: failures raised by the data pipeline and the fetchers.
//!   These carry enough context (stage + series) to diagnose a failed run.
//! - [`AppError`]: what the `nr` binary reports, with a process exit code.

use thiserror::Error;

/// Errors produced while fetching raw data or deriving the proxy series.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Network, HTTP or parse failure in one of the data-source fetchers.
    #[error("failed to fetch {source_name}: {message}")]
    DataFetch { source_name: String, message: String },

    /// An inner join produced zero rows (incompatible sample periods).
    #[error("inner join of '{left}' and '{right}' produced no rows")]
    Alignment { left: String, right: String },

    /// A filter or regression was given fewer observations than it needs.
    #[error("{filter} needs at least {required} observations, got {actual}")]
    FilterDomain {
        filter: &'static str,
        required: usize,
        actual: usize,
    },

    /// Division by zero or a non-finite result in rate arithmetic.
    #[error("arithmetic error: {0}")]
    Arithmetic(String),

    /// Malformed input (unparseable date, mixed frequencies, bad label...).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A failure inside a named pipeline stage.
    #[error("stage '{stage}' failed for series '{series}': {source}")]
    Stage {
        stage: &'static str,
        series: String,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    pub fn fetch(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DataFetch {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub fn alignment(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self::Alignment {
            left: left.into(),
            right: right.into(),
        }
    }

    /// The innermost error, skipping any stage wrappers.
    pub fn root(&self) -> &PipelineError {
        match self {
            Self::Stage { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Attach stage/series context to a pipeline result.
pub trait StageContext<T> {
    fn at_stage(self, stage: &'static str, series: &str) -> Result<T, PipelineError>;
}

impl<T> StageContext<T> for Result<T, PipelineError> {
    fn at_stage(self, stage: &'static str, series: &str) -> Result<T, PipelineError> {
        self.map_err(|source| PipelineError::Stage {
            stage,
            series: series.to_string(),
            source: Box::new(source),
        })
    }
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

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        let exit_code = match err.root() {
            PipelineError::InvalidInput(_) => 2,
            _ => 4,
        };
        AppError::new(exit_code, err.to_string())
    }
}
