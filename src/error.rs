use thiserror::Error as ThisError;

/// Failure talking to the remote price source.
///
/// Causes are kept apart for logging only; callers treat every variant as a
/// single fetch failure.
#[derive(ThisError, Debug)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status} for {symbol}")]
    Status { symbol: String, status: u16 },

    #[error("Unknown symbol {symbol}: {message}")]
    Symbol { symbol: String, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Failure inside a pure reshape/compute step.
#[derive(ThisError, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Row {name} has {found} values but the date axis has {expected}")]
    RaggedRow {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("Duplicate series: {0}")]
    DuplicateSeries(String),

    #[error("Unknown series: {0}")]
    UnknownSeries(String),
}

/// Outcome of a failed render pass.
///
/// An empty company selection is not a failure; it is a normal section state.
#[derive(ThisError, Debug)]
pub enum RenderFailure {
    #[error("Fetch failure: {0}")]
    Fetch(#[from] SourceError),

    #[error("Transform failure: {0}")]
    Transform(#[from] TransformError),
}

#[derive(ThisError, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Render(#[from] RenderFailure),
}

impl From<tokio::io::Error> for AppError {
    fn from(err: tokio::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Io(format!("CSV error: {}", err))
    }
}

impl From<SourceError> for AppError {
    fn from(err: SourceError) -> Self {
        AppError::Render(RenderFailure::Fetch(err))
    }
}

impl From<TransformError> for AppError {
    fn from(err: TransformError) -> Self {
        AppError::Render(RenderFailure::Transform(err))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

// Alias for convenience
pub type Error = AppError;
