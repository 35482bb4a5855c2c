use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("HTTP {status} for {url}")]
    StatusError { url: String, status: u16 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A cell that must hold an integer did not.
    #[error("Expected a number in {field}, found '{value}'")]
    ParseError { field: String, value: String },

    #[error("Invalid year: '{0}'")]
    InvalidYear(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl ScanError {
    /// True for failures that describe the network rather than the data.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            ScanError::HttpError(_) | ScanError::StatusError { .. } | ScanError::InvalidUrl(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
