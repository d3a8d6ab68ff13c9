use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataHubError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Arrow error: {0}")]
    ArrowError(String),

    #[error("Date parsing error: {0}")]
    DateError(#[from] chrono::ParseError),

    #[error("Market data API error: {0}")]
    ApiError(String),

    #[error("Data error: {0}")]
    DataError(String),

    /// Every record in the window has a non-positive high, so there is no floor price
    #[error("No valid price data for symbol {0}")]
    NoValidPriceData(String),
}

pub type Result<T> = std::result::Result<T, DataHubError>;

impl From<arrow::error::ArrowError> for DataHubError {
    fn from(e: arrow::error::ArrowError) -> Self {
        DataHubError::ArrowError(e.to_string())
    }
}
