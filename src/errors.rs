use thiserror::Error;

#[derive(Error, Debug)]
pub enum PriceHubError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Arrow error: {0}")]
    ArrowError(String),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),

    #[error("Date parsing error: {0}")]
    DateError(#[from] chrono::ParseError),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

pub type Result<T> = std::result::Result<T, PriceHubError>;

impl From<String> for PriceHubError {
    fn from(s: String) -> Self {
        PriceHubError::Unknown(s)
    }
}

impl From<&str> for PriceHubError {
    fn from(s: &str) -> Self {
        PriceHubError::Unknown(s.to_string())
    }
}
