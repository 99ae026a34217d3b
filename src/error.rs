use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookSearchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Search engine returned {status}: {body}")]
    Engine { status: u16, body: String },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, BookSearchError>;

impl BookSearchError {
    pub fn engine(status: reqwest::StatusCode, body: impl Into<String>) -> Self {
        BookSearchError::Engine {
            status: status.as_u16(),
            body: body.into(),
        }
    }
}
