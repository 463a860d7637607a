use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid post url: {0}")]
    InvalidPostUrl(String),
}
