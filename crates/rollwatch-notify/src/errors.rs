use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("invalid webhook endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
}
