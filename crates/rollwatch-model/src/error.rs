use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid lookup base url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("lookup base url cannot carry a query: {0}")]
    NotABase(String),

    #[error("roster is empty")]
    EmptyRoster,
}
