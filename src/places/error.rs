use thiserror::Error;

/// Failure talking to the places provider
#[derive(Error, Debug)]
pub enum PlacesError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    #[error("Rate limit error: {0}")]
    RateLimitError(String),
}

impl From<reqwest_middleware::Error> for PlacesError {
    fn from(err: reqwest_middleware::Error) -> Self {
        PlacesError::NetworkError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PlacesError>;
