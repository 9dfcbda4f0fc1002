//! Errors reported by the client.
use reqwest::StatusCode;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The service name is unknown to the resolver and is not a URL either.
    #[error("Service {0} was not found in the service directory")]
    ServiceNotFound(String),
    #[error("Locator {0} was not found")]
    UnknownLocator(String),
    #[error("Token not set")]
    EmptyToken,
    /// The service answered, but without a session token.
    #[error("({code}) {message}")]
    AuthenticationFailed { message: String, code: i64 },
    /// The response body could not be decoded.
    #[error("Invalid result dispatching; http-status: {status}; url: {url}; body: {body}")]
    InvalidResult {
        status: StatusCode,
        body: String,
        url: String,
    },
    /// The response body decoded fine but carries an error reported by the service.
    #[error("({code}) {message}; http-status: {status}; url: {url}")]
    ServiceError {
        message: String,
        code: i64,
        status: StatusCode,
        body: String,
        url: String,
    },
    /// The token contains characters that cannot be sent in a header.
    #[error("Token cannot be used in a header")]
    InvalidHeader,
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

impl Error {
    /// The code reported by the service, if any.
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::AuthenticationFailed { code, .. } | Self::ServiceError { code, .. } => {
                Some(*code)
            }
            Self::EmptyToken => Some(-4),
            Self::InvalidResult { .. } => Some(-3),
            _ => None,
        }
    }
}
