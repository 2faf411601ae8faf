//! Error handling for nestreq

use thiserror::Error;

/// Main error type for nestreq operations
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    BodyNotAllowed(String),

    #[error("Request aborted")]
    Aborted,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    #[error("Parameter nesting exceeds {0} levels")]
    DepthExceeded(usize),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Proxy error: {0}")]
    Proxy(String),

    #[error("{0}")]
    Config(String),

    #[error("Request has already been executed")]
    AlreadyExecuted,
}

impl RequestError {
    /// True when the request was cancelled through its abort handle.
    pub fn is_aborted(&self) -> bool {
        matches!(self, RequestError::Aborted)
    }

    /// True for failures reported by the transport collaborator.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            RequestError::Http(_) | RequestError::BodyNotAllowed(_)
        )
    }
}

/// Result type alias for nestreq operations
pub type Result<T> = std::result::Result<T, RequestError>;

#[cfg(test)]
mod tests {
    use super::RequestError;

    #[test]
    fn config_error_displays_bare_message() {
        let err = RequestError::Config(
            "Can not simultaneously send form and json in one request.".to_string(),
        );
        assert_eq!(
            err.to_string(),
            "Can not simultaneously send form and json in one request."
        );
    }

    #[test]
    fn aborted_is_not_a_transport_error() {
        let err = RequestError::Aborted;
        assert!(err.is_aborted());
        assert!(!err.is_transport());

        let err = RequestError::BodyNotAllowed("nope".to_string());
        assert!(err.is_transport());
        assert!(!err.is_aborted());
    }
}
