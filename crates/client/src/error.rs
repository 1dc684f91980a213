use signdesk_core::error::CoreError;

/// Errors from the REST client layer.
///
/// Every variant is recoverable: the caller shows
/// [`ApiError::user_message`] in a blocking alert and the user may retry.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The backend answered 404 for this resource.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// No session, or the backend rejected the bearer token.
    #[error("Not authenticated")]
    Unauthenticated,

    /// The response body did not match the expected shape.
    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// A base URL could not be combined with a request path.
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),

    /// A domain rule blocked the request before it was sent.
    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Text for the blocking alert shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Request(_) => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            Self::Api { status, .. } if *status >= 500 => {
                "The server could not complete the request. Try again later.".to_string()
            }
            Self::Api { status, .. } => format!("The request was rejected (HTTP {status})."),
            Self::NotFound(_) => "The requested item was not found.".to_string(),
            Self::Unauthenticated => "Your session has expired. Please sign in again.".to_string(),
            Self::Decode(_) => "The server sent an unexpected response.".to_string(),
            Self::InvalidUrl(_) => "The client is misconfigured. Check the server URLs.".to_string(),
            Self::Core(err) => err.to_string(),
        }
    }
}
