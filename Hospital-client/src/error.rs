use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response (connect, DNS, TLS, timeout)
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered outside 200-299
    #[error("API error ({status}): {}", .message.as_deref().unwrap_or(.body.as_str()))]
    Status {
        status: u16,
        /// `message` from the response envelope, when present
        message: Option<String>,
        /// Raw response body
        body: String,
    },

    #[error("Invalid JSON in response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The envelope reported success but carried no `data`
    #[error("Response from {0} has no data")]
    MissingData(String),

    /// The stored token cannot be sent as an `Authorization` header
    #[error("Stored token is not a valid header value")]
    InvalidToken,

    #[error("Token storage failed: {0}")]
    TokenStore(#[from] std::io::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for a 401, meaning the stored token is missing, expired or rejected
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}
