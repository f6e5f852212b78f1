// ABOUTME: Error taxonomy for engine gateway operations.
// ABOUTME: Connection, not-found, and other engine API failures, passed through verbatim.

use thiserror::Error;

/// Failure of a remote engine call.
///
/// The gateway never retries or translates these; callers decide what a
/// failure means for the instance they were managing.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Endpoint unreachable, refused, timed out, or not speaking the API.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The engine answered 404 for the referenced image or container.
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other non-success engine response.
    #[error("engine API error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connection,
    NotFound,
    Api,
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Connection(_) => ErrorKind::Connection,
            GatewayError::NotFound(_) => ErrorKind::NotFound,
            GatewayError::Api { .. } => ErrorKind::Api,
        }
    }

    /// Only transport failures are worth retrying without caller action.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Connection
    }

    /// The engine refused because the name is taken (or a similar 409).
    pub fn is_conflict(&self) -> bool {
        matches!(self, GatewayError::Api { status: 409, .. })
    }

    /// HTTP status reported by the engine, if it answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Connection(_) => None,
            GatewayError::NotFound(_) => Some(404),
            GatewayError::Api { status, .. } => Some(*status),
        }
    }
}

impl From<bollard::errors::Error> for GatewayError {
    fn from(e: bollard::errors::Error) -> Self {
        match e {
            bollard::errors::Error::DockerResponseServerError {
                status_code: 404,
                message,
            } => GatewayError::NotFound(message),
            bollard::errors::Error::DockerResponseServerError {
                status_code,
                message,
            } => GatewayError::Api {
                status: status_code,
                message,
            },
            // Error items inside a streamed response (e.g. pull progress).
            e @ bollard::errors::Error::DockerStreamError { .. } => GatewayError::Api {
                status: 500,
                message: e.to_string(),
            },
            // The engine answered but the body did not match the API schema.
            e @ bollard::errors::Error::JsonSerdeError { .. } => GatewayError::Api {
                status: 500,
                message: e.to_string(),
            },
            e => GatewayError::Connection(e.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
