use std::fmt;

/// Errors surfaced by the backend client and the viewer.
///
/// Every variant is recoverable at the UI layer: the front end turns it
/// into a notification and waits for the user to try again.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport-level failure: server unreachable, connection reset, or a
    /// 2xx answer whose body is not the expected JSON ("invalid response
    /// body"). Both mean the request produced nothing usable.
    #[error("network error: {0}")]
    Network(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The backend answered with a non-2xx status.
    #[error("{}", HttpMessage(.status, .detail))]
    Http { status: u16, detail: Option<String> },

    /// Malformed base64 payload.
    #[error("invalid base64 payload: {0}")]
    Decode(String),

    /// The payload decoded but is not a displayable model.
    #[error("failed to load model: {0}")]
    Load(String),

    /// Rendering surface unavailable.
    #[error("viewer initialization failed: {0}")]
    Init(String),

    /// A frame could not be presented to the surface.
    #[error("surface error: {0}")]
    Surface(String),

    /// Local persisted state could not be read or written.
    #[error("storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, Error>;

struct HttpMessage<'a>(&'a u16, &'a Option<String>);

impl fmt::Display for HttpMessage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.1 {
            Some(detail) => f.write_str(detail),
            None => write!(f, "HTTP error! status: {}", self.0),
        }
    }
}

impl Error {
    /// HTTP status code, when the backend produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error::Decode(err.to_string())
    }
}
