//! Error type for provider HTTP requests

/// Failure of a single logical request made through [`crate::HttpClient`].
///
/// Only [`HttpError::Exhausted`] is produced after retrying; every other
/// variant is raised on the first occurrence.
#[derive(Debug)]
pub enum HttpError {
    /// Non-2xx status outside the retryable set
    Status { url: String, status: u16 },
    /// Every attempt came back with a retryable status
    Exhausted { url: String, attempts: u32 },
    /// Body was not valid JSON
    Decode { url: String, status: u16 },
    /// Connection, timeout or request-building failure (no status)
    Transport { url: String, message: String },
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status { url, status } => write!(f, "HTTP {status} from {url}"),
            Self::Exhausted { url, attempts } => {
                write!(f, "failed after {attempts} attempts: {url}")
            }
            Self::Decode { url, status } => write!(f, "non-JSON from {url} (status {status})"),
            Self::Transport { url, message } => write!(f, "request to {url} failed: {message}"),
        }
    }
}

impl std::error::Error for HttpError {}

impl HttpError {
    /// Create transport error from reqwest error
    pub fn from_reqwest(url: &str, e: &reqwest::Error) -> Self {
        Self::Transport {
            url: url.to_string(),
            message: e.to_string(),
        }
    }
}
