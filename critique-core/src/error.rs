use thiserror::Error;

/// Default message when the backend reports failure without saying why.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Every way a backend call can fail.
///
/// `Display` is the user-facing message: the TUI shows `err.to_string()` verbatim
/// in the error panel, so each variant formats to something a person can act on.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never completed (connection refused, DNS, TLS, timeout).
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("Server error: {status}{}", detail_suffix(.detail))]
    Server { status: u16, detail: Option<String> },

    /// A well-formed response carrying `success: false`.
    #[error("{0}")]
    Rejected(String),

    /// The response body did not have the expected shape.
    #[error("Unexpected response from server: {0}")]
    Malformed(String),

    /// The configured server URL cannot be joined with an API path.
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Builds a `Rejected` error, substituting [`UNKNOWN_ERROR`] for a missing or
    /// empty server message.
    pub fn rejected(message: Option<String>) -> Self {
        match message {
            Some(m) if !m.is_empty() => ApiError::Rejected(m),
            _ => ApiError::Rejected(UNKNOWN_ERROR.to_owned()),
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(d) if !d.is_empty() => format!(" - {d}"),
        _ => String::new(),
    }
}

/// Failures of the local preference store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("preference store: {0}")]
    Sqlite(#[from] tokio_rusqlite::Error),
    #[error("preference store: {0}")]
    Open(#[from] rusqlite::Error),
    #[error("preference store: cannot create {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
