use thiserror::Error;

/// Failure talking to the interview service.
///
/// `Api` covers non-2xx responses, with whatever `detail` the service put in
/// the error body. `Transport` covers everything below that: DNS, refused
/// connections, malformed response bodies.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("service returned status {status}")]
    Api { status: u16, detail: Option<String> },
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ServiceError {
    /// Message shown to the user: the backend's `detail` verbatim when
    /// present, otherwise the caller's per-operation fallback.
    pub fn surface(&self, fallback: &str) -> String {
        match self {
            Self::Api {
                detail: Some(detail),
                ..
            } => detail.clone(),
            _ => fallback.to_string(),
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Api { status: 401 | 403, .. })
    }
}

/// Why a controller command did not complete.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    /// Rejected client-side before any request was made; session state is
    /// untouched.
    #[error("{0}")]
    Validation(String),
    /// A mutating request is still outstanding.
    #[error("another request is still in flight")]
    RequestInFlight,
    /// The request was made and failed; the same message is mirrored into
    /// `Session::alert`.
    #[error("{0}")]
    Service(String),
}
