use serde::{Deserialize, Serialize};

/// Error body the interview service attaches to non-2xx responses.
///
/// `detail` is optional on the wire; absent or unparseable bodies are
/// treated the same as a missing detail.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub detail: Option<String>,
}
