use serde::{Deserialize, Serialize};

/// Failure body the server attaches to rejected requests.
///
/// There is no error code, only human readable text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerErrorBody {
    pub error: String,
}

impl ServerErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    /// Extracts the `error` text from an arbitrary JSON body, if it carries one.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        value
            .get("error")
            .and_then(serde_json::Value::as_str)
            .map(Self::new)
    }
}
