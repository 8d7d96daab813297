use serde_json::Value;
use thiserror::Error;

/// Every failure the API client can report, normalized to one readable message.
///
/// `Display` is the message shown to the user: for `Status` that is exactly
/// the server's `detail` (or the status text when there is none).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("{0}")]
    Network(String),

    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Could not encode request: {0}")]
    Encode(String),
}

impl ApiError {
    /// Build a status error from a parsed (possibly null) body
    pub fn from_status(status: u16, status_text: &str, body: &Value) -> Self {
        let message = detail_message(body).unwrap_or_else(|| {
            if status_text.is_empty() {
                format!("Request failed with status {}", status)
            } else {
                status_text.to_string()
            }
        });
        ApiError::Status { status, message }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Page actions report failures as plain messages
impl From<ApiError> for String {
    fn from(error: ApiError) -> Self {
        error.to_string()
    }
}

/// Extract a readable message from a `detail` field.
///
/// FastAPI validation errors carry an array of `{loc, msg, type}` objects;
/// those are flattened to their `msg` strings.
fn detail_message(body: &Value) -> Option<String> {
    match body.get("detail")? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let msgs: Vec<String> = items
                .iter()
                .map(|item| match item.get("msg").and_then(Value::as_str) {
                    Some(msg) => msg.to_string(),
                    None => item.to_string(),
                })
                .collect();
            if msgs.is_empty() {
                None
            } else {
                Some(msgs.join("; "))
            }
        }
        other => Some(other.to_string()),
    }
}
