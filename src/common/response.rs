use axum::{
    Json,
    http::StatusCode as HttpStatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Standard success envelope
///
/// Every key is optional so handlers can pick the subset they need:
/// `data` for a payload, `count` for list sizes, `message` for human text and
/// `status` for a short outcome tag.
///
/// # Example
/// ```
/// use nestrs::common::Envelope;
/// use serde_json::json;
///
/// let envelope = Envelope::with_data(json!([1, 2, 3]))
///     .count(3)
///     .message("Users listed");
/// assert_eq!(envelope.count, Some(3));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Envelope {
    /// Create an envelope carrying a payload under `data`
    pub fn with_data(data: impl Into<Value>) -> Self {
        Self {
            data: Some(data.into()),
            ..Self::default()
        }
    }

    /// Create an envelope carrying only a `message`
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Create a `{"data": [...], "count": n}` envelope
    pub fn list(items: Vec<Value>) -> Self {
        let count = items.len();
        Self {
            data: Some(Value::Array(items)),
            count: Some(count),
            ..Self::default()
        }
    }

    pub fn count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Shorthand for `status("success")`
    pub fn success(self) -> Self {
        self.status("success")
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        (HttpStatusCode::OK, Json(self)).into_response()
    }
}

/// Error envelope: `{"error": "<description>"}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
}

impl ErrorEnvelope {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_skips_empty_keys() {
        let value = serde_json::to_value(Envelope::with_message("hello")).unwrap();
        assert_eq!(value, json!({ "message": "hello" }));
    }

    #[test]
    fn test_list_envelope_counts_items() {
        let value = serde_json::to_value(Envelope::list(vec![json!(1), json!(2)])).unwrap();
        assert_eq!(value, json!({ "data": [1, 2], "count": 2 }));
    }

    #[test]
    fn test_error_envelope_shape() {
        let value = serde_json::to_value(ErrorEnvelope::new("User not found")).unwrap();
        assert_eq!(value, json!({ "error": "User not found" }));
    }
}
