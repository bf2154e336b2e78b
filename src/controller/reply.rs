use crate::common::{Envelope, ErrorEnvelope};
use crate::controller::ResponseSink;
use axum::http::StatusCode;
use serde::Serialize;
use serde_json::Value;

const NO_DATA: &str = "No data returned";
const INTERNAL_ERROR: &str = "Internal server error";

/// What a handler hands back to the dispatcher
///
/// The reply is only written when the handler did not write to the response
/// itself.
#[derive(Debug)]
pub enum Reply {
    /// `{"message": "No data returned"}`
    None,
    /// `{"message": ...}`
    Message(String),
    /// `{"data": [...], "count": n}`
    List(Vec<Value>),
    /// `{"data": ...}`; an `Err` becomes a 500 error envelope
    Data(serde_json::Result<Value>),
    /// Written verbatim
    Json(Value),
}

impl Reply {
    /// Serialize a value into a `data` reply
    pub fn data<T: Serialize + ?Sized>(value: &T) -> Self {
        Reply::Data(serde_json::to_value(value))
    }

    /// Serialize items into a `data`/`count` reply
    pub fn list<T: Serialize>(items: &[T]) -> Self {
        let values: serde_json::Result<Vec<Value>> =
            items.iter().map(serde_json::to_value).collect();
        match values {
            Ok(values) => Reply::List(values),
            Err(err) => Reply::Data(Err(err)),
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Reply::Message(message.into())
    }

    /// Write the reply unless the sink was already written
    pub fn write_to(self, sink: &mut ResponseSink) {
        if sink.is_written() {
            return;
        }

        match self {
            Reply::None => sink.write_json(StatusCode::OK, &Envelope::with_message(NO_DATA)),
            Reply::Message(message) => {
                sink.write_json(StatusCode::OK, &Envelope::with_message(message))
            }
            Reply::List(items) => sink.write_json(StatusCode::OK, &Envelope::list(items)),
            Reply::Data(Ok(value)) => sink.write_json(StatusCode::OK, &Envelope::with_data(value)),
            Reply::Data(Err(err)) => {
                tracing::error!(error = %err, "Failed to serialize handler result");
                sink.write_json(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &ErrorEnvelope::new(INTERNAL_ERROR),
                );
            }
            Reply::Json(value) => sink.write_json(StatusCode::OK, &value),
        }
    }
}

impl From<&str> for Reply {
    fn from(message: &str) -> Self {
        Reply::Message(message.to_string())
    }
}

impl From<String> for Reply {
    fn from(message: String) -> Self {
        Reply::Message(message)
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        Reply::Json(value)
    }
}

impl From<()> for Reply {
    fn from(_: ()) -> Self {
        Reply::None
    }
}
