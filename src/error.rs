use thiserror::Error;

use crate::di::InjectionFailure;

pub type Result<T> = std::result::Result<T, NestrsError>;

#[derive(Debug, Error)]
pub enum NestrsError {
    #[error("Service not found: {name}")]
    ServiceNotFound { name: String },

    #[error("Failed to downcast service '{name}' to {type_name}")]
    DowncastFailed { name: String, type_name: String },

    #[error("Failed to inject dependencies for {target}. Missing: [{}]", join(.failures))]
    InjectionFailed {
        target: String,
        failures: Vec<InjectionFailure>,
    },

    #[error(
        "Dependency injection failed for {} components:\n{}",
        .failures.len(),
        .failures.join("\n")
    )]
    StartupAborted { failures: Vec<String> },

    #[error("Module {name} not found")]
    ModuleNotFound { name: String },

    #[error("Invalid route metadata on field '{field}': {descriptor:?}")]
    InvalidRoute { field: String, descriptor: String },

    #[error("Route {path} rejected by the router: {reason}")]
    RouteRejected { path: String, reason: String },

    #[error("baseUrl is required for controller {controller}")]
    MissingBaseUrl { controller: String },

    #[error("Missing path parameter: {name}")]
    MissingParam { name: String },

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

fn join(failures: &[InjectionFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl NestrsError {
    /// HTTP status used when this error reaches a client.
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;

        match self {
            NestrsError::ServiceNotFound { .. } | NestrsError::ModuleNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            NestrsError::MissingParam { .. } | NestrsError::InvalidBody(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl axum::response::IntoResponse for NestrsError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = crate::common::ErrorEnvelope::new(self.to_string());
        (status, axum::Json(body)).into_response()
    }
}
