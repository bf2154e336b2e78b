use crate::common::ErrorEnvelope;
use crate::error::{NestrsError, Result};
use axum::body::{Body, Bytes};
use axum::http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use uuid::Uuid;

const SERIALIZE_FAILED: &str = "Failed to serialize response";

/// An incoming HTTP request, detached from the transport
#[derive(Debug, Clone)]
pub struct Request {
    pub id: Uuid,
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    /// Path parameters captured by the route template
    pub params: HashMap<String, String>,
    pub body: Bytes,
}

impl Request {
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            id: Uuid::new_v4(),
            method,
            uri,
            headers: HeaderMap::new(),
            params: HashMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Response under construction
///
/// Tracks whether the handler has written anything. Setting a status or
/// writing bytes counts as a write; setting headers alone does not.
#[derive(Debug, Clone)]
pub struct ResponseSink {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
    written: bool,
}

impl ResponseSink {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Vec::new(),
            written: false,
        }
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
        self.written = true;
    }

    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    pub fn write(&mut self, bytes: &[u8]) {
        self.body.extend_from_slice(bytes);
        self.written = true;
    }

    pub fn is_written(&self) -> bool {
        self.written
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Replace status, content type and body with a JSON document
    pub fn write_json<T: Serialize + ?Sized>(&mut self, status: StatusCode, value: &T) {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.replace_json(status, bytes),
            Err(err) => {
                tracing::error!(error = %err, "Failed to serialize response");
                let fallback = serde_json::to_vec(&ErrorEnvelope::new(SERIALIZE_FAILED))
                    .unwrap_or_else(|_| SERIALIZE_FAILED.as_bytes().to_vec());
                self.replace_json(StatusCode::INTERNAL_SERVER_ERROR, fallback);
            }
        }
    }

    fn replace_json(&mut self, status: StatusCode, bytes: Vec<u8>) {
        self.set_header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.body.clear();
        self.set_status(status);
        self.write(&bytes);
    }
}

impl Default for ResponseSink {
    fn default() -> Self {
        Self::new()
    }
}

impl IntoResponse for ResponseSink {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Per-request handler context
///
/// Every dispatch creates a fresh context, so concurrent requests against the
/// same controller never share request state.
#[derive(Debug)]
pub struct Context {
    request: Request,
    response: ResponseSink,
}

impl Context {
    pub fn new(request: Request) -> Self {
        Self {
            request,
            response: ResponseSink::new(),
        }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn request_id(&self) -> Uuid {
        self.request.id
    }

    pub fn response(&self) -> &ResponseSink {
        &self.response
    }

    pub fn response_mut(&mut self) -> &mut ResponseSink {
        &mut self.response
    }

    /// Look up a path parameter by name
    pub fn param(&self, name: &str) -> Option<&str> {
        self.request.params.get(name).map(String::as_str)
    }

    /// Like [`Context::param`], failing with [`NestrsError::MissingParam`]
    pub fn require_param(&self, name: &str) -> Result<&str> {
        self.param(name).ok_or_else(|| NestrsError::MissingParam {
            name: name.to_string(),
        })
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.request
            .headers
            .get(name)
            .and_then(|value| value.to_str().ok())
    }

    /// Deserialize the request body as JSON
    pub fn body_json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.request.body)
            .map_err(|err| NestrsError::InvalidBody(err.to_string()))
    }

    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.response.set_header(name, value);
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.response.set_status(status);
    }

    pub fn write(&mut self, bytes: &[u8]) {
        self.response.write(bytes);
    }

    /// Respond with `200 OK` and a JSON body
    pub fn json<T: Serialize + ?Sized>(&mut self, value: &T) {
        self.response.write_json(StatusCode::OK, value);
    }

    pub fn json_with_status<T: Serialize + ?Sized>(&mut self, status: StatusCode, value: &T) {
        self.response.write_json(status, value);
    }

    /// Respond with `{"error": message}`
    pub fn error(&mut self, status: StatusCode, message: impl Into<String>) {
        self.response.write_json(status, &ErrorEnvelope::new(message));
    }

    /// Respond with the status and message mapped from a crate error
    pub fn fail(&mut self, err: &NestrsError) {
        self.error(err.status_code(), err.to_string());
    }

    pub fn is_written(&self) -> bool {
        self.response.is_written()
    }

    pub fn finish(self) -> ResponseSink {
        self.response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::{Value, json};

    fn context() -> Context {
        Context::new(Request::new(Method::GET, Uri::from_static("/users/7")).with_param("id", "7"))
    }

    #[test]
    fn test_param_lookup() {
        let ctx = context();
        assert_eq!(ctx.param("id"), Some("7"));
        assert!(ctx.param("name").is_none());
        assert!(matches!(
            ctx.require_param("name"),
            Err(NestrsError::MissingParam { .. })
        ));
    }

    #[test]
    fn test_headers_do_not_count_as_written() {
        let mut ctx = context();
        ctx.set_header(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        assert!(!ctx.is_written());

        ctx.write(b"hello");
        assert!(ctx.is_written());
        assert_eq!(ctx.response().body(), b"hello");
    }

    #[test]
    fn test_json_with_status_sets_content_type() {
        let mut ctx = context();
        ctx.json_with_status(StatusCode::CREATED, &json!({ "id": 1 }));

        let response = ctx.finish();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body, json!({ "id": 1 }));
    }

    #[test]
    fn test_unserializable_value_writes_500() {
        struct Broken;
        impl Serialize for Broken {
            fn serialize<S: serde::Serializer>(
                &self,
                _: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("broken"))
            }
        }

        let mut ctx = context();
        ctx.json(&Broken);

        let response = ctx.finish();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body, json!({ "error": "Failed to serialize response" }));
    }

    #[test]
    fn test_body_json() {
        #[derive(Deserialize)]
        struct NewUser {
            name: String,
        }

        let ctx = Context::new(
            Request::new(Method::POST, Uri::from_static("/users")).with_body(r#"{"name":"Ada"}"#),
        );
        assert_eq!(ctx.body_json::<NewUser>().unwrap().name, "Ada");

        let request = Request::new(Method::POST, Uri::from_static("/users")).with_body("nope");
        let ctx = Context::new(request);
        assert!(matches!(
            ctx.body_json::<NewUser>(),
            Err(NestrsError::InvalidBody(_))
        ));
    }
}
