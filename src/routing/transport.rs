use crate::controller::{Request, ResponseSink};
use crate::error::{NestrsError, Result};
use crate::metadata::HttpMethod;
use axum::Router;
use axum::body::Bytes;
use axum::extract::RawPathParams;
use axum::extract::rejection::RawPathParamsRejection;
use axum::http::{HeaderMap, Method, Uri};
use axum::routing::on;
use std::collections::HashSet;
use std::sync::Arc;

/// A callable bound to one route; turns a request into a finished response
pub type BoundHandler = Arc<dyn Fn(Request) -> ResponseSink + Send + Sync>;

/// The HTTP layer routes are bound to
///
/// Paths passed to [`Transport::register_route`] are already in native
/// `{name}` syntax.
pub trait Transport {
    /// Register `handler` for `method` on `path`
    ///
    /// # Errors
    /// Returns [`NestrsError::RouteRejected`] when the transport cannot route
    /// the path; nothing is registered in that case.
    fn register_route(
        &mut self,
        method: HttpMethod,
        path: &str,
        handler: BoundHandler,
    ) -> Result<()>;
}

/// [`Transport`] backed by an `axum::Router`
///
/// Every new path is first inserted into a `matchit` router, the matcher axum
/// itself uses, so a path axum would reject comes back as an error instead of
/// a panic.
#[derive(Default)]
pub struct AxumTransport {
    router: Router,
    matcher: matchit::Router<()>,
    bound: HashSet<(HttpMethod, String)>,
}

impl AxumTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_route(&mut self, method: HttpMethod, path: &str) -> Result<()> {
        let rejected = |reason: String| NestrsError::RouteRejected {
            path: path.to_string(),
            reason,
        };

        if self.bound.contains(&(method, path.to_string())) {
            return Err(rejected(format!("{method} is already routed")));
        }
        if !self.bound.iter().any(|(_, bound)| bound == path) {
            self.matcher
                .insert(path, ())
                .map_err(|err| rejected(err.to_string()))?;
        }
        Ok(())
    }

    pub fn into_router(self) -> Router {
        self.router
    }
}

impl Transport for AxumTransport {
    fn register_route(
        &mut self,
        method: HttpMethod,
        path: &str,
        handler: BoundHandler,
    ) -> Result<()> {
        self.check_route(method, path)?;

        let route = on(
            method.method_filter(),
            move |method: Method,
                  uri: Uri,
                  headers: HeaderMap,
                  params: std::result::Result<RawPathParams, RawPathParamsRejection>,
                  body: Bytes| {
                let handler = Arc::clone(&handler);
                async move {
                    let mut request = Request::new(method, uri);
                    request.headers = headers;
                    request.body = body;
                    if let Ok(params) = params {
                        request.params = params
                            .iter()
                            .map(|(name, value)| (name.to_string(), value.to_string()))
                            .collect();
                    }
                    handler(request)
                }
            },
        );

        let router = std::mem::take(&mut self.router);
        self.router = router.route(path, route);
        self.bound.insert((method, path.to_string()));
        Ok(())
    }
}

/// A route captured by [`RecordingTransport`]
#[derive(Clone)]
pub struct RecordedRoute {
    pub method: HttpMethod,
    pub path: String,
    pub handler: BoundHandler,
}

/// In-memory [`Transport`] that records registrations in order
///
/// Requests can be dispatched against the recorded routes with
/// [`RecordingTransport::call`], matching `{name}` segments by position. When
/// several routes match, the one with the fewest parameters wins.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    routes: Vec<RecordedRoute>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routes(&self) -> &[RecordedRoute] {
        &self.routes
    }

    /// `"<METHOD> <path>"` for every registration, in order
    pub fn registrations(&self) -> Vec<String> {
        self.routes
            .iter()
            .map(|route| format!("{} {}", route.method, route.path))
            .collect()
    }

    /// Dispatch a request to the most specific route matching method and path
    pub fn call(&self, method: HttpMethod, path: &str) -> Option<ResponseSink> {
        self.call_with(method, path, |request| request)
    }

    /// Like [`RecordingTransport::call`], letting the caller adjust the request
    pub fn call_with(
        &self,
        method: HttpMethod,
        path: &str,
        build: impl FnOnce(Request) -> Request,
    ) -> Option<ResponseSink> {
        let uri: Uri = path.parse().ok()?;
        let (route, params) = self
            .routes
            .iter()
            .filter(|route| route.method == method)
            .filter_map(|route| Some((route, match_path(&route.path, uri.path())?)))
            .min_by_key(|(_, params)| params.len())?;

        let mut request = Request::new(method.as_method(), uri);
        request.params = params;
        Some((route.handler)(build(request)))
    }
}

impl Transport for RecordingTransport {
    fn register_route(
        &mut self,
        method: HttpMethod,
        path: &str,
        handler: BoundHandler,
    ) -> Result<()> {
        self.routes.push(RecordedRoute {
            method,
            path: path.to_string(),
            handler,
        });
        Ok(())
    }
}

fn match_path(template: &str, path: &str) -> Option<std::collections::HashMap<String, String>> {
    let template: Vec<&str> = template.trim_end_matches('/').split('/').collect();
    let path: Vec<&str> = path.trim_end_matches('/').split('/').collect();
    if template.len() != path.len() {
        return None;
    }

    let mut params = std::collections::HashMap::new();
    for (expected, actual) in template.iter().zip(&path) {
        match expected.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(name) => {
                params.insert(name.trim_start_matches('*').to_string(), (*actual).to_string());
            }
            None if expected == actual => {}
            None => return None,
        }
    }
    Some(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_path() {
        let params = match_path("/users/{id}", "/users/42").unwrap();
        assert_eq!(params["id"], "42");

        assert!(match_path("/users/{id}", "/users").is_none());
        assert!(match_path("/users", "/posts").is_none());
        assert!(match_path("/users", "/users/").unwrap().is_empty());
    }

    fn noop() -> BoundHandler {
        Arc::new(|_request: Request| ResponseSink::new())
    }

    #[test]
    fn test_axum_transport_rejects_unroutable_paths() {
        let mut transport = AxumTransport::new();
        transport.register_route(HttpMethod::Get, "/files/{id}", noop()).unwrap();
        transport.register_route(HttpMethod::Post, "/files/{id}", noop()).unwrap();

        let err = transport
            .register_route(HttpMethod::Get, "/files/{*path}", noop())
            .unwrap_err();
        assert!(matches!(err, NestrsError::RouteRejected { .. }));
        assert!(transport.register_route(HttpMethod::Get, "/files/{id}", noop()).is_err());
        assert!(transport.register_route(HttpMethod::Get, "/x/{*rest}/more", noop()).is_err());
        assert!(transport.register_route(HttpMethod::Get, "/x/{}", noop()).is_err());
        assert!(transport.register_route(HttpMethod::Get, "/x/a{b", noop()).is_err());

        let _router = transport.into_router();
    }
}
