use super::transport::{AxumTransport, BoundHandler, Transport};
use crate::controller::{Context, Controller, HandlerFn, Request};
use crate::metadata::{
    HttpMethod, RouteSpec, extract_routes, is_parameterized, join_paths, to_native_path,
    validate_controller_base_url, validate_path,
};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// A route bound to a controller handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDescriptor {
    pub method: HttpMethod,
    /// Full path in `:name` syntax
    pub template: String,
    /// Full path in the transport's `{name}` syntax
    pub native_path: String,
    pub controller: &'static str,
    pub handler: &'static str,
}

/// Binds controller handler fields to a [`Transport`]
///
/// Within a controller, parameterized routes are bound before static ones;
/// each group keeps declaration order. A `(method, path)` pair is bound at
/// most once; later duplicates are logged and skipped.
pub struct Dispatcher<T: Transport = AxumTransport> {
    transport: T,
    routes: Vec<RouteDescriptor>,
    bound: HashSet<(HttpMethod, String)>,
    // Prefix ending in a parameter, names erased -> parameter segment bound there
    params: HashMap<String, String>,
}

impl Dispatcher<AxumTransport> {
    pub fn axum() -> Self {
        Self::new(AxumTransport::new())
    }
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            routes: Vec::new(),
            bound: HashSet::new(),
            params: HashMap::new(),
        }
    }

    /// Bind every route declared on `controller`
    ///
    /// Returns the number of routes bound. Configuration problems never fail
    /// startup: a controller without a base URL is skipped entirely, and a
    /// malformed, handler-less or duplicate route is skipped individually.
    pub fn bind_controller(&mut self, controller: Arc<dyn Controller>) -> usize {
        let metadata = controller.metadata();
        let base_url = match validate_controller_base_url(&metadata) {
            Ok(base_url) => base_url,
            Err(err) => {
                tracing::warn!(controller = metadata.type_name, "{err}, skipping controller");
                return 0;
            }
        };

        let extraction = extract_routes(&metadata);
        for invalid in &extraction.invalid {
            tracing::warn!(
                controller = metadata.type_name,
                field = invalid.field,
                descriptor = invalid.descriptor,
                "Invalid route metadata, skipping field"
            );
        }

        let (parameterized, fixed): (Vec<RouteSpec>, Vec<RouteSpec>) = extraction
            .routes
            .into_iter()
            .partition(|spec| is_parameterized(&spec.sub_path));

        let mut count = 0;
        for spec in parameterized.into_iter().chain(fixed) {
            if self.bind_route(&controller, metadata.type_name, base_url, spec) {
                count += 1;
            }
        }

        tracing::debug!(controller = metadata.type_name, routes = count, "Controller bound");
        count
    }

    fn bind_route(
        &mut self,
        controller: &Arc<dyn Controller>,
        controller_name: &'static str,
        base_url: &str,
        spec: RouteSpec,
    ) -> bool {
        let template = join_paths(base_url, &spec.sub_path);
        if let Err(err) = validate_path(&template) {
            tracing::warn!(
                controller = controller_name,
                field = spec.field,
                path = %template,
                "Invalid route path ({err}), skipping"
            );
            return false;
        }
        let native_path = to_native_path(&template);

        if self.bound.contains(&(spec.method, native_path.clone())) {
            tracing::warn!(
                controller = controller_name,
                field = spec.field,
                method = %spec.method,
                path = %template,
                "Route already bound, skipping duplicate"
            );
            return false;
        }

        let params = parameter_segments(&native_path);
        let conflict = params.iter().find_map(|(prefix, segment)| {
            self.params
                .get(prefix)
                .filter(|existing| *existing != segment)
                .map(|existing| (prefix, existing))
        });
        if let Some((prefix, existing)) = conflict {
            tracing::warn!(
                controller = controller_name,
                field = spec.field,
                path = %template,
                prefix = %prefix,
                existing = %existing,
                "Route conflicts with a differently named parameter, skipping"
            );
            return false;
        }

        let Some(handler) = Arc::clone(controller).handler(spec.field) else {
            tracing::warn!(
                controller = controller_name,
                field = spec.field,
                "Route metadata on a field without a handler, skipping"
            );
            return false;
        };

        let bound = bind_handler(handler, controller_name, spec.field);
        if let Err(err) = self.transport.register_route(spec.method, &native_path, bound) {
            tracing::warn!(
                controller = controller_name,
                field = spec.field,
                path = %template,
                "{err}, skipping"
            );
            return false;
        }

        tracing::info!(
            method = %spec.method,
            path = %template,
            controller = controller_name,
            handler = spec.field,
            "Mapped route"
        );

        self.bound.insert((spec.method, native_path.clone()));
        for (prefix, segment) in params {
            self.params.entry(prefix).or_insert(segment);
        }
        self.routes.push(RouteDescriptor {
            method: spec.method,
            template,
            native_path,
            controller: controller_name,
            handler: spec.field,
        });
        true
    }

    /// Bound routes in registration order
    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    pub fn print_routes(&self) {
        tracing::info!("HTTP routes ({}):", self.routes.len());
        for route in &self.routes {
            tracing::info!(
                "  {:<7} {} -> {}.{}",
                route.method,
                route.template,
                route.controller,
                route.handler
            );
        }
    }
}

/// Wrap a handler so each call gets a fresh context and a complete response
fn bind_handler(handler: HandlerFn, controller: &'static str, field: &'static str) -> BoundHandler {
    Arc::new(move |request: Request| {
        let span = tracing::info_span!(
            "request",
            request_id = %request.id,
            method = %request.method,
            path = %request.uri.path(),
            controller,
            handler = field,
        );
        let _guard = span.enter();
        tracing::debug!("Incoming request");

        let mut ctx = Context::new(request);
        let reply = handler(&mut ctx);
        let mut response = ctx.finish();
        reply.write_to(&mut response);

        tracing::debug!(status = %response.status(), "Request handled");
        response
    })
}

/// Every parameter segment keyed by its path prefix with parameter names erased
///
/// `/users/{id}/posts/{post}` yields `("/users/{}", "{id}")` and
/// `("/users/{}/posts/{}", "{post}")`. Wildcards erase to the same `{}`, so a
/// wildcard and a named parameter at one position collide.
fn parameter_segments(native_path: &str) -> Vec<(String, String)> {
    let mut prefix = String::new();
    let mut segments = Vec::new();
    for segment in native_path.split('/').filter(|segment| !segment.is_empty()) {
        prefix.push('/');
        if segment.starts_with('{') {
            prefix.push_str("{}");
        } else {
            prefix.push_str(segment);
            continue;
        }
        segments.push((prefix.clone(), segment.to_string()));
    }
    segments
}
