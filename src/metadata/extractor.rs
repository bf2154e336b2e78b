use super::route::{HttpMethod, parse_route_descriptor};
use super::{Component, ComponentKind, ComponentMetadata};
use crate::error::{NestrsError, Result};
use std::str::FromStr;

/// Field names reserved for the base marker types; never routable or injectable
pub const MARKER_FIELDS: [&str; 3] = ["BaseController", "BaseService", "BaseModule"];

const CONTROLLER_SUFFIX: &str = "Controller";
const SERVICE_SUFFIX: &str = "Service";

/// Which metadata convention produced a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteSource {
    /// Explicit `"<METHOD> <path>"` descriptor
    Route,
    /// Method-only marker bound to the controller base URL
    Http,
}

/// A route discovered on a handler field, before joining with the base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSpec {
    pub field: &'static str,
    pub method: HttpMethod,
    /// Path relative to the controller base URL
    pub sub_path: String,
    pub source: RouteSource,
}

/// Routes found on a controller plus the fields whose metadata was malformed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteExtraction {
    pub routes: Vec<RouteSpec>,
    pub invalid: Vec<MalformedRoute>,
}

/// A handler field whose route metadata could not be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRoute {
    pub field: &'static str,
    pub descriptor: &'static str,
}

/// A `(field, service key)` pair requested by a target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InjectionRequest {
    pub field: &'static str,
    pub key: &'static str,
}

pub fn is_controller<C: Component + ?Sized>(component: &C) -> bool {
    component.metadata().kind == ComponentKind::Controller
}

pub fn is_service<C: Component + ?Sized>(component: &C) -> bool {
    component.metadata().kind == ComponentKind::Service
}

/// Base URL of a controller; `None` for services and unset base URLs
pub fn controller_base_url(metadata: &ComponentMetadata) -> Option<&'static str> {
    match metadata.kind {
        ComponentKind::Controller => metadata.base_url.filter(|url| !url.is_empty()),
        ComponentKind::Service => None,
    }
}

pub fn validate_controller_base_url(metadata: &ComponentMetadata) -> Result<&'static str> {
    controller_base_url(metadata).ok_or_else(|| NestrsError::MissingBaseUrl {
        controller: metadata.type_name.to_string(),
    })
}

/// Human description derived from a controller's name
pub fn controller_description(name: &str) -> String {
    describe(name, CONTROLLER_SUFFIX)
}

/// Human description derived from a service's name
pub fn service_description(name: &str) -> String {
    describe(name, SERVICE_SUFFIX)
}

fn describe(name: &str, suffix: &str) -> String {
    match name.strip_suffix(suffix) {
        Some(base) if !base.is_empty() => {
            format!("{name} manages {} operations", base.to_lowercase())
        }
        _ => format!("{name} manages system operations"),
    }
}

/// Collect the routes declared on a component's handler fields
///
/// An explicit `route` descriptor wins over a legacy `http` marker on the same
/// field. Malformed descriptors are reported in [`RouteExtraction::invalid`].
pub fn extract_routes(metadata: &ComponentMetadata) -> RouteExtraction {
    let mut extraction = RouteExtraction::default();

    for field in &metadata.fields {
        if !field.handler || MARKER_FIELDS.contains(&field.name) {
            continue;
        }

        if let Some(descriptor) = field.route {
            match parse_route_descriptor(descriptor) {
                Ok((method, sub_path)) => extraction.routes.push(RouteSpec {
                    field: field.name,
                    method,
                    sub_path,
                    source: RouteSource::Route,
                }),
                Err(_) => extraction.invalid.push(MalformedRoute {
                    field: field.name,
                    descriptor,
                }),
            }
        } else if let Some(method) = field.http {
            match HttpMethod::from_str(method.trim()) {
                Ok(method) => extraction.routes.push(RouteSpec {
                    field: field.name,
                    method,
                    sub_path: "/".to_string(),
                    source: RouteSource::Http,
                }),
                Err(_) => extraction.invalid.push(MalformedRoute {
                    field: field.name,
                    descriptor: method,
                }),
            }
        }
    }

    extraction
}

/// Every field carrying a non-empty injection key
pub fn injection_requests(metadata: &ComponentMetadata) -> Vec<InjectionRequest> {
    metadata
        .fields
        .iter()
        .filter(|field| !MARKER_FIELDS.contains(&field.name))
        .filter_map(|field| {
            let key = field.inject?.trim();
            (!key.is_empty()).then_some(InjectionRequest {
                field: field.name,
                key,
            })
        })
        .collect()
}
