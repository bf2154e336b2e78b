//! Component self-description
//!
//! Controllers and services describe themselves through the [`Component`]
//! trait instead of runtime reflection. The description is collected once at
//! startup; everything after that (injection, route binding, diagnostics) is
//! driven by the returned [`ComponentMetadata`].
//!
//! The derive macros generate these impls:
//!
//! ```rust,ignore
//! #[derive(Controller)]
//! #[controller(base_url = "/users")]
//! pub struct UserController {
//!     #[inject("UserService")]
//!     users: Injected<UserService>,
//!
//!     #[route("GET /:id")]
//!     get_user: Handler<UserController>,
//! }
//! ```

mod extractor;
mod route;

pub use extractor::{
    InjectionRequest, MARKER_FIELDS, MalformedRoute, RouteExtraction, RouteSource, RouteSpec,
    controller_base_url, controller_description, extract_routes, injection_requests,
    is_controller, is_service, service_description, validate_controller_base_url,
};
pub use route::{
    HttpMethod, PathError, is_parameterized, join_paths, parse_route_descriptor, to_native_path,
    validate_path,
};

use crate::di::InjectSlot;
use std::any::Any;
use std::sync::Arc;
use strum_macros::{Display, EnumString};

/// Structural marker of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ComponentKind {
    Controller,
    Service,
}

/// Metadata attached to a single struct field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMetadata {
    pub name: &'static str,
    /// The field holds a callable route handler
    pub handler: bool,
    /// Full route descriptor, `"<METHOD> <path>"`
    pub route: Option<&'static str>,
    /// Legacy method-only marker, combined with the controller base URL
    pub http: Option<&'static str>,
    /// Service key to inject into this field
    pub inject: Option<&'static str>,
}

impl FieldMetadata {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            handler: false,
            route: None,
            http: None,
            inject: None,
        }
    }

    /// Mark the field as a route handler with a full descriptor
    pub fn route(mut self, descriptor: &'static str) -> Self {
        self.handler = true;
        self.route = Some(descriptor);
        self
    }

    /// Mark the field as a route handler bound to the base URL
    pub fn http(mut self, method: &'static str) -> Self {
        self.handler = true;
        self.http = Some(method);
        self
    }

    pub fn inject(mut self, key: &'static str) -> Self {
        self.inject = Some(key);
        self
    }
}

/// Self-description of a controller or service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentMetadata {
    /// Unqualified type name, used as the registration key
    pub type_name: &'static str,
    pub kind: ComponentKind,
    pub base_url: Option<&'static str>,
    pub fields: Vec<FieldMetadata>,
}

impl ComponentMetadata {
    pub fn controller(type_name: &'static str, base_url: Option<&'static str>) -> Self {
        Self {
            type_name,
            kind: ComponentKind::Controller,
            base_url,
            fields: Vec::new(),
        }
    }

    pub fn service(type_name: &'static str) -> Self {
        Self {
            type_name,
            kind: ComponentKind::Service,
            base_url: None,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldMetadata) -> Self {
        self.fields.push(field);
        self
    }
}

/// A type that can be registered, injected and introspected
///
/// Usually implemented through `#[derive(Service)]` or `#[derive(Controller)]`.
pub trait Component: Send + Sync + 'static {
    /// Describe this component's kind, base URL and fields
    fn metadata(&self) -> ComponentMetadata;

    /// Injection slot backing `field`, if the field is injectable
    fn injection_slot(&self, field: &str) -> Option<&dyn InjectSlot>;

    /// Erase the concrete type for storage in the container
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}
