//! # nestrs
//!
//! A small web framework with name-based dependency injection, modules and
//! declarative route binding, served by axum.
//!
//! ## Features
//!
//! - **Dependency Injection**: services are registered by name and injected into
//!   `Injected<T>` fields that declare the name they need
//! - **Declarative Routing**: handler fields carry `"<METHOD> <path>"` route
//!   descriptors, bound under the controller's base URL
//! - **Modules**: controllers and services are grouped with `#[module]` and
//!   wired together at startup
//! - **Fail-fast Startup**: every unresolved dependency is reported before the
//!   server accepts a single request
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use nestrs::prelude::*;
//!
//! #[derive(Service, Default)]
//! pub struct GreetingService;
//!
//! impl GreetingService {
//!     pub fn greet(&self, name: &str) -> String {
//!         format!("Hello, {name}!")
//!     }
//! }
//!
//! #[derive(Controller)]
//! #[controller(base_url = "/hello")]
//! pub struct HelloController {
//!     #[inject]
//!     greetings: Injected<GreetingService>,
//!
//!     #[route("GET /:name")]
//!     hello: Handler<HelloController>,
//! }
//!
//! impl Default for HelloController {
//!     fn default() -> Self {
//!         Self {
//!             greetings: Injected::new(),
//!             hello: |this, ctx| {
//!                 let name = ctx.param("name").unwrap_or("world");
//!                 Reply::message(this.greetings.greet(name))
//!             },
//!         }
//!     }
//! }
//!
//! #[module(controllers = [HelloController], providers = [GreetingService])]
//! pub struct AppModule;
//!
//! #[tokio::main]
//! async fn main() -> nestrs::Result<()> {
//!     let registry = Arc::new(ModuleRegistry::new());
//!     AppModule::register(&registry);
//!     Application::new(registry).listen("0.0.0.0:3000").await
//! }
//! ```

extern crate self as nestrs;

pub mod application;
pub mod common;
pub mod config;
pub mod controller;
pub mod di;
pub mod error;
pub mod metadata;
pub mod module;
pub mod routing;

// Re-export core types
pub use application::{Application, Bootstrapped, DependencyTree, Server};
pub use common::{Envelope, ErrorEnvelope};
pub use controller::{Context, Controller, Handler, HandlerFn, Reply, Request, ResponseSink};
pub use di::{Container, ContainerBuilder, InjectSlot, Injected};
pub use error::{NestrsError, Result};
pub use metadata::{Component, ComponentKind, ComponentMetadata, FieldMetadata, HttpMethod};
pub use module::{Module, ModuleDescriptor, ModuleRegistry};

// Re-export macros
pub use nestrs_macro::{Controller, Service, module};

// Re-export commonly used types from dependencies
pub use axum;

/// Prelude module for convenient imports
///
/// ```
/// use nestrs::prelude::*;
/// ```
pub mod prelude {
    pub use crate::application::{Application, Server, shutdown_signal};
    pub use crate::common::{Envelope, ErrorEnvelope};
    pub use crate::config::{ConfigService, ServerConfig};
    pub use crate::controller::{Context, Handler, Reply};
    pub use crate::di::{Container, ContainerBuilder, Injected};
    pub use crate::error::{NestrsError, Result};
    pub use crate::metadata::Component;
    pub use crate::module::{Module, ModuleDescriptor, ModuleRegistry};
    pub use crate::{Controller, Service, module};
    pub use axum::http::StatusCode;
    pub use std::sync::Arc;
}
