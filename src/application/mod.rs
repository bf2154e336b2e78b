//! Application startup, serving and shutdown
//!
//! [`Application::bootstrap`] wires every registered module:
//!
//! 1. enumerate modules by name, imports flattened;
//! 2. register every service in the container;
//! 3. bind every controller's routes;
//! 4. inject services, then controllers;
//! 5. abort with [`NestrsError::StartupAborted`] if any injection failed.
//!
//! ```rust,ignore
//! use nestrs::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> nestrs::Result<()> {
//!     let registry = Arc::new(ModuleRegistry::new());
//!     UserModule::register(&registry);
//!
//!     Application::new(registry).listen("0.0.0.0:3000").await
//! }
//! ```

mod server;
mod tree;

pub use server::{Server, shutdown_signal};
pub use tree::{DependencyTree, NodeKind, TreeNode};

use crate::di::Container;
use crate::error::{NestrsError, Result};
use crate::module::{ModuleDescriptor, ModuleRegistry};
use crate::routing::{Dispatcher, RouteDescriptor};
use axum::Router;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::sync::oneshot;

/// Result of a successful bootstrap
pub struct Bootstrapped {
    pub router: Router,
    pub routes: Vec<RouteDescriptor>,
}

pub struct Application {
    registry: Arc<ModuleRegistry>,
    container: Arc<Container>,
}

impl Application {
    pub fn new(registry: Arc<ModuleRegistry>) -> Self {
        Self {
            registry,
            container: Arc::new(Container::new()),
        }
    }

    /// Application over the process-wide module registry
    pub fn global() -> Self {
        Self::new(ModuleRegistry::global())
    }

    /// Use a pre-populated container
    pub fn with_container(mut self, container: Container) -> Self {
        self.container = Arc::new(container);
        self
    }

    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    pub fn registry(&self) -> &Arc<ModuleRegistry> {
        &self.registry
    }

    /// Registered modules sorted by name, each followed by its imports
    ///
    /// A module reachable through several paths appears once.
    pub fn modules(&self) -> Vec<Arc<ModuleDescriptor>> {
        let mut roots: Vec<_> = self.registry.all_modules().into_values().collect();
        roots.sort_by(|a, b| a.name().cmp(b.name()));

        let mut seen = HashSet::new();
        roots
            .iter()
            .flat_map(|module| module.with_imports())
            .filter(|module| seen.insert(module.name().to_string()))
            .collect()
    }

    /// Wire every module and build the router
    pub fn bootstrap(&self) -> Result<Bootstrapped> {
        let modules = self.modules();
        tracing::info!(modules = modules.len(), "Bootstrapping application");

        for module in &modules {
            for service in module.services() {
                let name = self.container.auto_register(Arc::clone(service));
                tracing::debug!(module = module.name(), service = %name, "Service registered");
            }
        }

        let dispatcher = bind_controllers(&modules);

        let mut failures = Vec::new();
        for module in &modules {
            for service in module.services() {
                if let Err(err) = self.container.inject(service.as_ref()) {
                    failures.push(err.to_string());
                }
            }
        }
        for module in &modules {
            for controller in module.controllers() {
                if let Err(err) = self.container.inject(controller.as_ref()) {
                    failures.push(err.to_string());
                }
            }
        }

        if !failures.is_empty() {
            for failure in &failures {
                tracing::error!("{failure}");
            }
            return Err(NestrsError::StartupAborted { failures });
        }

        tracing::info!(
            services = self.container.len(),
            routes = dispatcher.route_count(),
            "Application bootstrapped"
        );
        dispatcher.print_routes();

        let routes = dispatcher.routes().to_vec();
        Ok(Bootstrapped {
            router: dispatcher.into_transport().into_router(),
            routes,
        })
    }

    /// Diagnostic tree of modules, services, controllers and routes
    ///
    /// Route status comes from binding every controller against a scratch
    /// router; nothing is injected.
    pub fn dependency_tree(&self) -> DependencyTree {
        let modules = self.modules();
        let dispatcher = bind_controllers(&modules);
        DependencyTree::build(&modules, dispatcher.routes())
    }

    /// Bootstrap and serve in a background task
    pub async fn start(&self, addr: impl ToSocketAddrs) -> Result<Server> {
        let Bootstrapped { router, routes } = self.bootstrap()?;
        DependencyTree::build(&self.modules(), &routes).log();

        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        tracing::info!("Server running on http://{local_addr}");
        Ok(Server::new(local_addr, shutdown_tx, task))
    }

    /// Serve until Ctrl+C or SIGTERM, then shut down gracefully
    pub async fn listen(&self, addr: impl ToSocketAddrs) -> Result<()> {
        let server = self.start(addr).await?;
        shutdown_signal().await;
        server.shutdown().await
    }
}

fn bind_controllers(modules: &[Arc<ModuleDescriptor>]) -> Dispatcher {
    let mut dispatcher = Dispatcher::axum();
    for module in modules {
        for controller in module.controllers() {
            dispatcher.bind_controller(Arc::clone(controller));
        }
    }
    dispatcher
}
