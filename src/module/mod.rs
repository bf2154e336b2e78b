//! Modules group controllers and services under a name
//!
//! Modules are typically declared with the `#[module]` macro, which implements
//! [`Module`] and builds the [`ModuleDescriptor`]:
//!
//! ```rust,ignore
//! use nestrs::module;
//!
//! #[module(
//!     imports = [DatabaseModule],
//!     controllers = [UserController::new()],
//!     providers = [UserService::default()],
//! )]
//! pub struct UserModule;
//! ```

mod registry;

pub use registry::ModuleRegistry;

use crate::controller::Controller;
use crate::metadata::Component;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// A named bundle of controllers, services and imported modules
#[derive(Clone)]
pub struct ModuleDescriptor {
    name: String,
    controllers: Vec<Arc<dyn Controller>>,
    services: Vec<Arc<dyn Component>>,
    imports: Vec<Arc<ModuleDescriptor>>,
}

impl ModuleDescriptor {
    pub fn builder(name: impl Into<String>) -> ModuleBuilder {
        ModuleBuilder {
            descriptor: ModuleDescriptor {
                name: name.into(),
                controllers: Vec::new(),
                services: Vec::new(),
                imports: Vec::new(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn controllers(&self) -> &[Arc<dyn Controller>] {
        &self.controllers
    }

    pub fn services(&self) -> &[Arc<dyn Component>] {
        &self.services
    }

    pub fn imports(&self) -> &[Arc<ModuleDescriptor>] {
        &self.imports
    }

    /// This module followed by every transitively imported module
    ///
    /// Each module name appears once, at its first occurrence in depth-first
    /// order. Import cycles terminate.
    pub fn with_imports(self: &Arc<Self>) -> Vec<Arc<ModuleDescriptor>> {
        let mut seen = HashSet::new();
        let mut ordered = Vec::new();
        let mut stack = vec![Arc::clone(self)];

        while let Some(module) = stack.pop() {
            if !seen.insert(module.name.clone()) {
                continue;
            }
            stack.extend(module.imports.iter().rev().cloned());
            ordered.push(module);
        }

        ordered
    }
}

impl fmt::Debug for ModuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let controllers: Vec<_> = self.controllers.iter().map(|c| c.metadata().type_name).collect();
        let services: Vec<_> = self.services.iter().map(|s| s.metadata().type_name).collect();
        let imports: Vec<_> = self.imports.iter().map(|m| m.name.as_str()).collect();

        f.debug_struct("ModuleDescriptor")
            .field("name", &self.name)
            .field("controllers", &controllers)
            .field("services", &services)
            .field("imports", &imports)
            .finish()
    }
}

/// Fluent constructor for [`ModuleDescriptor`]
pub struct ModuleBuilder {
    descriptor: ModuleDescriptor,
}

impl ModuleBuilder {
    pub fn controller<C: Controller>(self, controller: C) -> Self {
        self.controller_arc(Arc::new(controller))
    }

    pub fn controller_arc(mut self, controller: Arc<dyn Controller>) -> Self {
        self.descriptor.controllers.push(controller);
        self
    }

    pub fn provider<S: Component>(self, service: S) -> Self {
        self.provider_arc(Arc::new(service))
    }

    pub fn provider_arc(mut self, service: Arc<dyn Component>) -> Self {
        self.descriptor.services.push(service);
        self
    }

    pub fn import(mut self, module: ModuleDescriptor) -> Self {
        self.descriptor.imports.push(Arc::new(module));
        self
    }

    pub fn build(self) -> ModuleDescriptor {
        self.descriptor
    }
}

/// A statically declared module
pub trait Module {
    const NAME: &'static str;

    /// Build a fresh descriptor with new controller and service instances
    fn descriptor() -> ModuleDescriptor;

    /// Register this module unless one with the same name already exists
    fn register(registry: &ModuleRegistry) -> bool {
        registry.auto_register_module(Self::descriptor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_imports_flattens_and_dedupes() {
        let shared = ModuleDescriptor::builder("SharedModule").build();
        let users = ModuleDescriptor::builder("UserModule").import(shared.clone()).build();
        let app = Arc::new(
            ModuleDescriptor::builder("AppModule")
                .import(users)
                .import(shared)
                .build(),
        );

        let names: Vec<String> = app.with_imports().iter().map(|m| m.name().to_string()).collect();
        assert_eq!(names, vec!["AppModule", "UserModule", "SharedModule"]);
    }
}
