use crate::error::{NestrsError, Result};
use crate::metadata::{Component, injection_requests};
use dashmap::DashMap;
use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

/// A single reason an injection target could not be fully wired
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectionFailure {
    /// No service is registered under the requested key
    MissingService { field: String, service: String },
    /// The service exists but the field could not accept it
    Unsettable { field: String, reason: String },
}

impl fmt::Display for InjectionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InjectionFailure::MissingService { service, .. } => {
                write!(f, "service {service} (not found)")
            }
            InjectionFailure::Unsettable { field, reason } => {
                write!(f, "field {field} (cannot set: {reason})")
            }
        }
    }
}

/// Thread-safe, name-keyed service container
///
/// Instances are stored as shared `Arc`s; every injection hands out the same
/// allocation the container holds. Re-registering a name replaces the previous
/// instance.
#[derive(Clone, Default)]
pub struct Container {
    services: DashMap<String, ServiceEntry>,
}

#[derive(Clone)]
struct ServiceEntry {
    instance: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Container {
    pub fn new() -> Self {
        Self {
            services: DashMap::new(),
        }
    }

    /// Register a typed instance under an explicit name
    pub fn register<T: Send + Sync + 'static>(
        &self,
        name: impl Into<String>,
        instance: Arc<T>,
    ) -> &Self {
        let name = name.into();
        tracing::debug!(service = %name, type_name = type_name::<T>(), "Registered service");
        self.services.insert(
            name,
            ServiceEntry {
                instance,
                type_name: type_name::<T>(),
            },
        );
        self
    }

    /// Register an already type-erased instance
    pub fn register_erased(
        &self,
        name: impl Into<String>,
        instance: Arc<dyn Any + Send + Sync>,
        type_name: &'static str,
    ) -> &Self {
        let name = name.into();
        tracing::debug!(service = %name, type_name, "Registered service");
        self.services.insert(name, ServiceEntry { instance, type_name });
        self
    }

    /// Register a component under its own type name
    pub fn auto_register(&self, component: Arc<dyn Component>) -> String {
        let name = component.metadata().type_name;
        self.register_erased(name, component.into_any(), name);
        name.to_string()
    }

    /// Look up a type-erased instance by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Any + Send + Sync>> {
        self.services.get(name).map(|entry| Arc::clone(&entry.instance))
    }

    /// Look up an instance by name and downcast it to `T`
    pub fn resolve<T: Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>> {
        let instance = self.get(name).ok_or_else(|| NestrsError::ServiceNotFound {
            name: name.to_string(),
        })?;

        instance
            .downcast::<T>()
            .map_err(|_| NestrsError::DowncastFailed {
                name: name.to_string(),
                type_name: type_name::<T>().to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Registered names in lexicographic order
    pub fn service_names(&self) -> Vec<String> {
        let mut names: Vec<String> =
            self.services.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    /// Assign registered instances to every injectable field of `target`
    ///
    /// All fields are attempted. Fields that could not be wired are collected
    /// and reported together in [`NestrsError::InjectionFailed`]; the fields
    /// that did succeed stay filled.
    pub fn inject<C: Component + ?Sized>(&self, target: &C) -> Result<()> {
        let metadata = target.metadata();
        let mut failures = Vec::new();

        for request in injection_requests(&metadata) {
            let Some(instance) = self.get(request.key) else {
                failures.push(InjectionFailure::MissingService {
                    field: request.field.to_string(),
                    service: request.key.to_string(),
                });
                continue;
            };

            let Some(slot) = target.injection_slot(request.field) else {
                failures.push(InjectionFailure::Unsettable {
                    field: request.field.to_string(),
                    reason: "no injectable slot".to_string(),
                });
                continue;
            };

            match slot.fill(instance) {
                Ok(()) => tracing::trace!(
                    target_component = metadata.type_name,
                    field = request.field,
                    service = request.key,
                    "Injected dependency"
                ),
                Err(reason) => failures.push(InjectionFailure::Unsettable {
                    field: request.field.to_string(),
                    reason: reason.to_string(),
                }),
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(NestrsError::InjectionFailed {
                target: metadata.type_name.to_string(),
                failures,
            })
        }
    }

    /// Log every registered service with its concrete type
    pub fn print_services(&self) {
        tracing::info!("Registered services ({}):", self.len());
        for name in self.service_names() {
            if let Some(entry) = self.services.get(&name) {
                tracing::info!("  - {} ({})", name, entry.type_name);
            }
        }
    }
}
