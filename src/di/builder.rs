use crate::di::Container;
use crate::metadata::Component;
use std::sync::Arc;

/// Builder for pre-populating a container before bootstrap
///
/// Services registered here are visible to every module during startup, which
/// is how an application hands in instances it constructs itself.
///
/// # Example
/// ```
/// use nestrs::di::ContainerBuilder;
/// use std::sync::Arc;
///
/// struct Settings { port: u16 }
///
/// let container = ContainerBuilder::new()
///     .register("Settings", Arc::new(Settings { port: 3000 }))
///     .build();
/// assert!(container.contains("Settings"));
/// ```
pub struct ContainerBuilder {
    container: Container,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self {
            container: Container::new(),
        }
    }

    /// Register a service instance under `name`
    pub fn register<T: Send + Sync + 'static>(
        self,
        name: impl Into<String>,
        instance: Arc<T>,
    ) -> Self {
        self.container.register(name, instance);
        self
    }

    /// Register a component under its own type name
    pub fn component<C: Component>(self, component: C) -> Self {
        self.container.auto_register(Arc::new(component));
        self
    }

    pub fn build(self) -> Container {
        self.container
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
