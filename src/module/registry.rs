use super::ModuleDescriptor;
use crate::error::{NestrsError, Result};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

static GLOBAL: OnceLock<Arc<ModuleRegistry>> = OnceLock::new();

/// Name-keyed store of module descriptors
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    modules: RwLock<HashMap<String, Arc<ModuleDescriptor>>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry, created on first use
    ///
    /// Prefer passing an explicit registry to the application; the global one
    /// is shared by everything in the process, tests included.
    pub fn global() -> Arc<ModuleRegistry> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(ModuleRegistry::new())))
    }

    /// Register a module, replacing any module with the same name
    pub fn register_module(&self, module: ModuleDescriptor) {
        let name = module.name().to_string();
        self.modules
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.clone(), Arc::new(module));
        tracing::info!(module = %name, "Module registered");
    }

    /// Register a module only if its name is not taken
    ///
    /// Returns `true` when the module was inserted.
    pub fn auto_register_module(&self, module: ModuleDescriptor) -> bool {
        let mut modules = self.modules.write().unwrap_or_else(PoisonError::into_inner);
        if modules.contains_key(module.name()) {
            tracing::debug!(module = module.name(), "Module already registered");
            return false;
        }

        let name = module.name().to_string();
        modules.insert(name.clone(), Arc::new(module));
        tracing::info!(module = %name, "Module auto-registered");
        true
    }

    pub fn get_module(&self, name: &str) -> Result<Arc<ModuleDescriptor>> {
        self.modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| NestrsError::ModuleNotFound {
                name: name.to_string(),
            })
    }

    /// Snapshot of every registered module
    pub fn all_modules(&self) -> HashMap<String, Arc<ModuleDescriptor>> {
        self.modules.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn is_module_registered(&self, name: &str) -> bool {
        self.modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.modules.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn print_modules(&self) {
        let mut modules: Vec<_> = self.all_modules().into_values().collect();
        modules.sort_by(|a, b| a.name().cmp(b.name()));

        tracing::info!("Registered modules ({}):", modules.len());
        for module in modules {
            tracing::info!(
                module = module.name(),
                controllers = module.controllers().len(),
                services = module.services().len(),
                imports = module.imports().len(),
                "Module details"
            );
        }
    }
}
