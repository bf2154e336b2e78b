use std::any::{Any, type_name};
use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, OnceLock};

/// Why a slot refused an instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    /// The registered instance is not of the slot's type
    TypeMismatch { expected: &'static str },
    /// The slot already holds a different instance
    AlreadyInjected,
}

impl fmt::Display for SlotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotError::TypeMismatch { expected } => write!(f, "expected {expected}"),
            SlotError::AlreadyInjected => f.write_str("already injected"),
        }
    }
}

/// A field the container can assign a registered instance to
pub trait InjectSlot: Send + Sync {
    /// Store `instance` in the slot
    ///
    /// # Errors
    /// Returns an error if the instance has the wrong type or the slot already
    /// holds another instance.
    fn fill(&self, instance: Arc<dyn Any + Send + Sync>) -> Result<(), SlotError>;

    fn is_filled(&self) -> bool;
}

/// An injectable field holding a shared service instance
///
/// The slot starts empty and is filled once by the container during startup.
/// It then shares the exact `Arc` held by the container, so both sides observe
/// the same instance.
///
/// # Panics
///
/// Dereferencing an empty slot panics. Startup aborts before serving when any
/// injection fails, so handlers never observe an empty slot.
pub struct Injected<T> {
    cell: OnceLock<Arc<T>>,
}

impl<T> Injected<T> {
    pub fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Create an already-filled slot
    pub fn from_arc(instance: Arc<T>) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(instance);
        Self { cell }
    }

    pub fn get(&self) -> Option<&Arc<T>> {
        self.cell.get()
    }
}

impl<T: Send + Sync + 'static> InjectSlot for Injected<T> {
    fn fill(&self, instance: Arc<dyn Any + Send + Sync>) -> Result<(), SlotError> {
        let typed = instance
            .downcast::<T>()
            .map_err(|_| SlotError::TypeMismatch {
                expected: type_name::<T>(),
            })?;

        let current = self.cell.get_or_init(|| Arc::clone(&typed));
        if Arc::ptr_eq(current, &typed) {
            Ok(())
        } else {
            Err(SlotError::AlreadyInjected)
        }
    }

    fn is_filled(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T> Deref for Injected<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        match self.cell.get() {
            Some(instance) => instance,
            None => panic!(
                "Injected<{}> dereferenced before injection",
                type_name::<T>()
            ),
        }
    }
}

impl<T> Default for Injected<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Injected<T> {
    fn clone(&self) -> Self {
        match self.cell.get() {
            Some(instance) => Self::from_arc(Arc::clone(instance)),
            None => Self::new(),
        }
    }
}

impl<T> fmt::Debug for Injected<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injected")
            .field("type", &type_name::<T>())
            .field("filled", &self.cell.get().is_some())
            .finish()
    }
}
