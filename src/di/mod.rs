//! Name-keyed dependency injection
//!
//! Services are registered under a string key (usually their type name) and
//! assigned to [`Injected`] fields of other components by matching the
//! field's injection key.

mod builder;
mod container;
mod slot;

pub use builder::ContainerBuilder;
pub use container::{Container, InjectionFailure};
pub use slot::{InjectSlot, Injected, SlotError};
