//! Route discovery and binding
//!
//! The [`Dispatcher`] walks a controller's handler fields and registers one
//! [`BoundHandler`] per route with a [`Transport`]. [`AxumTransport`] is the
//! production transport; [`RecordingTransport`] captures registrations for
//! inspection.

mod dispatcher;
mod transport;

pub use dispatcher::{Dispatcher, RouteDescriptor};
pub use transport::{AxumTransport, BoundHandler, RecordedRoute, RecordingTransport, Transport};
