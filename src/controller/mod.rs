//! Controllers and the per-request handler context
//!
//! A controller is a [`Component`] whose handler fields are plain function
//! pointers taking the controller and a fresh [`Context`]:
//!
//! ```rust,ignore
//! #[derive(Controller)]
//! #[controller(base_url = "/users")]
//! pub struct UserController {
//!     #[route("GET /:id")]
//!     get_user: Handler<UserController>,
//! }
//!
//! fn get_user(this: &UserController, ctx: &mut Context) -> Reply {
//!     Reply::message(format!("user {}", ctx.param("id").unwrap_or_default()))
//! }
//! ```
//!
//! `#[derive(Controller)]` generates both [`Component`] and [`Controller`].

mod context;
mod reply;

pub use context::{Context, Request, ResponseSink};
pub use reply::Reply;

use crate::metadata::Component;
use std::sync::Arc;

/// Signature of a handler field on controller `C`
pub type Handler<C> = fn(&C, &mut Context) -> Reply;

/// A handler bound to its controller instance
pub type HandlerFn = Arc<dyn Fn(&mut Context) -> Reply + Send + Sync>;

/// A component exposing route handlers
pub trait Controller: Component {
    /// Callable stored in the handler field `field`, bound to this instance
    ///
    /// Returns `None` when the field does not exist or holds no handler.
    fn handler(self: Arc<Self>, field: &str) -> Option<HandlerFn>;
}
