//! In-memory user CRUD service built on nestrs

pub mod infrastructure;
pub mod modules;

pub use infrastructure::database::FakeDatabase;
pub use modules::user::{User, UserController, UserModule, UserService};
