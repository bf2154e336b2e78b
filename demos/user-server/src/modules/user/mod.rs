mod controller;
mod model;
mod service;

pub use controller::UserController;
pub use model::{CreateUserRequest, PatchUserRequest, User};
pub use service::UserService;

use crate::infrastructure::database::FakeDatabase;
use nestrs::module;

#[module(
    controllers = [UserController::new()],
    providers = [FakeDatabase::seeded(), UserService],
)]
pub struct UserModule;
