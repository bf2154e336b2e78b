use super::model::{CreateUserRequest, PatchUserRequest, User};
use crate::infrastructure::database::FakeDatabase;
use nestrs::prelude::*;

#[derive(Service, Default)]
pub struct UserService {
    #[inject("FakeDatabase")]
    database: Injected<FakeDatabase>,
}

impl UserService {
    pub fn all_users(&self) -> Vec<User> {
        let users = self.database.all_users();
        tracing::debug!(count = users.len(), "Retrieved users");
        users
    }

    pub fn create_user(&self, request: CreateUserRequest) -> User {
        self.database
            .create_user(&request.name, &request.email, request.age)
    }

    pub fn user_by_id(&self, id: u64) -> Option<User> {
        self.database.user_by_id(id)
    }

    pub fn update_user(&self, id: u64, request: CreateUserRequest) -> Option<User> {
        self.database
            .update_user(id, &request.name, &request.email, request.age)
    }

    /// Apply only the provided fields
    pub fn patch_user(&self, id: u64, patch: PatchUserRequest) -> Option<User> {
        let existing = self.database.user_by_id(id)?;
        self.database.update_user(
            id,
            patch.name.as_deref().unwrap_or(&existing.name),
            patch.email.as_deref().unwrap_or(&existing.email),
            patch.age.unwrap_or(existing.age),
        )
    }

    pub fn delete_user(&self, id: u64) -> bool {
        self.database.delete_user(id)
    }
}
