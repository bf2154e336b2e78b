use crate::modules::user::User;
use nestrs::Service;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

#[derive(Default)]
struct Tables {
    users: BTreeMap<u64, User>,
    next_id: u64,
}

/// In-memory user table
#[derive(Service, Default)]
pub struct FakeDatabase {
    tables: RwLock<Tables>,
}

impl FakeDatabase {
    /// Database preloaded with three sample users
    pub fn seeded() -> Self {
        let db = Self::default();
        db.create_user("João Silva", "joao@example.com", 30);
        db.create_user("Maria Santos", "maria@example.com", 25);
        db.create_user("Pedro Costa", "pedro@example.com", 35);
        tracing::info!(users = db.len(), "FakeDatabase created with sample data");
        db
    }

    pub fn create_user(&self, name: &str, email: &str, age: u32) -> User {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        tables.next_id += 1;
        let user = User {
            id: tables.next_id,
            name: name.to_string(),
            email: email.to_string(),
            age,
        };
        tables.users.insert(user.id, user.clone());
        tracing::debug!(id = user.id, "User created");
        user
    }

    /// Every user, ordered by id
    pub fn all_users(&self) -> Vec<User> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        tables.users.values().cloned().collect()
    }

    pub fn user_by_id(&self, id: u64) -> Option<User> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        tables.users.get(&id).cloned()
    }

    pub fn update_user(&self, id: u64, name: &str, email: &str, age: u32) -> Option<User> {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let user = tables.users.get_mut(&id)?;
        user.name = name.to_string();
        user.email = email.to_string();
        user.age = age;
        tracing::debug!(id, "User updated");
        Some(user.clone())
    }

    pub fn delete_user(&self, id: u64) -> bool {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let removed = tables.users.remove(&id).is_some();
        if removed {
            tracing::debug!(id, "User deleted");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .users
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_ids_are_sequential() {
        let db = FakeDatabase::seeded();
        let ids: Vec<u64> = db.all_users().iter().map(|user| user.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let created = db.create_user("Ana", "ana@example.com", 0);
        assert_eq!(created.id, 4);
    }

    #[test]
    fn test_update_and_delete_missing_user() {
        let db = FakeDatabase::default();
        assert!(db.update_user(9, "x", "y", 1).is_none());
        assert!(!db.delete_user(9));
        assert!(db.is_empty());
    }
}
