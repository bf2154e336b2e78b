use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub age: u32,
}

fn is_zero(age: &u32) -> bool {
    *age == 0
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub age: u32,
}

/// Partial update; absent fields keep their current value
#[derive(Debug, Default, Deserialize)]
pub struct PatchUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<u32>,
}
