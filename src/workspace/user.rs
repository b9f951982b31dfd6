use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum UserRole {
    Admin,
    #[default]
    Member,
}

impl UserRole {
    pub fn parse(token: &str) -> Option<UserRole> {
        match token.to_lowercase().as_str() {
            "admin" | "administrator" => Some(UserRole::Admin),
            "member" | "user" => Some(UserRole::Member),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UserRole::Admin => "Admin",
            UserRole::Member => "Member",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub must_reset_password: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: impl Into<String>, role: UserRole) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: None,
            role,
            must_reset_password: false,
            created_at: Utc::now(),
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }
}
