use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Read-only view of a user without the password hash.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize, Deserialize)]
pub struct UserDto {
    pub id: i64,
    pub username: String,
    pub role: String,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        UserDto {
            id: user.id,
            username: user.username.clone(),
            role: user.role.clone(),
        }
    }
}

/// Row to insert. `password` is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub role: String,
}

/// The fixed column set written by an update. Every field is written,
/// including `false` and empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFields {
    pub username: String,
    pub is_active: bool,
    pub role: String,
}

#[derive(Debug, Clone, Copy)]
pub enum UserLookup<'a> {
    Id(i64),
    Username(&'a str),
}

/// Search filter. Unset, empty and zero values impose no constraint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFilter {
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub role: Option<String>,
}

impl UserFilter {
    pub fn user_id(&self) -> Option<i64> {
        self.user_id.filter(|id| *id != 0)
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref().filter(|s| !s.is_empty())
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref().filter(|s| !s.is_empty())
    }

    pub fn matches(&self, user: &User) -> bool {
        self.user_id().is_none_or(|id| user.id == id)
            && self.username().is_none_or(|name| user.username == name)
            && self.role().is_none_or(|role| user.role == role)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUser {
    pub id: i64,
    pub username: String,
    pub is_active: bool,
    pub role: String,
}

impl UpdateUser {
    pub fn fields(&self) -> UserFields {
        UserFields {
            username: self.username.clone(),
            is_active: self.is_active,
            role: self.role.clone(),
        }
    }
}
