use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Display details for a user; `id` equals the owning user's id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserInput {
    pub email: String,
    pub password_hash: String,
    pub full_name: Option<String>,
}

/// A user joined with its profile. Missing profiles leave both fields empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserWithProfile {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl UserWithProfile {
    pub fn join(user: &User, profile: Option<&Profile>) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            full_name: profile.and_then(|p| p.full_name.clone()),
            avatar_url: profile.and_then(|p| p.avatar_url.clone()),
        }
    }
}
