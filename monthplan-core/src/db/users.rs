use anyhow::Result;
use chrono::Utc;

use super::{new_id, Database};
use crate::models::{CreateUserInput, Profile, User, UserWithProfile};

impl Database {
    /// Exact, case-sensitive email match.
    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.read(|doc| doc.find_user_by_email(email).cloned())
    }

    pub fn get_user_with_profile(&self, id: &str) -> Result<Option<UserWithProfile>> {
        self.read(|doc| {
            doc.find_user(id)
                .map(|user| UserWithProfile::join(user, doc.find_profile(id)))
        })
    }

    /// Create a user and its profile. Returns `None` if the email is taken.
    pub fn register_user(&self, input: CreateUserInput) -> Result<Option<UserWithProfile>> {
        let now = Utc::now();
        let created = self.write(|doc| {
            if doc.find_user_by_email(&input.email).is_some() {
                return None;
            }

            let user = User {
                id: new_id(),
                email: input.email.clone(),
                password_hash: input.password_hash.clone(),
                created_at: now,
                updated_at: now,
            };
            let profile = Profile {
                id: user.id.clone(),
                full_name: input.full_name.clone(),
                avatar_url: None,
                created_at: now,
                updated_at: now,
            };
            let view = UserWithProfile::join(&user, Some(&profile));
            doc.users.push(user);
            doc.upsert_profile(profile);
            Some(view)
        })?;

        if let Some(user) = &created {
            tracing::info!(id = %user.id, "registered user");
        }
        Ok(created)
    }
}
