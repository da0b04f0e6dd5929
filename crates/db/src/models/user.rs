//! User entity model and DTOs.

use barter_core::types::{NationalId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] or [`PublicProfile`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub national_id: NationalId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub address: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// The caller's own account, without the credential.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub national_id: NationalId,
    pub name: String,
    pub email: String,
    pub address: String,
    pub created_at: Timestamp,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            national_id: user.national_id,
            name: user.name,
            email: user.email,
            address: user.address,
            created_at: user.created_at,
        }
    }
}

/// What other users may see about someone: no email, no credential.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct PublicProfile {
    pub national_id: NationalId,
    pub name: String,
    pub address: String,
}

/// Profile plus activity counters, returned by `GET /users/me`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProfileSummary {
    pub national_id: NationalId,
    pub name: String,
    pub email: String,
    pub address: String,
    pub item_count: i64,
    pub sent_proposal_count: i64,
    pub received_proposal_count: i64,
}

/// Directory entry for `GET /users`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserListEntry {
    pub national_id: NationalId,
    pub name: String,
    pub email: String,
    pub address: String,
    pub item_count: i64,
}

/// DTO for creating a new user. The password is already hashed.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub national_id: NationalId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub address: String,
}

/// DTO for a self-service profile update. All fields are optional.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfile {
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: Option<String>,
    #[validate(
        email(message = "Email must be a valid address"),
        length(max = 100, message = "Email must be at most 100 characters")
    )]
    pub email: Option<String>,
    #[validate(length(min = 5, max = 200, message = "Address must be 5-200 characters"))]
    pub address: Option<String>,
}

impl UpdateProfile {
    /// `true` when no field would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.address.is_none()
    }

    /// Trim text fields and lower-case the email.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.map(|v| v.trim().to_string()),
            email: self.email.map(|v| v.trim().to_lowercase()),
            address: self.address.map(|v| v.trim().to_string()),
        }
    }
}
