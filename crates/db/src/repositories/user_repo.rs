//! Repository for the `users` table (the identity store).

use sqlx::PgPool;

use crate::models::user::{
    CreateUser, ProfileSummary, PublicProfile, UpdateProfile, User, UserListEntry,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "national_id, name, email, password_hash, address, created_at, updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    ///
    /// A duplicate national ID violates `users_pkey`; a duplicate email
    /// violates `uq_users_email`.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (national_id, name, email, password_hash, address)
             VALUES ($1, $2, LOWER($3), $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.national_id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.address)
            .fetch_one(pool)
            .await
    }

    /// Find a user by national ID.
    pub async fn find_by_national_id(
        pool: &PgPool,
        national_id: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE national_id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(national_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (case-insensitive; emails are stored lower-cased).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = LOWER($1)");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Check whether a user exists.
    pub async fn exists(pool: &PgPool, national_id: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE national_id = $1)")
            .bind(national_id)
            .fetch_one(pool)
            .await
    }

    /// Public profile (name and address only) for a user.
    pub async fn find_public(
        pool: &PgPool,
        national_id: &str,
    ) -> Result<Option<PublicProfile>, sqlx::Error> {
        sqlx::query_as::<_, PublicProfile>(
            "SELECT national_id, name, address FROM users WHERE national_id = $1",
        )
        .bind(national_id)
        .fetch_optional(pool)
        .await
    }

    /// Profile plus counts of owned items, sent and received proposals.
    pub async fn profile_summary(
        pool: &PgPool,
        national_id: &str,
    ) -> Result<Option<ProfileSummary>, sqlx::Error> {
        sqlx::query_as::<_, ProfileSummary>(
            "SELECT u.national_id, u.name, u.email, u.address,
                    (SELECT COUNT(*) FROM items i WHERE i.owner_id = u.national_id) AS item_count,
                    (SELECT COUNT(*) FROM proposals p WHERE p.proposer_id = u.national_id)
                        AS sent_proposal_count,
                    (SELECT COUNT(*) FROM proposals p WHERE p.item_owner_id = u.national_id)
                        AS received_proposal_count
             FROM users u
             WHERE u.national_id = $1",
        )
        .bind(national_id)
        .fetch_optional(pool)
        .await
    }

    /// List all users with their item counts, ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<UserListEntry>, sqlx::Error> {
        sqlx::query_as::<_, UserListEntry>(
            "SELECT u.national_id, u.name, u.email, u.address,
                    (SELECT COUNT(*) FROM items i WHERE i.owner_id = u.national_id) AS item_count
             FROM users u
             ORDER BY u.name ASC",
        )
        .fetch_all(pool)
        .await
    }

    /// Update name / email / address. Only non-`None` fields are applied.
    ///
    /// Returns `None` if no row with the given national ID exists.
    pub async fn update_profile(
        pool: &PgPool,
        national_id: &str,
        input: &UpdateProfile,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE(LOWER($3), email),
                address = COALESCE($4, address)
             WHERE national_id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(national_id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.address)
            .fetch_optional(pool)
            .await
    }
}
