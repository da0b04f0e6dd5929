//! Repository for the `items` table (the item catalog).

use barter_core::item::escape_like;
use barter_core::pagination::PageRequest;
use barter_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::item::{CreateItem, Item, ItemFilter, ItemListing, UpdateItem};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, category, image_url, owner_id, is_active, \
                       created_at, updated_at";

/// Same columns qualified with the `i` alias, plus the owner's public fields.
const LISTING_COLUMNS: &str = "i.id, i.name, i.description, i.category, i.image_url, \
                               i.owner_id, i.is_active, i.created_at, i.updated_at, \
                               u.name AS owner_name, u.address AS owner_address";

/// Predicate for the public listing: `$1` category, `$2` escaped search text.
const LISTING_WHERE: &str = "i.is_active = true \
     AND ($1::text IS NULL OR i.category = $1) \
     AND ($2::text IS NULL \
          OR i.name ILIKE '%' || $2 || '%' \
          OR i.description ILIKE '%' || $2 || '%')";

/// Provides CRUD operations for items.
pub struct ItemRepo;

impl ItemRepo {
    /// Insert a new active item owned by `owner_id`.
    pub async fn create(
        pool: &PgPool,
        owner_id: &str,
        input: &CreateItem,
    ) -> Result<Item, sqlx::Error> {
        let query = format!(
            "INSERT INTO items (name, description, category, image_url, owner_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Item>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.category)
            .bind(&input.image_url)
            .bind(owner_id)
            .fetch_one(pool)
            .await
    }

    /// Find an item by ID, active or not.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Item>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM items WHERE id = $1");
        sqlx::query_as::<_, Item>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an item by ID together with its owner's public profile.
    pub async fn find_listing(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ItemListing>, sqlx::Error> {
        let query = format!(
            "SELECT {LISTING_COLUMNS} FROM items i \
             JOIN users u ON u.national_id = i.owner_id \
             WHERE i.id = $1"
        );
        sqlx::query_as::<_, ItemListing>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lock the given items against concurrent update/delete for the rest of
    /// the transaction. Missing IDs are simply absent from the result.
    pub async fn lock_for_share(
        conn: &mut PgConnection,
        ids: &[DbId],
    ) -> Result<Vec<Item>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM items WHERE id = ANY($1) ORDER BY id FOR SHARE");
        sqlx::query_as::<_, Item>(&query)
            .bind(ids)
            .fetch_all(conn)
            .await
    }

    /// Page through active items, newest first. Returns the page and the
    /// total number of matching rows.
    pub async fn list_active(
        pool: &PgPool,
        filter: &ItemFilter,
        page: PageRequest,
    ) -> Result<(Vec<ItemListing>, i64), sqlx::Error> {
        let search = filter.search.as_deref().map(escape_like);

        let query = format!(
            "SELECT {LISTING_COLUMNS} FROM items i \
             JOIN users u ON u.national_id = i.owner_id \
             WHERE {LISTING_WHERE} \
             ORDER BY i.id DESC \
             LIMIT $3 OFFSET $4"
        );
        let items = sqlx::query_as::<_, ItemListing>(&query)
            .bind(&filter.category)
            .bind(&search)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM items i WHERE {LISTING_WHERE}");
        let total = sqlx::query_scalar::<_, i64>(&count_query)
            .bind(&filter.category)
            .bind(&search)
            .fetch_one(pool)
            .await?;

        Ok((items, total))
    }

    /// Every item owned by `owner_id`, including inactive ones, newest first.
    pub async fn list_by_owner(pool: &PgPool, owner_id: &str) -> Result<Vec<Item>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM items WHERE owner_id = $1 ORDER BY id DESC");
        sqlx::query_as::<_, Item>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Update an item if and only if `owner_id` owns it.
    ///
    /// Ownership check and write are one statement. Returns `None` when the
    /// item is absent or owned by someone else.
    pub async fn update_owned(
        pool: &PgPool,
        id: DbId,
        owner_id: &str,
        input: &UpdateItem,
    ) -> Result<Option<Item>, sqlx::Error> {
        let query = format!(
            "UPDATE items SET
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                category = CASE WHEN $5::text IS NULL THEN category ELSE NULLIF($5, '') END,
                image_url = CASE WHEN $6::text IS NULL THEN image_url ELSE NULLIF($6, '') END,
                is_active = COALESCE($7, is_active)
             WHERE id = $1 AND owner_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Item>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.category)
            .bind(&input.image_url)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Delete an item if `owner_id` owns it and no proposal references it.
    ///
    /// Returns `true` if the row was removed. The `ON DELETE RESTRICT` foreign
    /// keys on `proposals` back the `NOT EXISTS` guard against a proposal
    /// inserted concurrently.
    pub async fn delete_owned(pool: &PgPool, id: DbId, owner_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM items
             WHERE id = $1 AND owner_id = $2
               AND NOT EXISTS (
                   SELECT 1 FROM proposals p
                   WHERE p.offered_item_id = $1 OR p.wanted_item_id = $1
               )",
        )
        .bind(id)
        .bind(owner_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether any proposal, in any status, references the item.
    pub async fn is_referenced(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                 SELECT 1 FROM proposals
                 WHERE offered_item_id = $1 OR wanted_item_id = $1
             )",
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }
}
