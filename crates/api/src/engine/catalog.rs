//! Item catalog service.
//!
//! Every mutation is a single owner-conditional statement; when it touches no
//! row the item is re-read only to pick the right error.

use barter_core::error::CoreError;
use barter_core::pagination::{PageMeta, PageRequest};
use barter_core::types::DbId;
use barter_db::models::item::{CreateItem, Item, ItemFilter, ItemListing, UpdateItem};
use barter_db::repositories::{ItemRepo, UserRepo};
use sqlx::PgPool;

use crate::error::AppResult;
use crate::state::AppState;

/// Item CRUD on behalf of an authenticated owner.
pub struct ItemCatalog {
    pool: PgPool,
}

impl ItemCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.pool.clone())
    }

    /// Create an active item owned by `owner_id`.
    pub async fn create(&self, owner_id: &str, input: CreateItem) -> AppResult<Item> {
        if !UserRepo::exists(&self.pool, owner_id).await? {
            return Err(CoreError::not_found("User", owner_id).into());
        }

        let item = ItemRepo::create(&self.pool, owner_id, &input.normalized()).await?;
        tracing::info!(item_id = item.id, owner_id, "Item created");
        Ok(item)
    }

    /// An item, active or not, with its owner's public name and address.
    pub async fn get(&self, id: DbId) -> AppResult<ItemListing> {
        ItemRepo::find_listing(&self.pool, id)
            .await?
            .ok_or_else(|| CoreError::not_found("Item", id).into())
    }

    /// Apply `patch` if `requester` owns the item.
    pub async fn update(&self, id: DbId, requester: &str, patch: UpdateItem) -> AppResult<Item> {
        if patch.is_empty() {
            return Err(CoreError::Validation("No fields to update".into()).into());
        }

        match ItemRepo::update_owned(&self.pool, id, requester, &patch.normalized()).await? {
            Some(item) => {
                tracing::info!(item_id = id, owner_id = requester, "Item updated");
                Ok(item)
            }
            None => Err(self
                .ownership_miss(id, requester)
                .await?
                .unwrap_or_else(|| {
                    CoreError::Internal(format!("Update of item {id} matched no row"))
                })
                .into()),
        }
    }

    /// Delete an item if `requester` owns it and no proposal references it.
    ///
    /// Items with proposal history must be deactivated instead, so both
    /// parties keep seeing what was traded.
    pub async fn delete(&self, id: DbId, requester: &str) -> AppResult<()> {
        if ItemRepo::delete_owned(&self.pool, id, requester).await? {
            tracing::info!(item_id = id, owner_id = requester, "Item deleted");
            return Ok(());
        }

        if let Some(err) = self.ownership_miss(id, requester).await? {
            return Err(err.into());
        }
        if ItemRepo::is_referenced(&self.pool, id).await? {
            return Err(CoreError::InvalidOperation(
                "Item is part of a proposal and cannot be deleted; deactivate it instead".into(),
            )
            .into());
        }
        Err(CoreError::Internal(format!("Delete of item {id} matched no row")).into())
    }

    /// One page of active items matching `filter`, newest first.
    pub async fn list(
        &self,
        filter: &ItemFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<ItemListing>, PageMeta)> {
        let (items, total) = ItemRepo::list_active(&self.pool, filter, page).await?;
        Ok((items, page.meta(total)))
    }

    /// Every item of `owner_id`, including inactive ones.
    pub async fn list_mine(&self, owner_id: &str) -> AppResult<Vec<Item>> {
        Ok(ItemRepo::list_by_owner(&self.pool, owner_id).await?)
    }

    /// Explain why an owner-conditional write touched nothing: `NotFound` or
    /// `Forbidden`, or `None` when `requester` does own the item.
    async fn ownership_miss(
        &self,
        id: DbId,
        requester: &str,
    ) -> Result<Option<CoreError>, sqlx::Error> {
        Ok(match ItemRepo::find_by_id(&self.pool, id).await? {
            None => Some(CoreError::not_found("Item", id)),
            Some(item) if item.owner_id != requester => Some(CoreError::Forbidden(
                "You can only modify your own items".into(),
            )),
            Some(_) => None,
        })
    }
}
