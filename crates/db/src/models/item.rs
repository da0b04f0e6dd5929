//! Item entity model and DTOs.

use barter_core::item::{blank_to_none, validate_image_url};
use barter_core::types::{DbId, NationalId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `items` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Item {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub owner_id: NationalId,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An item joined with its owner's public name and address.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ItemListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub item: Item,
    pub owner_name: String,
    pub owner_address: String,
}

/// Filters for the public item listing.
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    pub category: Option<String>,
    /// Case-insensitive substring matched against name or description.
    pub search: Option<String>,
}

/// DTO for creating a new item. The owner comes from the caller's identity.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateItem {
    #[validate(length(min = 2, max = 100, message = "Item name must be 2-100 characters"))]
    pub name: String,
    #[validate(length(min = 5, max = 100, message = "Description must be 5-100 characters"))]
    pub description: String,
    #[validate(length(max = 50, message = "Category must be at most 50 characters"))]
    pub category: Option<String>,
    #[validate(custom(function = "validate_image_url"))]
    pub image_url: Option<String>,
}

impl CreateItem {
    /// Trim text fields; blank optional fields become `None`.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            category: blank_to_none(self.category),
            image_url: blank_to_none(self.image_url),
        }
    }
}

/// DTO for updating an item. All fields are optional.
///
/// For `category` and `image_url`, `Some("")` clears the stored value while
/// `None` leaves it unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateItem {
    #[validate(length(min = 2, max = 100, message = "Item name must be 2-100 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 5, max = 100, message = "Description must be 5-100 characters"))]
    pub description: Option<String>,
    #[validate(length(max = 50, message = "Category must be at most 50 characters"))]
    pub category: Option<String>,
    #[validate(custom(function = "validate_image_url"))]
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
}

impl UpdateItem {
    /// `true` when no field would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.image_url.is_none()
            && self.is_active.is_none()
    }

    /// Trim every provided text field.
    pub fn normalized(self) -> Self {
        let trim = |v: Option<String>| v.map(|s| s.trim().to_string());
        Self {
            name: trim(self.name),
            description: trim(self.description),
            category: trim(self.category),
            image_url: trim(self.image_url),
            is_active: self.is_active,
        }
    }
}
