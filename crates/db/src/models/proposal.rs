//! Proposal entity model and read projections.

use barter_core::proposal::ProposalStatus;
use barter_core::types::{DbId, NationalId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::item::Item;
use crate::models::user::PublicProfile;

/// A row from the `proposals` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Proposal {
    pub id: DbId,
    pub offered_item_id: DbId,
    pub wanted_item_id: DbId,
    pub proposer_id: NationalId,
    /// Owner of the wanted item at creation time; decides accept/reject.
    pub item_owner_id: NationalId,
    #[sqlx(try_from = "String")]
    pub status: ProposalStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A proposal with both items and the other party's public profile.
///
/// "Other party" is relative to the viewer: the item owner for the proposer,
/// the proposer for the item owner.
#[derive(Debug, Clone, Serialize)]
pub struct ProposalDetail {
    #[serde(flatten)]
    pub proposal: Proposal,
    pub offered_item: Item,
    pub wanted_item: Item,
    pub counterpart: PublicProfile,
}

/// Filters for the sent / received listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProposalFilter {
    pub status: Option<ProposalStatus>,
    pub limit: i64,
    pub offset: i64,
}

/// Flat join row behind [`ProposalDetail`]; item columns are prefixed.
#[derive(Debug, FromRow)]
pub struct ProposalDetailRow {
    #[sqlx(flatten)]
    pub proposal: Proposal,

    pub offered_name: String,
    pub offered_description: String,
    pub offered_category: Option<String>,
    pub offered_image_url: Option<String>,
    pub offered_owner_id: NationalId,
    pub offered_is_active: bool,
    pub offered_created_at: Timestamp,
    pub offered_updated_at: Timestamp,

    pub wanted_name: String,
    pub wanted_description: String,
    pub wanted_category: Option<String>,
    pub wanted_image_url: Option<String>,
    pub wanted_owner_id: NationalId,
    pub wanted_is_active: bool,
    pub wanted_created_at: Timestamp,
    pub wanted_updated_at: Timestamp,

    pub counterpart_id: NationalId,
    pub counterpart_name: String,
    pub counterpart_address: String,
}

impl From<ProposalDetailRow> for ProposalDetail {
    fn from(row: ProposalDetailRow) -> Self {
        let offered_item = Item {
            id: row.proposal.offered_item_id,
            name: row.offered_name,
            description: row.offered_description,
            category: row.offered_category,
            image_url: row.offered_image_url,
            owner_id: row.offered_owner_id,
            is_active: row.offered_is_active,
            created_at: row.offered_created_at,
            updated_at: row.offered_updated_at,
        };
        let wanted_item = Item {
            id: row.proposal.wanted_item_id,
            name: row.wanted_name,
            description: row.wanted_description,
            category: row.wanted_category,
            image_url: row.wanted_image_url,
            owner_id: row.wanted_owner_id,
            is_active: row.wanted_is_active,
            created_at: row.wanted_created_at,
            updated_at: row.wanted_updated_at,
        };
        Self {
            proposal: row.proposal,
            offered_item,
            wanted_item,
            counterpart: PublicProfile {
                national_id: row.counterpart_id,
                name: row.counterpart_name,
                address: row.counterpart_address,
            },
        }
    }
}
