//! Shared query parameter types for API handlers.

use barter_core::error::CoreError;
use barter_core::item::blank_to_none;
use barter_core::pagination::{
    clamp_limit, clamp_offset, PageRequest, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT,
};
use barter_core::proposal::ProposalStatus;
use barter_db::models::item::ItemFilter;
use barter_db::models::proposal::ProposalFilter;
use serde::Deserialize;

/// Query parameters for `GET /items` (`?category=&search=&page=&limit=`).
#[derive(Debug, Default, Deserialize)]
pub struct ItemListParams {
    pub category: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl ItemListParams {
    /// Split into the repository filter and a clamped page request.
    /// Blank filter values are treated as absent.
    pub fn into_parts(self) -> (ItemFilter, PageRequest) {
        let filter = ItemFilter {
            category: blank_to_none(self.category),
            search: blank_to_none(self.search),
        };
        (filter, PageRequest::new(self.page, self.limit))
    }
}

/// Query parameters for the proposal listings (`?status=&limit=&offset=`).
#[derive(Debug, Default, Deserialize)]
pub struct ProposalListParams {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ProposalListParams {
    /// Parse the status filter and clamp the window.
    pub fn into_filter(self) -> Result<ProposalFilter, CoreError> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<ProposalStatus>()
                    .map_err(|e| CoreError::Validation(e.to_string()))?,
            ),
        };
        Ok(ProposalFilter {
            status,
            limit: clamp_limit(self.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT),
            offset: clamp_offset(self.offset),
        })
    }
}
