//! Repository for the `proposals` table.
//!
//! Every state-changing query is a single conditional statement so that two
//! concurrent callers can never both succeed:
//!
//! - insert relies on the partial unique index `uq_proposals_pending_triple`;
//! - transition is a compare-and-swap on `status = 'pending'`;
//! - cancel is a conditional delete on `status = 'pending'`.

use barter_core::proposal::ProposalStatus;
use barter_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::proposal::{Proposal, ProposalDetail, ProposalDetailRow, ProposalFilter};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, offered_item_id, wanted_item_id, proposer_id, item_owner_id, status, \
                       created_at, updated_at";

/// Detail projection. `$1` is the viewer; the counterpart is whichever party
/// the viewer is not.
const DETAIL_SELECT: &str = "SELECT \
        p.id, p.offered_item_id, p.wanted_item_id, p.proposer_id, p.item_owner_id, \
        p.status, p.created_at, p.updated_at, \
        o.name AS offered_name, o.description AS offered_description, \
        o.category AS offered_category, o.image_url AS offered_image_url, \
        o.owner_id AS offered_owner_id, o.is_active AS offered_is_active, \
        o.created_at AS offered_created_at, o.updated_at AS offered_updated_at, \
        w.name AS wanted_name, w.description AS wanted_description, \
        w.category AS wanted_category, w.image_url AS wanted_image_url, \
        w.owner_id AS wanted_owner_id, w.is_active AS wanted_is_active, \
        w.created_at AS wanted_created_at, w.updated_at AS wanted_updated_at, \
        c.national_id AS counterpart_id, c.name AS counterpart_name, \
        c.address AS counterpart_address \
     FROM proposals p \
     JOIN items o ON o.id = p.offered_item_id \
     JOIN items w ON w.id = p.wanted_item_id \
     JOIN users c ON c.national_id = \
         CASE WHEN p.proposer_id = $1 THEN p.item_owner_id ELSE p.proposer_id END";

/// Provides queries and atomic transitions for proposals.
pub struct ProposalRepo;

impl ProposalRepo {
    /// Insert a pending proposal unless one already exists for the same
    /// (offered, wanted, proposer) triple.
    ///
    /// Returns `None` when the partial unique index rejected the row. A
    /// concurrent insert of the same triple blocks on the index until the
    /// first transaction finishes, so exactly one caller gets `Some`.
    pub async fn create_pending(
        conn: &mut PgConnection,
        offered_item_id: DbId,
        wanted_item_id: DbId,
        proposer_id: &str,
        item_owner_id: &str,
    ) -> Result<Option<Proposal>, sqlx::Error> {
        let query = format!(
            "INSERT INTO proposals (offered_item_id, wanted_item_id, proposer_id, item_owner_id)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (offered_item_id, wanted_item_id, proposer_id)
                 WHERE status = 'pending'
                 DO NOTHING
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Proposal>(&query)
            .bind(offered_item_id)
            .bind(wanted_item_id)
            .bind(proposer_id)
            .bind(item_owner_id)
            .fetch_optional(conn)
            .await
    }

    /// Find a proposal by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Proposal>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM proposals WHERE id = $1");
        sqlx::query_as::<_, Proposal>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a proposal with both items and the counterpart of `viewer_id`.
    pub async fn find_detail(
        pool: &PgPool,
        id: DbId,
        viewer_id: &str,
    ) -> Result<Option<ProposalDetail>, sqlx::Error> {
        let query = format!("{DETAIL_SELECT} WHERE p.id = $2");
        let row = sqlx::query_as::<_, ProposalDetailRow>(&query)
            .bind(viewer_id)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(ProposalDetail::from))
    }

    /// Move a pending proposal to `status`, if `item_owner_id` is its item owner.
    ///
    /// Compare-and-swap: returns `None` when the proposal is absent, owned by
    /// someone else, or no longer pending.
    pub async fn transition(
        pool: &PgPool,
        id: DbId,
        item_owner_id: &str,
        status: ProposalStatus,
    ) -> Result<Option<Proposal>, sqlx::Error> {
        let query = format!(
            "UPDATE proposals SET status = $3
             WHERE id = $1 AND item_owner_id = $2 AND status = 'pending'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Proposal>(&query)
            .bind(id)
            .bind(item_owner_id)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Delete a pending proposal, if `proposer_id` made it.
    ///
    /// Returns `true` if the row was removed.
    pub async fn delete_pending(
        pool: &PgPool,
        id: DbId,
        proposer_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM proposals WHERE id = $1 AND proposer_id = $2 AND status = 'pending'",
        )
        .bind(id)
        .bind(proposer_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Proposals made by `proposer_id`, newest first.
    pub async fn list_sent(
        pool: &PgPool,
        proposer_id: &str,
        filter: &ProposalFilter,
    ) -> Result<Vec<ProposalDetail>, sqlx::Error> {
        Self::list_for(pool, "p.proposer_id", proposer_id, filter).await
    }

    /// Proposals awaiting or decided by `item_owner_id`, newest first.
    pub async fn list_received(
        pool: &PgPool,
        item_owner_id: &str,
        filter: &ProposalFilter,
    ) -> Result<Vec<ProposalDetail>, sqlx::Error> {
        Self::list_for(pool, "p.item_owner_id", item_owner_id, filter).await
    }

    /// Shared listing query; `party_column` is a fixed column name, never input.
    async fn list_for(
        pool: &PgPool,
        party_column: &'static str,
        user_id: &str,
        filter: &ProposalFilter,
    ) -> Result<Vec<ProposalDetail>, sqlx::Error> {
        let query = format!(
            "{DETAIL_SELECT} \
             WHERE {party_column} = $1 AND ($2::text IS NULL OR p.status = $2) \
             ORDER BY p.id DESC \
             LIMIT $3 OFFSET $4"
        );
        let rows = sqlx::query_as::<_, ProposalDetailRow>(&query)
            .bind(user_id)
            .bind(filter.status.map(ProposalStatus::as_str))
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(ProposalDetail::from).collect())
    }
}
