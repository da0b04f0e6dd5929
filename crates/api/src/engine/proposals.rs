//! Proposal engine: creation, accept/reject, cancellation and listings.
//!
//! Correctness under concurrency comes from the repository's conditional
//! writes, not from checks made here:
//!
//! 1. `create` locks both items `FOR SHARE` inside a transaction, checks the
//!    party rules against the locked rows, then inserts with
//!    `ON CONFLICT ... DO NOTHING` against the partial unique index on
//!    pending triples. Two concurrent identical creates yield one `Conflict`.
//! 2. `transition` and `cancel` are compare-and-swap statements on
//!    `status = 'pending'`. Of two racing decisions exactly one wins; the
//!    loser re-reads the row and gets `InvalidOperation`.
//!
//! Events are published only after the write is durable.

use std::sync::Arc;

use barter_core::error::CoreError;
use barter_core::proposal::{self, ProposalStatus, EVENT_PROPOSAL_CREATED};
use barter_core::types::DbId;
use barter_db::models::proposal::{Proposal, ProposalDetail, ProposalFilter};
use barter_db::repositories::{ItemRepo, ProposalRepo};
use barter_events::{EventBus, PlatformEvent};
use serde_json::json;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Entity type recorded on proposal events.
const SOURCE_ENTITY: &str = "proposal";

/// Runs the proposal state machine for an authenticated caller.
pub struct ProposalEngine {
    pool: PgPool,
    event_bus: Arc<EventBus>,
}

impl ProposalEngine {
    pub fn new(pool: PgPool, event_bus: Arc<EventBus>) -> Self {
        Self { pool, event_bus }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.pool.clone(), Arc::clone(&state.event_bus))
    }

    /// Propose trading `offered_item_id` (owned by `proposer_id`) for
    /// `wanted_item_id` (owned by someone else).
    pub async fn create(
        &self,
        proposer_id: &str,
        offered_item_id: DbId,
        wanted_item_id: DbId,
    ) -> AppResult<Proposal> {
        let created = self
            .insert_pending(proposer_id, offered_item_id, wanted_item_id)
            .await
            .inspect_err(|e| {
                if let AppError::Database(err) = e {
                    tracing::error!(
                        error = %err,
                        proposer_id,
                        offered_item_id,
                        wanted_item_id,
                        "Failed to create proposal"
                    );
                }
            })?;

        tracing::info!(
            proposal_id = created.id,
            proposer_id,
            item_owner_id = %created.item_owner_id,
            offered_item_id,
            wanted_item_id,
            "Proposal created"
        );

        self.event_bus.publish(
            PlatformEvent::new(EVENT_PROPOSAL_CREATED)
                .with_source(SOURCE_ENTITY, created.id)
                .with_actor(proposer_id)
                .with_recipient(created.item_owner_id.clone())
                .with_payload(json!({
                    "status": created.status,
                    "offered_item_id": offered_item_id,
                    "wanted_item_id": wanted_item_id,
                })),
        );

        Ok(created)
    }

    /// The create transaction: lock both items, check the party rules, insert.
    async fn insert_pending(
        &self,
        proposer_id: &str,
        offered_item_id: DbId,
        wanted_item_id: DbId,
    ) -> AppResult<Proposal> {
        let mut tx = self.pool.begin().await?;

        let items = ItemRepo::lock_for_share(&mut *tx, &[offered_item_id, wanted_item_id]).await?;
        let find = |id: DbId| {
            items
                .iter()
                .find(|item| item.id == id)
                .ok_or_else(|| CoreError::not_found("Item", id))
        };
        let offered = find(offered_item_id)?;
        let wanted = find(wanted_item_id)?;

        proposal::check_parties(proposer_id, &offered.owner_id, &wanted.owner_id)?;
        proposal::check_available(offered.is_active, wanted.is_active)?;

        let created = ProposalRepo::create_pending(
            &mut *tx,
            offered_item_id,
            wanted_item_id,
            proposer_id,
            &wanted.owner_id,
        )
        .await?
        .ok_or_else(|| {
            CoreError::Conflict("You already have a pending proposal for these items".into())
        })?;

        tx.commit().await?;
        Ok(created)
    }

    /// Accept or reject a pending proposal. Only the wanted item's owner may
    /// decide, and only once.
    pub async fn transition(
        &self,
        proposal_id: DbId,
        requester_id: &str,
        status: ProposalStatus,
    ) -> AppResult<Proposal> {
        proposal::check_decision(status)?;

        let Some(updated) = ProposalRepo::transition(&self.pool, proposal_id, requester_id, status)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    error = %e,
                    proposal_id,
                    requester_id,
                    %status,
                    "Failed to decide proposal"
                );
            })?
        else {
            let current = self.require(proposal_id).await?;
            if current.item_owner_id != requester_id {
                return Err(CoreError::Forbidden(
                    "Only the owner of the wanted item can respond to this proposal".into(),
                )
                .into());
            }
            proposal::check_transition(current.status)?;
            return Err(CoreError::Internal(format!(
                "Transition of proposal {proposal_id} matched no row"
            ))
            .into());
        };

        tracing::info!(
            proposal_id,
            item_owner_id = requester_id,
            status = %updated.status,
            "Proposal decided"
        );

        self.event_bus.publish(
            PlatformEvent::new(updated.status.event_type())
                .with_source(SOURCE_ENTITY, updated.id)
                .with_actor(requester_id)
                .with_recipient(updated.proposer_id.clone())
                .with_payload(json!({ "status": updated.status })),
        );

        Ok(updated)
    }

    /// Withdraw a pending proposal. The row is deleted; no one is notified.
    pub async fn cancel(&self, proposal_id: DbId, requester_id: &str) -> AppResult<()> {
        let deleted = ProposalRepo::delete_pending(&self.pool, proposal_id, requester_id)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    error = %e,
                    proposal_id,
                    requester_id,
                    "Failed to cancel proposal"
                );
            })?;
        if deleted {
            tracing::info!(proposal_id, proposer_id = requester_id, "Proposal cancelled");
            return Ok(());
        }

        let current = self.require(proposal_id).await?;
        if current.proposer_id != requester_id {
            return Err(CoreError::Forbidden(
                "Only the proposer can cancel this proposal".into(),
            )
            .into());
        }
        proposal::check_cancel(current.status)?;
        Err(CoreError::Internal(format!("Cancel of proposal {proposal_id} matched no row")).into())
    }

    /// Full detail of one proposal, visible only to its two parties.
    pub async fn get(&self, proposal_id: DbId, requester_id: &str) -> AppResult<ProposalDetail> {
        let detail = ProposalRepo::find_detail(&self.pool, proposal_id, requester_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Proposal", proposal_id))?;

        let proposal = &detail.proposal;
        if proposal.proposer_id != requester_id && proposal.item_owner_id != requester_id {
            return Err(CoreError::Forbidden(
                "You are not a party to this proposal".into(),
            )
            .into());
        }
        Ok(detail)
    }

    /// Proposals `user_id` has made, newest first.
    pub async fn list_sent(
        &self,
        user_id: &str,
        filter: &ProposalFilter,
    ) -> AppResult<Vec<ProposalDetail>> {
        Ok(ProposalRepo::list_sent(&self.pool, user_id, filter).await?)
    }

    /// Proposals made for `user_id`'s items, newest first.
    pub async fn list_received(
        &self,
        user_id: &str,
        filter: &ProposalFilter,
    ) -> AppResult<Vec<ProposalDetail>> {
        Ok(ProposalRepo::list_received(&self.pool, user_id, filter).await?)
    }

    async fn require(&self, proposal_id: DbId) -> AppResult<Proposal> {
        ProposalRepo::find_by_id(&self.pool, proposal_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Proposal", proposal_id).into())
    }
}
