//! Event-to-notification dispatch.
//!
//! [`NotificationDispatcher`] subscribes to the event bus and, for every
//! proposal event, resolves the recipient's email and the proposal's item
//! names, then hands the result to the configured [`Notifier`]. It runs as
//! its own tokio task, so delivery latency and failures stay off the
//! request path.

use std::sync::Arc;

use barter_db::repositories::{ProposalRepo, UserRepo};
use barter_db::DbPool;
use serde_json::json;
use tokio::sync::broadcast;

use crate::bus::PlatformEvent;
use crate::notify::{NotificationKind, Notifier, NotifyError};

/// Error raised while handling a single event. Logged, never propagated.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Notify(#[from] NotifyError),
}

/// Routes proposal events to the notifier.
pub struct NotificationDispatcher {
    pool: DbPool,
    notifier: Arc<dyn Notifier>,
}

impl NotificationDispatcher {
    /// Create a new dispatcher with the given database pool and notifier.
    pub fn new(pool: DbPool, notifier: Arc<dyn Notifier>) -> Self {
        Self { pool, notifier }
    }

    /// Run the dispatch loop.
    ///
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](crate::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = self.dispatch(&event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            proposal_id = ?event.source_entity_id,
                            recipient = ?event.recipient_id,
                            "Failed to deliver notification"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification dispatcher lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification dispatcher shutting down");
                    break;
                }
            }
        }
    }

    /// Deliver the notification for a single event, if it warrants one.
    pub async fn dispatch(&self, event: &PlatformEvent) -> Result<(), DispatchError> {
        let Some(kind) = NotificationKind::from_event_type(&event.event_type) else {
            return Ok(());
        };
        let (Some(recipient_id), Some(proposal_id)) =
            (event.recipient_id.as_deref(), event.source_entity_id)
        else {
            tracing::warn!(event_type = %event.event_type, "Proposal event without recipient or source");
            return Ok(());
        };

        let Some(recipient) = UserRepo::find_by_national_id(&self.pool, recipient_id).await? else {
            tracing::warn!(recipient_id, "Notification recipient no longer exists");
            return Ok(());
        };

        // A proposal cancelled before we got here has nothing left to announce.
        let Some(detail) = ProposalRepo::find_detail(&self.pool, proposal_id, recipient_id).await?
        else {
            tracing::debug!(proposal_id, "Proposal gone before notification, skipping");
            return Ok(());
        };

        let payload = json!({
            "proposal_id": proposal_id,
            "status": event.payload["status"],
            "offered_item_name": detail.offered_item.name,
            "wanted_item_name": detail.wanted_item.name,
            "counterpart_name": detail.counterpart.name,
        });

        self.notifier.notify(&recipient.email, kind, &payload).await?;
        Ok(())
    }
}
