//! The outbound notification contract.
//!
//! The proposal engine never calls a [`Notifier`] directly: it publishes a
//! [`PlatformEvent`](crate::PlatformEvent) after commit, and the
//! [`NotificationDispatcher`](crate::NotificationDispatcher) resolves the
//! recipient and calls the notifier from its own task.

use async_trait::async_trait;
use barter_core::proposal::{
    EVENT_PROPOSAL_ACCEPTED, EVENT_PROPOSAL_CREATED, EVENT_PROPOSAL_REJECTED,
};
use serde_json::Value;

use crate::delivery::email::EmailError;

/// What happened, from the recipient's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// Someone proposed a trade for one of the recipient's items.
    NewProposal,
    /// A proposal the recipient made was accepted or rejected.
    StatusChanged,
}

impl NotificationKind {
    /// Map a bus event type to a notification, if the event warrants one.
    pub fn from_event_type(event_type: &str) -> Option<Self> {
        match event_type {
            EVENT_PROPOSAL_CREATED => Some(Self::NewProposal),
            EVENT_PROPOSAL_ACCEPTED | EVENT_PROPOSAL_REJECTED => Some(Self::StatusChanged),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NewProposal => "new_proposal",
            Self::StatusChanged => "status_changed",
        }
    }
}

/// Error type for notification delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error(transparent)]
    Email(#[from] EmailError),
}

/// Delivers a notification to a user's email address.
///
/// Implementations may be slow or fail; callers treat every call as
/// fire-and-forget.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(
        &self,
        recipient_email: &str,
        kind: NotificationKind,
        payload: &Value,
    ) -> Result<(), NotifyError>;
}

/// Notifier used when no SMTP server is configured: logs and succeeds.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(
        &self,
        recipient_email: &str,
        kind: NotificationKind,
        payload: &Value,
    ) -> Result<(), NotifyError> {
        tracing::info!(
            to = recipient_email,
            kind = kind.as_str(),
            %payload,
            "Notification (email delivery not configured)"
        );
        Ok(())
    }
}

/// Render the subject and plain-text body for a notification.
///
/// The payload carries `offered_item_name`, `wanted_item_name`,
/// `counterpart_name` and `status`, filled in by the dispatcher.
pub fn render_message(kind: NotificationKind, payload: &Value) -> (String, String) {
    let field = |key: &str| payload[key].as_str().unwrap_or("-").to_string();
    let wanted = field("wanted_item_name");

    match kind {
        NotificationKind::NewProposal => (
            "New proposal received".to_string(),
            format!(
                "You received a new proposal for your item: {wanted}\n\
                 Item offered: {}\n\
                 From: {}\n\n\
                 Sign in to review and answer the proposal.",
                field("offered_item_name"),
                field("counterpart_name"),
            ),
        ),
        NotificationKind::StatusChanged => {
            let accepted = payload["status"].as_str() == Some("accepted");
            let verdict = if accepted { "accepted" } else { "rejected" };
            let closing = if accepted {
                "Get in touch with the item owner to arrange the exchange!"
            } else {
                "Don't give up! Keep looking for other interesting items."
            };
            (
                format!("Proposal {}", verdict.to_uppercase()),
                format!("Your proposal for the item {wanted} was {verdict}.\n{closing}"),
            )
        }
    }
}
