//! Proposal state machine rules.
//!
//! ```text
//! pending ──accept──▶ accepted   (terminal)
//!    │
//!    └────reject───▶ rejected    (terminal)
//! ```
//!
//! Cancellation is not a state: a pending proposal is deleted outright.
//! The repository layer enforces these rules atomically with conditional
//! writes; the functions here are the single source of the rule text and are
//! used to classify a failed conditional write after the fact.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Event emitted when a proposal is created (recipient: wanted item's owner).
pub const EVENT_PROPOSAL_CREATED: &str = "proposal.created";

/// Event emitted when a proposal is accepted (recipient: proposer).
pub const EVENT_PROPOSAL_ACCEPTED: &str = "proposal.accepted";

/// Event emitted when a proposal is rejected (recipient: proposer).
pub const EVENT_PROPOSAL_REJECTED: &str = "proposal.rejected";

/// Lifecycle status of a proposal, stored as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ProposalStatus {
    /// Database / wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    /// Terminal statuses accept no further transitions.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Event type published when a proposal reaches this status.
    pub fn event_type(self) -> &'static str {
        match self {
            Self::Pending => EVENT_PROPOSAL_CREATED,
            Self::Accepted => EVENT_PROPOSAL_ACCEPTED,
            Self::Rejected => EVENT_PROPOSAL_REJECTED,
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a stored or submitted status string is not recognised.
#[derive(Debug, thiserror::Error)]
#[error("Unknown proposal status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for ProposalStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for ProposalStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Check the party rules for a new proposal.
///
/// - the proposer must own the offered item (`Forbidden`);
/// - the proposer must not own the wanted item (`InvalidOperation`).
pub fn check_parties(
    proposer: &str,
    offered_owner: &str,
    wanted_owner: &str,
) -> Result<(), CoreError> {
    if offered_owner != proposer {
        return Err(CoreError::Forbidden(
            "You can only offer items you own".into(),
        ));
    }
    if wanted_owner == proposer {
        return Err(CoreError::InvalidOperation(
            "Cannot make a proposal for your own item".into(),
        ));
    }
    Ok(())
}

/// Check that both items are still listed. Deactivated items accept no new
/// proposals; existing ones are left as they are.
pub fn check_available(offered_active: bool, wanted_active: bool) -> Result<(), CoreError> {
    if !offered_active || !wanted_active {
        return Err(CoreError::InvalidOperation(
            "Both items must be active to make a proposal".into(),
        ));
    }
    Ok(())
}

/// Check that `target` is a status a pending proposal may move to.
pub fn check_decision(target: ProposalStatus) -> Result<(), CoreError> {
    if target == ProposalStatus::Pending {
        return Err(CoreError::InvalidOperation(
            "A proposal can only be accepted or rejected".into(),
        ));
    }
    Ok(())
}

/// Check that a proposal in `current` status may still be transitioned.
///
/// Re-applying the status a proposal already has is rejected as well.
pub fn check_transition(current: ProposalStatus) -> Result<(), CoreError> {
    if current.is_terminal() {
        return Err(CoreError::InvalidOperation(format!(
            "This proposal has already been processed ({current})"
        )));
    }
    Ok(())
}

/// Check that a proposal in `current` status may still be cancelled.
pub fn check_cancel(current: ProposalStatus) -> Result<(), CoreError> {
    if current.is_terminal() {
        return Err(CoreError::InvalidOperation(
            "Only pending proposals can be cancelled".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const ALICE: &str = "52998224725";
    const BOB: &str = "11144477735";

    #[test]
    fn status_round_trips_through_text() {
        for status in [
            ProposalStatus::Pending,
            ProposalStatus::Accepted,
            ProposalStatus::Rejected,
        ] {
            assert_eq!(status.as_str().parse::<ProposalStatus>().unwrap(), status);
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        let err = "cancelled".parse::<ProposalStatus>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown proposal status 'cancelled'");
    }

    #[test]
    fn status_displays_as_stored_text() {
        assert_eq!(ProposalStatus::Accepted.to_string(), "accepted");
    }

    #[test]
    fn only_pending_is_non_terminal() {
        assert!(!ProposalStatus::Pending.is_terminal());
        assert!(ProposalStatus::Accepted.is_terminal());
        assert!(ProposalStatus::Rejected.is_terminal());
    }

    #[test]
    fn parties_valid_when_offering_own_item_for_anothers() {
        assert!(check_parties(ALICE, ALICE, BOB).is_ok());
    }

    #[test]
    fn offering_someone_elses_item_is_forbidden() {
        assert_matches!(check_parties(ALICE, BOB, BOB), Err(CoreError::Forbidden(_)));
    }

    #[test]
    fn self_trade_is_invalid() {
        assert_matches!(
            check_parties(ALICE, ALICE, ALICE),
            Err(CoreError::InvalidOperation(_))
        );
    }

    #[test]
    fn inactive_items_take_no_proposals() {
        assert!(check_available(true, true).is_ok());
        assert_matches!(check_available(false, true), Err(CoreError::InvalidOperation(_)));
        assert_matches!(check_available(true, false), Err(CoreError::InvalidOperation(_)));
    }

    #[test]
    fn pending_is_not_a_decision() {
        assert_matches!(
            check_decision(ProposalStatus::Pending),
            Err(CoreError::InvalidOperation(_))
        );
        assert!(check_decision(ProposalStatus::Accepted).is_ok());
        assert!(check_decision(ProposalStatus::Rejected).is_ok());
    }

    #[test]
    fn terminal_proposals_cannot_transition_or_cancel() {
        for status in [ProposalStatus::Accepted, ProposalStatus::Rejected] {
            assert_matches!(check_transition(status), Err(CoreError::InvalidOperation(_)));
            assert_matches!(check_cancel(status), Err(CoreError::InvalidOperation(_)));
        }
        assert!(check_transition(ProposalStatus::Pending).is_ok());
        assert!(check_cancel(ProposalStatus::Pending).is_ok());
    }

    #[test]
    fn event_type_follows_status() {
        assert_eq!(ProposalStatus::Accepted.event_type(), EVENT_PROPOSAL_ACCEPTED);
        assert_eq!(ProposalStatus::Rejected.event_type(), EVENT_PROPOSAL_REJECTED);
    }
}
