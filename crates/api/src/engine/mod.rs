//! Domain services that sit between the handlers and the repositories.
//!
//! - [`catalog::ItemCatalog`] -- item CRUD with owner-only mutation.
//! - [`proposals::ProposalEngine`] -- the proposal state machine; publishes
//!   an event on the bus after every committed change that needs a notification.

pub mod catalog;
pub mod proposals;

pub use catalog::ItemCatalog;
pub use proposals::ProposalEngine;
