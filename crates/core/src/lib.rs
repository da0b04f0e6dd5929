//! Domain primitives for the barter marketplace.
//!
//! This crate has no I/O. It holds the shared error taxonomy, id types, the
//! national-ID checksum, the proposal state machine rules and the pagination
//! and item-field helpers used by the repository and API layers.

pub mod error;
pub mod item;
pub mod national_id;
pub mod pagination;
pub mod proposal;
pub mod types;
