//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` (or `&mut PgConnection` inside a transaction) as
//! the first argument.

pub mod item_repo;
pub mod proposal_repo;
pub mod user_repo;

pub use item_repo::ItemRepo;
pub use proposal_repo::ProposalRepo;
pub use user_repo::UserRepo;
