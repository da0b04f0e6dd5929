pub mod auth;
pub mod items;
pub mod proposals;
pub mod users;
