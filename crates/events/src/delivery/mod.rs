//! External delivery channels for proposal notifications.

pub mod email;
