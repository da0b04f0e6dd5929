//! Barter event bus and notification delivery.
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`] -- the domain event envelope published after commit.
//! - [`Notifier`] -- the outbound notification contract, with
//!   [`EmailDelivery`] (SMTP) and [`LogNotifier`] implementations.
//! - [`NotificationDispatcher`] -- background task turning events into
//!   notifier calls. Its failures never reach the request that caused them.

pub mod bus;
pub mod delivery;
pub mod dispatcher;
pub mod notify;

pub use bus::{EventBus, PlatformEvent};
pub use delivery::email::{EmailConfig, EmailDelivery};
pub use dispatcher::NotificationDispatcher;
pub use notify::{LogNotifier, NotificationKind, Notifier, NotifyError};
