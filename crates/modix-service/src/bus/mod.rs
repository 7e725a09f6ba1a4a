//! In-process event delivery
//!
//! The notification bus fans promotion events out to subscribers; the
//! cancellation pair tells long-running handlers the host is shutting down.

mod cancellation;
mod notification_bus;

pub use cancellation::{Cancellation, CancellationSource};
pub use notification_bus::NotificationBus;
