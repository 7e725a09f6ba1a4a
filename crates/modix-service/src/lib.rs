//! # modix-service
//!
//! Application layer for promotion campaigns: the promotion service, request
//! and response DTOs, the in-process notification bus, and the dialog
//! behavior that keeps chat messages in sync with campaign state.

pub mod bus;
pub mod dialog;
pub mod dto;
pub mod services;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use bus::{Cancellation, CancellationSource, NotificationBus};
pub use dialog::{DialogCache, DialogEntry, PromotionDialogBehavior, ReconcileReport};
pub use services::{
    PromotionService, ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult,
};
