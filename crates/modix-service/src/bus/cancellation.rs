//! Cooperative cancellation
//!
//! A [`CancellationSource`] is held by the host; [`Cancellation`] tokens are
//! handed to handlers, which check them before starting new side effects.

use tokio::sync::watch;

/// Owner side; cancels every token created from it
#[derive(Debug)]
pub struct CancellationSource {
    sender: watch::Sender<bool>,
}

impl CancellationSource {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self { sender }
    }

    /// A token observing this source
    pub fn token(&self) -> Cancellation {
        Cancellation {
            receiver: Some(self.sender.subscribe()),
        }
    }

    /// Signal cancellation; idempotent
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }
}

impl Default for CancellationSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Handler side of a cancellation signal
///
/// Dropping the source without cancelling leaves its tokens uncancelled.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    receiver: Option<watch::Receiver<bool>>,
}

impl Cancellation {
    /// A token that is never cancelled
    pub fn none() -> Self {
        Self { receiver: None }
    }

    pub fn is_cancelled(&self) -> bool {
        self.receiver.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Resolve once cancellation is signalled
    pub async fn cancelled(&self) {
        let Some(mut receiver) = self.receiver.clone() else {
            return std::future::pending().await;
        };
        if receiver.wait_for(|cancelled| *cancelled).await.is_err() {
            // Source dropped without cancelling
            std::future::pending::<()>().await;
        }
    }
}
