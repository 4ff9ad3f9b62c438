//! Load status and last-request-wins cancellation.
//!
//! Every asynchronous load is started with a [`LoadTicket`] from a
//! [`RequestTracker`]. Starting a newer request, or cancelling the tracker
//! when the consuming view goes away, makes older tickets stale; a load that
//! finishes with a stale ticket must drop its result.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Status of an asynchronous load as exposed to the consuming view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "state", content = "reason", rename_all = "lowercase")]
pub enum LoadStatus {
    /// Feature disabled; nothing requested.
    #[default]
    Off,
    Loading,
    Ready,
    Failed(String),
}

impl LoadStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, LoadStatus::Ready)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, LoadStatus::Failed(_))
    }
}

/// Hands out tickets and tracks which one is current.
#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
    generation: Arc<AtomicU64>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, superseding all earlier tickets.
    pub fn begin(&self) -> LoadTicket {
        let id = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        LoadTicket {
            id,
            generation: Arc::clone(&self.generation),
        }
    }

    /// Invalidate every outstanding ticket (view torn down).
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

/// Proof that a load was started; checked before applying its result.
#[derive(Debug, Clone)]
pub struct LoadTicket {
    id: u64,
    generation: Arc<AtomicU64>,
}

impl LoadTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// True while no newer request or cancellation has happened.
    pub fn is_current(&self) -> bool {
        self.generation.load(Ordering::SeqCst) == self.id
    }

    pub fn is_cancelled(&self) -> bool {
        !self.is_current()
    }
}
