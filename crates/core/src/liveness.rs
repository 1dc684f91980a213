//! Guard against applying asynchronous results to stale state.
//!
//! A screen or editor owns a [`Liveness`]; each outstanding request holds a
//! [`Ticket`]. Closing the owner, or switching to a new selection, calls
//! [`Liveness::invalidate`] and every earlier ticket stops being current.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct Liveness {
    generation: Arc<AtomicU64>,
}

/// Proof that a result was requested under a particular generation.
#[derive(Debug, Clone)]
pub struct Ticket {
    issued: u64,
    generation: Arc<AtomicU64>,
}

impl Liveness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ticket(&self) -> Ticket {
        Ticket {
            issued: self.generation.load(Ordering::Acquire),
            generation: Arc::clone(&self.generation),
        }
    }

    /// Make every ticket issued so far stale.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }
}

impl Ticket {
    pub fn is_current(&self) -> bool {
        self.generation.load(Ordering::Acquire) == self.issued
    }

    /// Run `f` with `value` only if this ticket is still current.
    pub fn apply<T, R>(&self, value: T, f: impl FnOnce(T) -> R) -> Option<R> {
        if self.is_current() {
            Some(f(value))
        } else {
            tracing::debug!("Discarding response for a stale request");
            None
        }
    }
}
