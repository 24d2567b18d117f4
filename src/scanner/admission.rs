//! Bounded admission for in-flight banner grabs.
//!
//! A counting semaphore hands out [`AdmissionToken`]s. A token is returned
//! to the pool when dropped, so release happens exactly once whether the
//! grab finished, found nothing, or panicked.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Default ceiling on simultaneous grabs.
pub const DEFAULT_CONCURRENCY: usize = 100;

/// Fixed-capacity pool of admission tokens.
#[derive(Debug, Clone)]
pub struct Admission {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

/// Proof of admission. Hold it for the whole grab; dropping it releases.
#[derive(Debug)]
pub struct AdmissionToken {
    _permit: OwnedSemaphorePermit,
}

impl Admission {
    /// Create a pool of `capacity` tokens. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, Semaphore::MAX_PERMITS);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Wait until a token is free.
    pub async fn acquire(&self) -> AdmissionToken {
        // The semaphore is owned here and never closed.
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .unwrap_or_else(|_| unreachable!("admission semaphore is never closed"));
        AdmissionToken { _permit: permit }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Tokens currently held.
    pub fn in_flight(&self) -> usize {
        self.capacity - self.semaphore.available_permits()
    }
}

impl Default for Admission {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY)
    }
}
