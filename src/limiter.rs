use std::sync::Arc;

use tokio::sync::{Semaphore, SemaphorePermit};

/// Bounds the number of sessions scored at the same time.
#[derive(Debug, Clone)]
pub struct Limiter(Arc<Semaphore>);

#[derive(Debug)]
pub struct Permit<'a> {
    _permit: SemaphorePermit<'a>,
}

impl Limiter {
    pub fn new(limit: usize) -> Self {
        Self(Arc::new(Semaphore::new(limit)))
    }

    pub async fn get_permit(&self) -> Permit<'_> {
        // The semaphore is never closed.
        Permit { _permit: self.0.acquire().await.unwrap() }
    }

    #[cfg(test)]
    pub fn available(&self) -> usize {
        self.0.available_permits()
    }
}
