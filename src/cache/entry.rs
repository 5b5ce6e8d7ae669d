//! Cache Entry Module
//!
//! Defines a single cached payload together with its expiry instant.

use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// A stored payload and the instant after which it must no longer be served.
///
/// Entries are immutable once stored. A new `set` for the same key builds a
/// fresh entry and replaces this one wholesale.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    /// The stored payload
    pub data: T,
    /// Last instant at which the entry is still visible, None = never expires
    pub expires_at: Option<Instant>,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates a new entry that expires `ttl` from now.
    ///
    /// A TTL too large to be represented as an instant yields an entry that
    /// never expires.
    pub fn new(data: T, ttl: Duration) -> Self {
        Self {
            data,
            expires_at: Instant::now().checked_add(ttl),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired as of `now`.
    ///
    /// Boundary condition: the entry stays visible while `now <= expires_at`
    /// and is expired from the first instant strictly after it.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now > expires,
            None => false,
        }
    }
}
