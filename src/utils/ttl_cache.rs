//! Time-to-live memoization for expensive probes.
//!
//! Spawning `haxe -version` or searching `PATH` on every access is too slow
//! for code that runs on every file change, but caching forever would never
//! notice an SDK installed after startup. [`TtlCache`] owns a value, the time
//! it was computed, and the function that recomputes it. The lifetime of each
//! value is chosen by a second function so that negative results can expire
//! quickly while confirmed results are kept for a long time.
//!
//! # Concurrency
//!
//! The cache is single-writer: the internal mutex is held while the value is
//! recomputed, so concurrent readers hitting a stale entry block until exactly
//! one of them has refreshed it, then all observe the new value.
//!
//! # Examples
//!
//! ```rust
//! use hxdeps::utils::ttl_cache::TtlCache;
//! use std::time::Duration;
//!
//! let cache = TtlCache::new(|| 42, |_| Duration::from_secs(60));
//! assert_eq!(cache.get(), 42);
//! ```

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

type Compute<T> = Box<dyn Fn() -> T + Send + Sync>;
type Lifetime<T> = Box<dyn Fn(&T) -> Duration + Send + Sync>;

struct Entry<T> {
    value: T,
    computed_at: Instant,
    ttl: Duration,
}

impl<T> Entry<T> {
    fn is_fresh(&self) -> bool {
        self.computed_at.elapsed() < self.ttl
    }
}

/// A memoized value that is recomputed once its lifetime has elapsed.
pub struct TtlCache<T> {
    entry: Mutex<Option<Entry<T>>>,
    compute: Compute<T>,
    lifetime: Lifetime<T>,
}

impl<T: Clone> TtlCache<T> {
    /// Create an empty cache.
    ///
    /// `compute` produces the value; `lifetime` decides how long a given value
    /// stays fresh.
    pub fn new<C, L>(compute: C, lifetime: L) -> Self
    where
        C: Fn() -> T + Send + Sync + 'static,
        L: Fn(&T) -> Duration + Send + Sync + 'static,
    {
        Self {
            entry: Mutex::new(None),
            compute: Box::new(compute),
            lifetime: Box::new(lifetime),
        }
    }

    /// Return the cached value, recomputing it first if it is missing or stale.
    pub fn get(&self) -> T {
        let mut guard = self.entry.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(entry) = guard.as_ref()
            && entry.is_fresh()
        {
            return entry.value.clone();
        }

        let value = (self.compute)();
        let ttl = (self.lifetime)(&value);
        tracing::trace!(target: "ttl_cache", "Recomputed cached value (ttl {:?})", ttl);
        *guard = Some(Entry {
            value: value.clone(),
            computed_at: Instant::now(),
            ttl,
        });
        value
    }

    /// Drop the cached value so the next [`get`](Self::get) recomputes it.
    pub fn invalidate(&self) {
        *self.entry.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Whether a fresh value is currently cached.
    pub fn is_fresh(&self) -> bool {
        self.entry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(Entry::is_fresh)
    }
}
