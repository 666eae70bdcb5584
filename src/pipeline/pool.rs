// Copyright 2026 The av1e-core Authors
// Use of this source code is governed by a BSD-3-Clause license that can be
// found in the LICENSE file.

//! Typed object pools (§4.1): one bounded multi-producer/multi-consumer
//! free-list per pool. Acquire blocks until an object is returned; no user
//! lock is needed since the free-list itself is the synchronization point.

use crossbeam_channel::{bounded, Receiver, Sender};
use log::{debug, trace};

use crate::error::{PoolError, PoolResult};

/// A bounded pool of pre-allocated `T`s. Capacity is fixed at construction
/// (§4.1: pool capacities are derived once at init and never resized).
pub struct Pool<T> {
    name: &'static str,
    free: Receiver<T>,
    release: Sender<T>,
    capacity: usize,
}

/// A pooled object, returned to its pool automatically when dropped so
/// callers cannot leak a held slot by forgetting to release it explicitly.
pub struct PooledGuard<T> {
    value: Option<T>,
    release: Sender<T>,
    pool_name: &'static str,
}

impl<T> std::ops::Deref for PooledGuard<T> {
    type Target = T;
    fn deref(&self) -> &T {
        self.value.as_ref().expect("value taken")
    }
}

impl<T> std::ops::DerefMut for PooledGuard<T> {
    fn deref_mut(&mut self) -> &mut T {
        self.value.as_mut().expect("value taken")
    }
}

impl<T> Drop for PooledGuard<T> {
    fn drop(&mut self) {
        if let Some(value) = self.value.take() {
            // The release channel has capacity == pool capacity, so this
            // never blocks: every outstanding guard holds exactly one slot
            // that already has room reserved for its return.
            trace!("pool {} release", self.pool_name);
            let _ = self.release.send(value);
        }
    }
}

impl<T> PooledGuard<T> {
    /// Consumes the guard and returns the inner value without releasing it
    /// back to the pool, for callers handing ownership to a different
    /// lifetime (e.g. posting a PPCS onto a fifo for the next stage).
    pub fn into_inner(mut self) -> T {
        self.value.take().expect("value taken")
    }
}

impl<T> Pool<T> {
    /// Builds a pool of exactly `capacity` objects, each produced by
    /// `factory`. Returns [`PoolError::ExhaustedAtInit`] if `factory`
    /// fails partway through (e.g. an allocation failure), matching §4.1's
    /// failure semantics: allocation failure at init is an explicit,
    /// synchronous error.
    pub fn new<F>(name: &'static str, capacity: usize, mut factory: F) -> PoolResult<Self>
    where
        F: FnMut(usize) -> anyhow::Result<T>,
    {
        let (release, free) = bounded(capacity);
        for i in 0..capacity {
            let item = factory(i).map_err(|source| PoolError::ExhaustedAtInit {
                pool: name,
                requested: capacity,
                source,
            })?;
            // Capacity reserved above; this cannot block or fail.
            let _ = release.send(item);
        }
        debug!("pool {name} ready with capacity {capacity}");
        Ok(Self { name, free, release, capacity })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Blocks until an object is available. Never returns an error at
    /// runtime: pools are sized so that exhaustion never happens without a
    /// caller bug (§4.1: "runtime exhaustion is impossible by
    /// construction").
    pub fn acquire(&self) -> PooledGuard<T> {
        let value = self.free.recv().expect("pool free-list disconnected");
        trace!("pool {} acquire", self.name);
        PooledGuard { value: Some(value), release: self.release.clone(), pool_name: self.name }
    }

    /// Non-blocking acquire, for stages that should back off rather than
    /// stall when a pool happens to be momentarily empty.
    pub fn try_acquire(&self) -> Option<PooledGuard<T>> {
        self.free.try_recv().ok().map(|value| {
            trace!("pool {} acquire", self.name);
            PooledGuard { value: Some(value), release: self.release.clone(), pool_name: self.name }
        })
    }

    /// Returns a value obtained via [`PooledGuard::into_inner`] to this
    /// pool.
    pub fn release(&self, value: T) {
        trace!("pool {} release", self.name);
        let _ = self.release.send(value);
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn acquire_and_drop_returns_object_to_pool() {
        let pool = Pool::new("test", 2, |i| Ok(i)).unwrap();
        assert_eq!(pool.capacity(), 2);
        {
            let _a = pool.acquire();
            let _b = pool.acquire();
            assert!(pool.try_acquire().is_none());
        }
        assert!(pool.try_acquire().is_some());
    }

    #[test]
    fn into_inner_does_not_return_slot_until_release_called() {
        let pool = Pool::new("test", 1, |_| Ok(7)) .unwrap();
        let guard = pool.acquire();
        let value = guard.into_inner();
        assert_eq!(value, 7);
        assert!(pool.try_acquire().is_none());
        pool.release(value);
        assert!(pool.try_acquire().is_some());
    }

    #[test]
    fn factory_failure_is_reported_as_exhausted_at_init() {
        let result: PoolResult<Pool<i32>> = Pool::new("failing", 4, |i| {
            if i == 2 {
                anyhow::bail!("boom")
            } else {
                Ok(i as i32)
            }
        });
        assert!(matches!(result, Err(PoolError::ExhaustedAtInit { pool: "failing", requested: 4, .. })));
    }

    #[test]
    fn concurrent_acquire_across_threads_never_exceeds_capacity() {
        let pool = Arc::new(Pool::new("mt", 3, |_| Ok(())).unwrap());
        let concurrent_peak = Arc::new(AtomicUsize::new(0));
        let current = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let pool = pool.clone();
                let concurrent_peak = concurrent_peak.clone();
                let current = current.clone();
                std::thread::spawn(move || {
                    let _guard = pool.acquire();
                    let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                    concurrent_peak.fetch_max(now, Ordering::SeqCst);
                    current.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        assert!(concurrent_peak.load(Ordering::SeqCst) <= 3);
    }
}
