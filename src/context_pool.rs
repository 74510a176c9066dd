//! # Context Pool
//!
//! Recycles [`RequestContext`] values so steady-state dispatch does not
//! allocate a fresh context (and its param, header and store buffers) per
//! request.
//!
//! ## Design
//!
//! - Free lists are sharded; each OS thread is pinned round-robin to a home
//!   shard, so concurrent requests rarely touch the same lock.
//! - [`ContextPool::acquire`] pops from the home shard, then tries the other
//!   shards with `try_lock`, and allocates only when nothing is available.
//! - Acquisition is scoped: [`PooledContext`] resets the context and returns
//!   it to the pool when dropped, including while unwinding from a panic.
//!   A context is therefore never reachable from two requests at once.
//!
//! ## Configuration
//!
//! - `BURROW_POOL_SHARDS`: number of free-list shards (default: available parallelism)
//! - `BURROW_POOL_MAX_IDLE`: idle contexts kept per shard (default: 256)

use std::cell::Cell;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use tracing::info;

use crate::context::RequestContext;

const DEFAULT_MAX_IDLE_PER_SHARD: usize = 256;

static NEXT_HOME_SHARD: AtomicUsize = AtomicUsize::new(0);

thread_local! {
    static HOME_SHARD: Cell<Option<usize>> = const { Cell::new(None) };
}

/// Pool sizing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextPoolConfig {
    pub shards: usize,
    pub max_idle_per_shard: usize,
}

impl Default for ContextPoolConfig {
    fn default() -> Self {
        Self {
            shards: default_shards(),
            max_idle_per_shard: DEFAULT_MAX_IDLE_PER_SHARD,
        }
    }
}

fn default_shards() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

impl ContextPoolConfig {
    /// Load configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        let shards = std::env::var("BURROW_POOL_SHARDS")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or_else(default_shards);

        let max_idle_per_shard = std::env::var("BURROW_POOL_MAX_IDLE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_IDLE_PER_SHARD);

        Self {
            shards,
            max_idle_per_shard,
        }
    }
}

/// Pool counters, updated with `Ordering::Relaxed`
#[derive(Debug, Default)]
pub struct ContextPoolMetrics {
    acquired: AtomicUsize,
    created: AtomicUsize,
    reused: AtomicUsize,
    released: AtomicUsize,
    discarded: AtomicUsize,
    in_use: AtomicUsize,
}

/// Point-in-time copy of [`ContextPoolMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct ContextPoolStats {
    /// Total acquisitions
    pub acquired: usize,
    /// Acquisitions that had to allocate
    pub created: usize,
    /// Acquisitions served from a free list
    pub reused: usize,
    /// Contexts returned to a free list
    pub released: usize,
    /// Contexts dropped because the shard was full
    pub discarded: usize,
    /// Contexts currently checked out
    pub in_use: usize,
}

impl ContextPoolMetrics {
    #[must_use]
    pub fn snapshot(&self) -> ContextPoolStats {
        ContextPoolStats {
            acquired: self.acquired.load(Ordering::Relaxed),
            created: self.created.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            in_use: self.in_use.load(Ordering::Relaxed),
        }
    }
}

/// Sharded free-list pool of request contexts
#[derive(Debug)]
pub struct ContextPool {
    shards: Box<[Mutex<Vec<RequestContext>>]>,
    max_idle_per_shard: usize,
    metrics: ContextPoolMetrics,
}

impl Default for ContextPool {
    fn default() -> Self {
        Self::with_config(ContextPoolConfig::default())
    }
}

impl ContextPool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_env() -> Self {
        Self::with_config(ContextPoolConfig::from_env())
    }

    #[must_use]
    pub fn with_config(config: ContextPoolConfig) -> Self {
        let shards = config.shards.max(1);
        info!(
            shards = shards,
            max_idle_per_shard = config.max_idle_per_shard,
            "Context pool created"
        );
        Self {
            shards: (0..shards).map(|_| Mutex::new(Vec::new())).collect(),
            max_idle_per_shard: config.max_idle_per_shard,
            metrics: ContextPoolMetrics::default(),
        }
    }

    #[must_use]
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    #[must_use]
    pub fn metrics(&self) -> &ContextPoolMetrics {
        &self.metrics
    }

    #[must_use]
    pub fn stats(&self) -> ContextPoolStats {
        self.metrics.snapshot()
    }

    /// Idle contexts across all shards
    #[must_use]
    pub fn idle(&self) -> usize {
        self.shards.iter().map(|s| s.lock().len()).sum()
    }

    fn home_shard(&self) -> usize {
        let id = HOME_SHARD.with(|home| match home.get() {
            Some(id) => id,
            None => {
                let id = NEXT_HOME_SHARD.fetch_add(1, Ordering::Relaxed);
                home.set(Some(id));
                id
            }
        });
        id % self.shards.len()
    }

    fn pop(&self, home: usize) -> Option<RequestContext> {
        if let Some(ctx) = self.shards[home].lock().pop() {
            return Some(ctx);
        }
        let n = self.shards.len();
        (1..n).find_map(|offset| {
            let shard = &self.shards[(home + offset) % n];
            shard.try_lock().and_then(|mut free| free.pop())
        })
    }

    /// Check out a clean context. It returns to the pool when the guard drops.
    #[must_use]
    pub fn acquire(&self) -> PooledContext<'_> {
        let home = self.home_shard();
        let ctx = match self.pop(home) {
            Some(ctx) => {
                self.metrics.reused.fetch_add(1, Ordering::Relaxed);
                ctx
            }
            None => {
                self.metrics.created.fetch_add(1, Ordering::Relaxed);
                RequestContext::new()
            }
        };
        self.metrics.acquired.fetch_add(1, Ordering::Relaxed);
        self.metrics.in_use.fetch_add(1, Ordering::Relaxed);
        PooledContext {
            pool: self,
            home,
            ctx,
        }
    }

    /// Return a context early. Equivalent to dropping the guard.
    pub fn release(&self, ctx: PooledContext<'_>) {
        drop(ctx);
    }

    fn put_back(&self, mut ctx: RequestContext, home: usize) {
        ctx.reset();
        self.metrics.in_use.fetch_sub(1, Ordering::Relaxed);
        let mut free = self.shards[home].lock();
        if free.len() < self.max_idle_per_shard {
            free.push(ctx);
            self.metrics.released.fetch_add(1, Ordering::Relaxed);
        } else {
            drop(free);
            self.metrics.discarded.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// A context checked out of a [`ContextPool`]
///
/// Dereferences to [`RequestContext`]. Dropping the guard resets the context
/// and hands it back to the pool.
#[derive(Debug)]
pub struct PooledContext<'p> {
    pool: &'p ContextPool,
    home: usize,
    ctx: RequestContext,
}

impl Deref for PooledContext<'_> {
    type Target = RequestContext;

    fn deref(&self) -> &RequestContext {
        &self.ctx
    }
}

impl DerefMut for PooledContext<'_> {
    fn deref_mut(&mut self) -> &mut RequestContext {
        &mut self.ctx
    }
}

impl Drop for PooledContext<'_> {
    fn drop(&mut self) {
        // An empty RequestContext does not allocate.
        let ctx = std::mem::take(&mut self.ctx);
        self.pool.put_back(ctx, self.home);
    }
}
