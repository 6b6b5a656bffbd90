//! Connection pool core.
//!
//! The pool owns a fixed set of slots, each holding one backend client.
//! Callers check clients out through [`Pool::acquire`] and get them back
//! through RAII ([`PooledConnection`] releases on drop), or run a single
//! operation with retry through [`Pool::with_connection`].
//!
//! Contention is resolved by a strictly FIFO wait queue: a released slot is
//! handed directly to the longest-waiting caller while still marked active,
//! so a freshly arriving `acquire` can never steal it from an existing
//! waiter.

use std::collections::VecDeque;
use std::future::Future;
use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use respool_backend::Connector;

use crate::backoff::Backoff;
use crate::config::PoolConfig;
use crate::error::{OperationError, PoolError};

/// A bounded pool of backend client handles.
///
/// Cloning the pool is cheap and yields another handle to the same slots.
pub struct Pool<C: Connector> {
    inner: Arc<PoolInner<C>>,
}

impl<C: Connector> Clone for Pool<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct PoolInner<C: Connector> {
    connector: C,
    config: PoolConfig,
    state: Mutex<PoolState<C::Client>>,
    /// Cumulative failed operations since the pool started.
    total_errors: AtomicU64,
    closed: AtomicBool,
    waiter_seq: AtomicU64,
    janitor: Mutex<Option<JoinHandle<()>>>,
}

struct PoolState<T> {
    slots: Vec<Slot<T>>,
    waiters: VecDeque<Waiter<T>>,
}

/// One pool slot. Invariant: at most one lease per slot at a time.
struct Slot<T> {
    client: Arc<T>,
    last_used: Instant,
    active: bool,
    error_count: u32,
}

/// A pending acquire. Removed from the queue when satisfied, timed out, or
/// rejected at shutdown.
struct Waiter<T> {
    id: u64,
    enqueued_at: Instant,
    tx: oneshot::Sender<Result<Lease<T>, PoolError>>,
}

struct Lease<T> {
    slot: usize,
    client: Arc<T>,
}

impl<C: Connector> Pool<C> {
    /// Create a pool and eagerly connect `max_connections` backend clients.
    ///
    /// Fails fast: an invalid configuration or a failed connect surfaces
    /// here, never as a half-initialized pool at first use. Spawns the
    /// janitor task, so it must run inside a tokio runtime.
    pub async fn initialize(config: PoolConfig, connector: C) -> Result<Self, PoolError> {
        config.validate()?;

        let mut slots = Vec::with_capacity(config.max_connections);
        for n in 0..config.max_connections {
            let client = connector.connect().await?;
            tracing::debug!(slot = n, "backend client connected");
            slots.push(Slot {
                client: Arc::new(client),
                last_used: Instant::now(),
                active: false,
                error_count: 0,
            });
        }

        let inner = Arc::new(PoolInner {
            connector,
            config,
            state: Mutex::new(PoolState {
                slots,
                waiters: VecDeque::new(),
            }),
            total_errors: AtomicU64::new(0),
            closed: AtomicBool::new(false),
            waiter_seq: AtomicU64::new(0),
            janitor: Mutex::new(None),
        });

        let janitor = spawn_janitor(&inner);
        *inner.janitor.lock() = Some(janitor);

        tracing::info!(
            max = inner.config.max_connections,
            "connection pool initialized"
        );

        Ok(Self { inner })
    }

    /// Check out a connection, waiting in FIFO order when none is idle.
    ///
    /// Resolves as soon as a connection is released to this caller, or fails
    /// with [`PoolError::AcquireTimeout`] after the configured timeout. A
    /// timed-out entry is removed from the queue so a later release cannot
    /// satisfy it.
    pub async fn acquire(&self) -> Result<PooledConnection<C>, PoolError> {
        let (id, mut rx) = {
            let mut state = self.inner.state.lock();
            if self.inner.closed.load(Ordering::Acquire) {
                return Err(PoolError::Shutdown);
            }

            if let Some(idx) = state.slots.iter().position(|slot| !slot.active) {
                let slot = &mut state.slots[idx];
                slot.active = true;
                slot.last_used = Instant::now();
                let client = Arc::clone(&slot.client);
                tracing::trace!(slot = idx, "connection acquired");
                return Ok(self.guard(idx, client));
            }

            let (tx, rx) = oneshot::channel();
            let id = self.inner.waiter_seq.fetch_add(1, Ordering::Relaxed);
            state.waiters.push_back(Waiter {
                id,
                enqueued_at: Instant::now(),
                tx,
            });
            tracing::trace!(waiting = state.waiters.len(), "no idle connection, queued");
            (id, rx)
        };

        match tokio::time::timeout(self.inner.config.connection_timeout, &mut rx).await {
            Ok(Ok(result)) => result.map(|lease| self.guard(lease.slot, lease.client)),
            // Sender dropped without a handoff: the pool is gone.
            Ok(Err(_)) => Err(PoolError::Shutdown),
            Err(_) => {
                // Deadline hit. Under the queue lock, a racing release has
                // either already popped this entry (the lease is in the
                // channel) or can no longer see it.
                let removed = {
                    let mut state = self.inner.state.lock();
                    let before = state.waiters.len();
                    state.waiters.retain(|waiter| waiter.id != id);
                    state.waiters.len() != before
                };

                if removed {
                    let waited_ms = self.inner.config.connection_timeout.as_millis() as u64;
                    tracing::debug!(waited_ms, "acquire timed out");
                    return Err(PoolError::AcquireTimeout { waited_ms });
                }

                match rx.try_recv() {
                    Ok(result) => result.map(|lease| self.guard(lease.slot, lease.client)),
                    Err(_) => Err(PoolError::Shutdown),
                }
            }
        }
    }

    /// Execute one backend operation with automatic retry.
    ///
    /// Acquires a connection, runs `op`, and on failure retries on a fresh
    /// (possibly different) connection with exponential backoff, up to the
    /// configured attempt ceiling. Each attempt's lease is released exactly
    /// once whatever the outcome. The client handle passed to `op` must not
    /// be retained beyond the operation.
    pub async fn with_connection<T, F, Fut>(&self, mut op: F) -> Result<T, PoolError>
    where
        F: FnMut(Arc<C::Client>) -> Fut,
        Fut: Future<Output = Result<T, OperationError>>,
    {
        let attempts = self.inner.config.retry_attempts;
        let backoff = Backoff::new(self.inner.config.retry_base_delay);
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let conn = self.acquire().await?;

            let err = match op(Arc::clone(&conn.client)).await {
                Ok(value) => {
                    self.inner.mark_success(conn.slot);
                    return Ok(value);
                }
                Err(err) => err,
            };

            tracing::warn!(attempt, slot = conn.slot, error = %err, "pooled operation failed");
            self.report_failure(conn).await;

            if attempt >= attempts {
                return Err(PoolError::OperationFailed {
                    attempts: attempt,
                    source: err,
                });
            }

            let delay = backoff.delay(attempt);
            tracing::debug!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                "backing off before retry"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Record a failed operation against a leased connection and release it.
    ///
    /// Increments the slot's consecutive-failure count; once it crosses the
    /// fault threshold the underlying client is swapped for a freshly
    /// connected one before the slot re-enters rotation, so queued waiters
    /// may be served by the replacement.
    pub async fn report_failure(&self, conn: PooledConnection<C>) {
        let slot_idx = conn.slot;
        self.inner.total_errors.fetch_add(1, Ordering::Relaxed);

        let crossed = {
            let mut state = self.inner.state.lock();
            match state.slots.get_mut(slot_idx) {
                Some(slot) => {
                    slot.error_count += 1;
                    slot.error_count >= self.inner.config.fault_threshold
                }
                None => false,
            }
        };

        if crossed {
            tracing::warn!(
                slot = slot_idx,
                threshold = self.inner.config.fault_threshold,
                "connection crossed fault threshold, replacing"
            );
            // The lease is still held here, so the slot cannot be handed out
            // while the replacement handshake runs outside the lock.
            match self.inner.connector.connect().await {
                Ok(client) => {
                    let mut state = self.inner.state.lock();
                    if let Some(slot) = state.slots.get_mut(slot_idx) {
                        slot.client = Arc::new(client);
                        slot.error_count = 0;
                    }
                    tracing::info!(slot = slot_idx, "connection replaced");
                }
                Err(err) => {
                    tracing::error!(
                        slot = slot_idx,
                        error = %err,
                        "replacement connect failed, keeping faulted connection"
                    );
                }
            }
        }

        drop(conn);
    }

    /// Snapshot of pool occupancy and error counters.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let state = self.inner.state.lock();
        let active = state.slots.iter().filter(|slot| slot.active).count();
        PoolStats {
            total: state.slots.len(),
            active,
            idle: state.slots.len() - active,
            waiting: state.waiters.len(),
            total_errors: self.inner.total_errors.load(Ordering::Relaxed),
        }
    }

    /// Whether the pool has been shut down.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// The pool configuration.
    #[must_use]
    pub fn config(&self) -> &PoolConfig {
        &self.inner.config
    }

    /// Shut the pool down.
    ///
    /// Stops the janitor, rejects every queued waiter with
    /// [`PoolError::Shutdown`], and drops all connections. Safe to call more
    /// than once; later calls are no-ops.
    pub fn shutdown(&self) {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        if let Some(handle) = self.inner.janitor.lock().take() {
            handle.abort();
        }

        let mut state = self.inner.state.lock();
        while let Some(waiter) = state.waiters.pop_front() {
            let _ = waiter.tx.send(Err(PoolError::Shutdown));
        }
        state.slots.clear();
        drop(state);

        tracing::info!("connection pool shut down");
    }

    fn guard(&self, slot: usize, client: Arc<C::Client>) -> PooledConnection<C> {
        PooledConnection {
            client,
            slot,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Connector> PoolInner<C> {
    /// Return a slot to the pool: direct handoff to the longest-waiting live
    /// entry, else mark it idle.
    fn release(&self, slot_idx: usize) {
        if self.closed.load(Ordering::Acquire) {
            return;
        }

        let mut state = self.state.lock();

        let client = match state.slots.get_mut(slot_idx) {
            Some(slot) => {
                slot.last_used = Instant::now();
                Arc::clone(&slot.client)
            }
            None => return,
        };

        while let Some(waiter) = state.waiters.pop_front() {
            let lease = Lease {
                slot: slot_idx,
                client: Arc::clone(&client),
            };
            if waiter.tx.send(Ok(lease)).is_ok() {
                // Slot stays active across the handoff.
                tracing::trace!(
                    slot = slot_idx,
                    waited_ms = waiter.enqueued_at.elapsed().as_millis() as u64,
                    "connection handed to waiter"
                );
                return;
            }
            // Receiver already gone (timed out); try the next waiter.
        }

        if let Some(slot) = state.slots.get_mut(slot_idx) {
            slot.active = false;
        }
    }

    fn mark_success(&self, slot_idx: usize) {
        let mut state = self.state.lock();
        if let Some(slot) = state.slots.get_mut(slot_idx) {
            slot.error_count = 0;
        }
    }
}

fn spawn_janitor<C: Connector>(inner: &Arc<PoolInner<C>>) -> JoinHandle<()> {
    let weak = Arc::downgrade(inner);
    let interval = inner.config.idle_check_interval;
    let idle_timeout = inner.config.idle_timeout;

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let Some(inner) = weak.upgrade() else { break };
            if inner.closed.load(Ordering::Acquire) {
                break;
            }

            let (active, idle, waiting, idle_past_timeout) = {
                let state = inner.state.lock();
                let active = state.slots.iter().filter(|slot| slot.active).count();
                let idle = state.slots.len() - active;
                let stale = state
                    .slots
                    .iter()
                    .filter(|slot| !slot.active && slot.last_used.elapsed() > idle_timeout)
                    .count();
                (active, idle, state.waiters.len(), stale)
            };

            // Fixed-size pool: nothing to reap. This is where idle-too-long
            // connections would be health-checked.
            tracing::debug!(active, idle, waiting, idle_past_timeout, "pool janitor sweep");
        }
    })
}

/// An exclusive lease on one pooled backend client.
///
/// Dropping the lease returns the slot to the pool, handing it directly to
/// the longest-waiting `acquire` call if any is queued. The lease derefs to
/// the client handle.
pub struct PooledConnection<C: Connector> {
    client: Arc<C::Client>,
    slot: usize,
    inner: Arc<PoolInner<C>>,
}

impl<C: Connector> PooledConnection<C> {
    /// Borrow the backend client for the duration of one operation.
    #[must_use]
    pub fn client(&self) -> &C::Client {
        &self.client
    }
}

impl<C: Connector> Deref for PooledConnection<C> {
    type Target = C::Client;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

impl<C: Connector> Drop for PooledConnection<C> {
    fn drop(&mut self) {
        self.inner.release(self.slot);
    }
}

/// Point-in-time snapshot of pool state.
#[derive(Debug, Clone, Copy)]
pub struct PoolStats {
    /// Connections owned by the pool.
    pub total: usize,
    /// Connections currently leased out.
    pub active: usize,
    /// Connections idle and ready.
    pub idle: usize,
    /// Callers queued waiting for a connection.
    pub waiting: usize,
    /// Cumulative failed operations since the pool started.
    pub total_errors: u64,
}

impl PoolStats {
    /// Leased share of the pool as a percentage.
    #[must_use]
    pub fn utilization(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.active as f64 / self.total as f64) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_utilization() {
        let stats = PoolStats {
            total: 20,
            active: 5,
            idle: 15,
            waiting: 0,
            total_errors: 0,
        };
        assert!((stats.utilization() - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_stats_utilization_empty_pool() {
        let stats = PoolStats {
            total: 0,
            active: 0,
            idle: 0,
            waiting: 0,
            total_errors: 0,
        };
        assert!((stats.utilization() - 0.0).abs() < f64::EPSILON);
    }
}
