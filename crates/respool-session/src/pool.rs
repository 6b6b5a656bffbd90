//! Session pool core.
//!
//! A keyed cache bounded two ways: by count (LRU eviction at capacity) and
//! by age (absolute TTL). Access recency and absolute freshness are tracked
//! separately on purpose: "used recently" does not mean "still within its
//! freshness window".

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::SessionConfig;
use crate::entry::{SessionData, SessionEntry, SessionUpdate};
use crate::error::{EnrichError, SessionError};

/// A bounded, TTL-expiring session cache.
///
/// Cloning the pool is cheap and yields another handle to the same entries.
pub struct SessionPool<P> {
    inner: Arc<SessionPoolInner<P>>,
}

impl<P> Clone for SessionPool<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct SessionPoolInner<P> {
    config: SessionConfig,
    entries: Mutex<HashMap<String, SessionEntry<P>>>,
    closed: AtomicBool,
    janitor: Mutex<Option<JoinHandle<()>>>,
}

impl<P: Clone + Send + 'static> SessionPool<P> {
    /// Create a session pool and start its cleanup janitor.
    ///
    /// Configuration problems surface here, never at first use. Spawns the
    /// janitor task, so it must run inside a tokio runtime.
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        config.validate()?;

        let inner = Arc::new(SessionPoolInner {
            config,
            entries: Mutex::new(HashMap::new()),
            closed: AtomicBool::new(false),
            janitor: Mutex::new(None),
        });

        let janitor = spawn_janitor(&inner);
        *inner.janitor.lock() = Some(janitor);

        tracing::info!(
            capacity = inner.config.max_entries,
            ttl_secs = inner.config.ttl.as_secs(),
            "session pool initialized"
        );

        Ok(Self { inner })
    }

    /// Look up a usable session, refreshing its access recency on hit.
    ///
    /// An expired or invalidated entry behaves as a miss and is left for the
    /// janitor. A miss is a normal outcome, not an error: the caller
    /// re-derives the session and stores it again.
    #[must_use]
    pub fn get(&self, user_id: &str) -> Option<SessionEntry<P>> {
        let mut entries = self.inner.entries.lock();
        let entry = entries.get_mut(user_id)?;
        if !entry.is_usable(self.inner.config.ttl) {
            tracing::trace!(user = user_id, "session miss, expired or invalidated");
            return None;
        }
        entry.last_accessed = Instant::now();
        Some(entry.clone())
    }

    /// Insert or refresh a session.
    ///
    /// Resets both the TTL clock and access recency and marks the entry
    /// valid. Inserting a new key at capacity first evicts the entry with
    /// the oldest access time. The scan is O(n); capacity is small by
    /// design.
    pub fn store(&self, data: SessionData<P>) {
        if self.inner.closed.load(Ordering::Acquire) {
            return;
        }

        let now = Instant::now();
        let mut entries = self.inner.entries.lock();

        if !entries.contains_key(&data.user_id) && entries.len() >= self.inner.config.max_entries {
            let oldest = entries
                .values()
                .min_by_key(|entry| entry.last_accessed)
                .map(|entry| entry.user_id.clone());
            if let Some(user_id) = oldest {
                entries.remove(&user_id);
                tracing::debug!(user = %user_id, "evicted least recently used session");
            }
        }

        entries.insert(
            data.user_id.clone(),
            SessionEntry {
                user_id: data.user_id,
                email: data.email,
                role: data.role,
                profile: data.profile,
                created_at: now,
                last_accessed: now,
                valid: true,
            },
        );
    }

    /// Merge a partial update into an existing session.
    ///
    /// Returns `false` without creating anything when the key is absent:
    /// an update must never resurrect a removed session. Refreshes access
    /// recency but leaves the TTL clock and the validity flag untouched.
    pub fn update(&self, user_id: &str, patch: SessionUpdate<P>) -> bool {
        let mut entries = self.inner.entries.lock();
        let Some(entry) = entries.get_mut(user_id) else {
            return false;
        };

        if let Some(email) = patch.email {
            entry.email = email;
        }
        if let Some(role) = patch.role {
            entry.role = role;
        }
        if let Some(profile) = patch.profile {
            entry.profile = profile;
        }
        entry.last_accessed = Instant::now();
        true
    }

    /// Mark a session unusable without removing it.
    ///
    /// The entry stays in the map until the janitor or [`remove`] deletes
    /// it, so a concurrent re-check observes the invalidation instead of
    /// racing a deletion.
    ///
    /// [`remove`]: SessionPool::remove
    pub fn invalidate(&self, user_id: &str) {
        let mut entries = self.inner.entries.lock();
        if let Some(entry) = entries.get_mut(user_id) {
            entry.valid = false;
            tracing::debug!(user = user_id, "session invalidated");
        }
    }

    /// Delete a session outright.
    pub fn remove(&self, user_id: &str) {
        if self.inner.entries.lock().remove(user_id).is_some() {
            tracing::debug!(user = user_id, "session removed");
        }
    }

    /// Store the core session immediately, then enrich it in the background.
    ///
    /// Used right after authentication succeeds: the caller gets a usable
    /// session without waiting for profile enrichment. The enrichment result
    /// is merged like an update; its failure is logged and swallowed and the
    /// core session stays valid. The background step is skipped when
    /// `preload_on_login` is disabled.
    pub fn preload<F, Fut>(&self, data: SessionData<P>, enrich: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<P, EnrichError>> + Send + 'static,
    {
        let user_id = data.user_id.clone();
        self.store(data);

        if !self.inner.config.preload_on_login || self.inner.closed.load(Ordering::Acquire) {
            return;
        }

        let weak = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            match enrich().await {
                Ok(profile) => {
                    let Some(inner) = weak.upgrade() else { return };
                    let mut entries = inner.entries.lock();
                    if let Some(entry) = entries.get_mut(&user_id) {
                        entry.profile = profile;
                        entry.last_accessed = Instant::now();
                        tracing::debug!(user = %user_id, "session profile enriched");
                    }
                }
                Err(err) => {
                    tracing::warn!(user = %user_id, error = %err, "session enrichment failed");
                }
            }
        });
    }

    /// Snapshot of cache occupancy, with ages in seconds for inspection.
    #[must_use]
    pub fn stats(&self) -> SessionStats {
        let entries = self.inner.entries.lock();
        let ttl = self.inner.config.ttl;

        let size = entries.len();
        let valid = entries
            .values()
            .filter(|entry| entry.is_usable(ttl))
            .count();

        let mut total_age = 0.0;
        let mut oldest = 0.0;
        for entry in entries.values() {
            let age = entry.age().as_secs_f64();
            total_age += age;
            if age > oldest {
                oldest = age;
            }
        }

        SessionStats {
            size,
            capacity: self.inner.config.max_entries,
            valid,
            avg_age_secs: if size == 0 { 0.0 } else { total_age / size as f64 },
            oldest_age_secs: oldest,
        }
    }

    /// Whether the pool has been shut down.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Stop the janitor and clear all entries.
    ///
    /// Safe to call more than once; later calls are no-ops.
    pub fn shutdown(&self) {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        if let Some(handle) = self.inner.janitor.lock().take() {
            handle.abort();
        }
        self.inner.entries.lock().clear();

        tracing::info!("session pool shut down");
    }
}

fn spawn_janitor<P: Send + 'static>(inner: &Arc<SessionPoolInner<P>>) -> JoinHandle<()> {
    let weak = Arc::downgrade(inner);
    let interval = inner.config.cleanup_interval;
    let ttl = inner.config.ttl;

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

            let removed = {
                let mut entries = inner.entries.lock();
                let before = entries.len();
                entries.retain(|_, entry| entry.is_usable(ttl));
                before - entries.len()
            };

            if removed > 0 {
                tracing::debug!(removed, "janitor removed stale sessions");
            }
        }
    })
}

/// Point-in-time snapshot of the session cache.
#[derive(Debug, Clone, Copy)]
pub struct SessionStats {
    /// Entries currently held, valid or not.
    pub size: usize,
    /// Configured capacity.
    pub capacity: usize,
    /// Entries that currently pass the validity check.
    pub valid: usize,
    /// Mean entry age in seconds.
    pub avg_age_secs: f64,
    /// Age of the oldest entry in seconds.
    pub oldest_age_secs: f64,
}
