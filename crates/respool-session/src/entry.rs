//! Session entry, store payload and patch types.

use std::time::{Duration, Instant};

/// A cached session record.
///
/// The profile payload is an opaque type parameter so the pool stays
/// payload-agnostic while the call site keeps full type safety.
///
/// Entries are copied in on store and copied out on get: mutating a returned
/// entry does not write back; use [`SessionPool::update`].
///
/// [`SessionPool::update`]: crate::pool::SessionPool::update
#[derive(Debug, Clone)]
pub struct SessionEntry<P> {
    /// Unique user identifier, the cache key.
    pub user_id: String,

    /// Account email.
    pub email: String,

    /// Authorization role.
    pub role: String,

    /// Opaque profile payload.
    pub profile: P,

    /// When the entry was stored or re-stored; governs TTL expiry.
    pub(crate) created_at: Instant,

    /// When the entry was last read or patched; governs LRU eviction.
    pub(crate) last_accessed: Instant,

    /// Explicit invalidation flag, distinct from TTL expiry.
    pub(crate) valid: bool,
}

impl<P> SessionEntry<P> {
    /// Age since the entry was stored or re-stored.
    #[must_use]
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Whether the entry is usable: still explicitly valid and within `ttl`.
    #[must_use]
    pub fn is_usable(&self, ttl: Duration) -> bool {
        self.valid && self.created_at.elapsed() < ttl
    }
}

/// Payload for storing a session, typically right after authentication
/// succeeds.
#[derive(Debug, Clone)]
pub struct SessionData<P> {
    /// Unique user identifier.
    pub user_id: String,
    /// Account email.
    pub email: String,
    /// Authorization role.
    pub role: String,
    /// Opaque profile payload.
    pub profile: P,
}

/// Partial update merged into an existing session.
///
/// `None` fields are left untouched.
#[derive(Debug, Clone)]
pub struct SessionUpdate<P> {
    /// Replacement email, if any.
    pub email: Option<String>,
    /// Replacement role, if any.
    pub role: Option<String>,
    /// Replacement profile, if any.
    pub profile: Option<P>,
}

impl<P> SessionUpdate<P> {
    /// An empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self {
            email: None,
            role: None,
            profile: None,
        }
    }

    /// Patch the email.
    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Patch the role.
    #[must_use]
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Patch the profile.
    #[must_use]
    pub fn profile(mut self, profile: P) -> Self {
        self.profile = Some(profile);
        self
    }
}

impl<P> Default for SessionUpdate<P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usability_requires_valid_and_fresh() {
        let now = Instant::now();
        let mut entry = SessionEntry {
            user_id: "u1".to_string(),
            email: "u1@example.com".to_string(),
            role: "USER".to_string(),
            profile: (),
            created_at: now,
            last_accessed: now,
            valid: true,
        };

        assert!(entry.is_usable(Duration::from_secs(60)));

        entry.valid = false;
        assert!(!entry.is_usable(Duration::from_secs(60)));

        entry.valid = true;
        std::thread::sleep(Duration::from_millis(5));
        assert!(!entry.is_usable(Duration::from_millis(1)));
    }
}
