use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};

use time::{Duration, OffsetDateTime};

use crate::clock::{Clock, SystemClock};
use crate::types::UserId;

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    inserted_at: OffsetDateTime,
}

/// In-memory per-key cache with an optional time-to-live.
///
/// A zero TTL keeps entries until they are cleared explicitly. Expired
/// entries are evicted by whichever of [`get`](Self::get) or
/// [`has`](Self::has) sees them first.
#[derive(Debug)]
pub struct TtlCache<K, V, C = SystemClock> {
    entries: Mutex<HashMap<K, Entry<V>>>,
    ttl: Duration,
    clock: C,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, SystemClock)
    }

    /// A cache whose entries never expire on their own.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::new(Duration::ZERO)
    }
}

impl<K: Eq + Hash, V: Clone, C: Clock> TtlCache<K, V, C> {
    #[must_use]
    pub fn with_clock(ttl: Duration, clock: C) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.lock();
        if self.evict_if_expired(&mut entries, key, now) {
            return None;
        }
        entries.get(key).map(|e| e.value.clone())
    }

    pub fn has(&self, key: &K) -> bool {
        let now = self.clock.now();
        let mut entries = self.lock();
        if self.evict_if_expired(&mut entries, key, now) {
            return false;
        }
        entries.contains_key(key)
    }

    /// Inserts or overwrites the entry, restarting its TTL.
    pub fn set(&self, key: K, value: V) {
        let entry = Entry {
            value,
            inserted_at: self.clock.now(),
        };
        self.lock().insert(key, entry);
    }

    pub fn clear(&self, key: &K) {
        self.lock().remove(key);
    }

    pub fn clear_all(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, Entry<V>>> {
        // Every mutation is a single insert/remove, so a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn evict_if_expired(
        &self,
        entries: &mut HashMap<K, Entry<V>>,
        key: &K,
        now: OffsetDateTime,
    ) -> bool {
        if !self.ttl.is_positive() {
            return false;
        }
        let expired = entries
            .get(key)
            .is_some_and(|e| now - e.inserted_at > self.ttl);
        if expired {
            entries.remove(key);
        }
        expired
    }
}

/// The portal's per-user caches.
///
/// Each domain is its own [`TtlCache`]; clearing one never touches the others.
#[derive(Debug)]
pub struct PortalCaches<S, H, P, C = SystemClock> {
    pub settings: TtlCache<UserId, S, C>,
    pub chats: TtlCache<UserId, H, C>,
    pub sponsorships: TtlCache<UserId, P, C>,
}

impl<S: Clone, H: Clone, P: Clone, C: Clock + Clone> PortalCaches<S, H, P, C> {
    #[must_use]
    pub fn new(ttl: Duration, clock: C) -> Self {
        Self {
            settings: TtlCache::with_clock(ttl, clock.clone()),
            chats: TtlCache::with_clock(ttl, clock.clone()),
            sponsorships: TtlCache::with_clock(ttl, clock),
        }
    }

    /// Drops everything cached for `user`.
    pub fn forget_user(&self, user: &UserId) {
        self.settings.clear(user);
        self.chats.clear(user);
        self.sponsorships.clear(user);
    }
}
