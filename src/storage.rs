use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Default storage slot name for the raw access token.
pub const DEFAULT_STORAGE_KEY: &str = "access_token";

/// Per-tab persistence of the raw access token.
///
/// Implementations never fail: when the backend is unavailable they log
/// and behave as if the slot were empty.
pub trait TokenStorage: Send + Sync {
    fn get(&self) -> Option<String>;

    fn set(&self, raw: &str);

    fn clear(&self);

    fn has(&self) -> bool {
        self.get().is_some()
    }
}

impl<T: TokenStorage + ?Sized> TokenStorage for Arc<T> {
    fn get(&self) -> Option<String> {
        (**self).get()
    }

    fn set(&self, raw: &str) {
        (**self).set(raw);
    }

    fn clear(&self) {
        (**self).clear();
    }

    fn has(&self) -> bool {
        (**self).has()
    }
}

impl<T: TokenStorage + ?Sized> TokenStorage for &T {
    fn get(&self) -> Option<String> {
        (**self).get()
    }

    fn set(&self, raw: &str) {
        (**self).set(raw);
    }

    fn clear(&self) {
        (**self).clear();
    }

    fn has(&self) -> bool {
        (**self).has()
    }
}

/// In-memory tab scope: a string map shared by clones.
///
/// Each `MemoryTokenStorage` reads and writes one key of the scope, so
/// several slots can live in the same tab without clobbering each other.
#[derive(Debug, Clone)]
pub struct MemoryTokenStorage {
    key: String,
    scope: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryTokenStorage {
    /// A fresh tab scope using [`DEFAULT_STORAGE_KEY`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_key(DEFAULT_STORAGE_KEY)
    }

    #[must_use]
    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            scope: Arc::default(),
        }
    }

    /// Another slot in the same tab scope.
    #[must_use]
    pub fn slot(&self, key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            scope: Arc::clone(&self.scope),
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Default for MemoryTokenStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn get(&self) -> Option<String> {
        match self.scope.lock() {
            Ok(scope) => scope.get(&self.key).filter(|v| !v.is_empty()).cloned(),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Token storage unavailable on read");
                None
            }
        }
    }

    fn set(&self, raw: &str) {
        match self.scope.lock() {
            Ok(mut scope) => {
                scope.insert(self.key.clone(), raw.to_owned());
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Token storage unavailable on write");
            }
        }
    }

    fn clear(&self) {
        match self.scope.lock() {
            Ok(mut scope) => {
                scope.remove(&self.key);
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Token storage unavailable on clear");
            }
        }
    }
}

/// Storage for environments where the tab scope is disabled (e.g. private browsing).
///
/// Reads are always empty; writes are logged and dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableTokenStorage;

impl TokenStorage for UnavailableTokenStorage {
    fn get(&self) -> Option<String> {
        None
    }

    fn set(&self, _raw: &str) {
        tracing::warn!("Token storage unavailable, token not persisted");
    }

    fn clear(&self) {
        tracing::debug!("Token storage unavailable, nothing to clear");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_clear() {
        let storage = MemoryTokenStorage::new();
        assert!(!storage.has());
        storage.set("abc");
        assert_eq!(storage.get().as_deref(), Some("abc"));
        assert!(storage.has());
        storage.clear();
        assert_eq!(storage.get(), None);
    }

    #[test]
    fn empty_value_reads_as_absent() {
        let storage = MemoryTokenStorage::new();
        storage.set("");
        assert!(!storage.has());
    }

    #[test]
    fn clones_share_scope_but_new_tabs_do_not() {
        let tab = MemoryTokenStorage::new();
        let same_tab = tab.clone();
        let other_tab = MemoryTokenStorage::new();

        tab.set("t1");
        assert_eq!(same_tab.get().as_deref(), Some("t1"));
        assert_eq!(other_tab.get(), None);
    }

    #[test]
    fn slots_are_independent() {
        let tab = MemoryTokenStorage::new();
        let other = tab.slot("legacy_token");
        tab.set("t1");
        assert_eq!(other.get(), None);
        other.set("t2");
        assert_eq!(tab.get().as_deref(), Some("t1"));
    }

    #[test]
    fn poisoned_scope_degrades() {
        let storage = MemoryTokenStorage::new();
        storage.set("t1");

        let poisoner = storage.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.scope.lock().unwrap();
            panic!("poison the tab scope");
        })
        .join();

        assert_eq!(storage.get(), None);
        storage.set("t2");
        storage.clear();
        assert!(!storage.has());
    }

    #[test]
    fn unavailable_storage_is_always_empty() {
        let storage = UnavailableTokenStorage;
        storage.set("t1");
        assert!(!storage.has());
        storage.clear();
    }
}
