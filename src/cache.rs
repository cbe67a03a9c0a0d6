//! Shared cache of the doctor directory.
//!
//! The directory screen reads the doctor list through this cache instead of
//! hitting the database on every render. A successful create mutation marks
//! the cached list stale; the next read observes the flag and refetches.
//! Handles are cheap clones of one shared state, so the mutation worker and
//! the UI loop see the same flag.

use crate::models::Doctor;
use std::sync::{Arc, Mutex};

struct CacheState {
    doctors: Vec<Doctor>,
    /// True until the first successful fetch.
    unloaded: bool,
    /// Set by mutations; cleared by the next store.
    stale: bool,
}

/// A cloneable handle to the cached "all doctors" result set.
#[derive(Clone)]
pub struct DoctorCache {
    inner: Arc<Mutex<CacheState>>,
}

impl DoctorCache {
    /// Creates an empty cache that reports itself as needing a fetch.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(CacheState {
                doctors: Vec::new(),
                unloaded: true,
                stale: false,
            })),
        }
    }

    /// Marks the cached list stale so the next read refetches.
    pub fn invalidate(&self) {
        if let Ok(mut state) = self.inner.lock() {
            state.stale = true;
        }
    }

    /// Whether a reader should refetch before trusting [`Self::doctors`].
    pub fn needs_fetch(&self) -> bool {
        match self.inner.lock() {
            Ok(state) => state.unloaded || state.stale,
            Err(_) => true,
        }
    }

    /// Replaces the cached list with a freshly fetched one.
    pub fn store(&self, doctors: Vec<Doctor>) {
        if let Ok(mut state) = self.inner.lock() {
            state.doctors = doctors;
            state.unloaded = false;
            state.stale = false;
        }
    }

    /// Returns a snapshot of the cached list.
    pub fn doctors(&self) -> Vec<Doctor> {
        match self.inner.lock() {
            Ok(state) => state.doctors.clone(),
            Err(_) => Vec::new(),
        }
    }
}

impl Default for DoctorCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;

    fn doctor(name: &str) -> Doctor {
        Doctor {
            id: 1,
            name: name.into(),
            email: format!("{name}@example.com"),
            phone: String::new(),
            speciality: "General Dentistry".into(),
            gender: Gender::Male,
            is_active: true,
            image_url: String::new(),
            created_at: String::new(),
        }
    }

    #[test]
    fn fresh_cache_needs_fetch() {
        let cache = DoctorCache::new();
        assert!(cache.needs_fetch());
        assert!(cache.doctors().is_empty());
    }

    #[test]
    fn store_satisfies_readers_until_invalidated() {
        let cache = DoctorCache::new();
        cache.store(vec![doctor("jane")]);
        assert!(!cache.needs_fetch());
        assert_eq!(cache.doctors().len(), 1);

        cache.invalidate();
        assert!(cache.needs_fetch());
        // Stale data stays readable until the refetch lands.
        assert_eq!(cache.doctors().len(), 1);

        cache.store(vec![doctor("jane"), doctor("zoe")]);
        assert!(!cache.needs_fetch());
        assert_eq!(cache.doctors().len(), 2);
    }

    #[test]
    fn clones_share_one_state() {
        let cache = DoctorCache::new();
        let handle = cache.clone();
        cache.store(Vec::new());
        assert!(!handle.needs_fetch());
        handle.invalidate();
        assert!(cache.needs_fetch());
    }
}
