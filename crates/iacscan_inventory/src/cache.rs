use crate::manifest::Manifest;
use crate::walker::{DEFAULT_BUFFER_SIZE, Walker};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Default number of manifests kept by [`InventoryCache`].
pub const DEFAULT_CAPACITY: usize = 3;

#[derive(Debug)]
struct Entry {
    uses: u32,
    inserted: u64,
    manifest: Arc<Manifest>,
}

/// A small least-frequently-used cache of manifests keyed by root.
///
/// Several commands in one process may ask for the inventory of the same
/// directory; the cache makes the repeat requests free. When full, the entry
/// with the fewest hits is evicted, oldest first on ties.
#[derive(Debug)]
pub struct InventoryCache {
    capacity: usize,
    buffer_size: usize,
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    entries: HashMap<PathBuf, Entry>,
    clock: u64,
}

impl Default for InventoryCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl InventoryCache {
    /// Creates a cache holding at most `capacity` manifests.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            buffer_size: DEFAULT_BUFFER_SIZE,
            state: Mutex::new(State::default()),
        }
    }

    /// Sets the content peek size used by walks on a miss.
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Returns the cached manifest for `root`, walking it with the standard
    /// detectors on a miss.
    ///
    /// Roots are canonicalised first so `infra` and `./infra/` share an
    /// entry. A root that cannot be canonicalised is used as given.
    pub fn scan(&self, root: &Path) -> Arc<Manifest> {
        let key = fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
        let buffer_size = self.buffer_size;
        self.get_or_insert_with(&key, |root| {
            Walker::default().with_buffer_size(buffer_size).walk(root)
        })
    }

    /// Returns the cached manifest for `root`, or stores the one produced by
    /// `fill`.
    pub fn get_or_insert_with<F>(&self, root: &Path, fill: F) -> Arc<Manifest>
    where
        F: FnOnce(&Path) -> Manifest,
    {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = state.entries.get_mut(root) {
            entry.uses = entry.uses.saturating_add(1);
            return Arc::clone(&entry.manifest);
        }

        if state.entries.len() >= self.capacity {
            let victim = state
                .entries
                .iter()
                .min_by_key(|(_, entry)| (entry.uses, entry.inserted))
                .map(|(key, _)| key.clone());
            if let Some(victim) = victim {
                log::trace!("evicting inventory of {}", victim.display());
                state.entries.remove(&victim);
            }
        }

        let manifest = Arc::new(fill(root));
        state.clock += 1;
        let inserted = state.clock;
        state.entries.insert(
            root.to_path_buf(),
            Entry {
                uses: 1,
                inserted,
                manifest: Arc::clone(&manifest),
            },
        );
        manifest
    }

    /// Returns `true` when a manifest for `root` is cached.
    #[must_use]
    pub fn contains(&self, root: &Path) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .contains_key(root)
    }
}
