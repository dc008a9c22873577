//! Optimistic mutations over a keyed query cache.
//!
//! A mutation first applies its predicted effect to the cached entry, then
//! awaits the server. If the server rejects it the entry is restored from the
//! snapshot taken just before the edit.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock};

/// Cached query results keyed by query arguments.
///
/// Cloning shares the underlying entries.
#[derive(Debug)]
pub struct QueryCache<K, V> {
    entries: Arc<RwLock<HashMap<K, V>>>,
}

impl<K, V> Clone for QueryCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<K, V> Default for QueryCache<K, V> {
    fn default() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.read(|entries| entries.get(key).cloned())
    }

    pub fn insert(&self, key: K, value: V) {
        self.write(|entries| {
            entries.insert(key, value);
        });
    }

    pub fn invalidate(&self, key: &K) -> Option<V> {
        self.write(|entries| entries.remove(key))
    }

    pub fn invalidate_all(&self) {
        self.write(HashMap::clear);
    }

    pub fn len(&self) -> usize {
        self.read(HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply `edit` to the cached entry, returning a handle that can undo it.
    ///
    /// Returns `None` (and runs nothing) when `key` is not cached.
    pub fn patch(&self, key: &K, edit: impl FnOnce(&mut V)) -> Option<Patch<K, V>> {
        self.write(|entries| {
            let entry = entries.get_mut(key)?;
            let snapshot = entry.clone();
            edit(entry);
            Some(Patch {
                cache: self.clone(),
                key: key.clone(),
                snapshot,
            })
        })
    }

    fn read<R>(&self, f: impl FnOnce(&HashMap<K, V>) -> R) -> R {
        let guard = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    fn write<R>(&self, f: impl FnOnce(&mut HashMap<K, V>) -> R) -> R {
        let mut guard = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

/// An applied optimistic edit and the entry as it was before it.
#[derive(Debug)]
#[must_use = "dropping a Patch keeps the edit; call `undo` to revert it"]
pub struct Patch<K, V> {
    cache: QueryCache<K, V>,
    key: K,
    snapshot: V,
}

impl<K, V> Patch<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn snapshot(&self) -> &V {
        &self.snapshot
    }

    /// Restore the pre-edit snapshot.
    ///
    /// Only restores an entry that is still cached; an entry invalidated in
    /// the meantime stays invalidated.
    pub fn undo(self) {
        let Self {
            cache,
            key,
            snapshot,
        } = self;
        cache.write(|entries| {
            if let Some(entry) = entries.get_mut(&key) {
                *entry = snapshot;
            }
        });
    }

    /// Keep the edit.
    pub fn commit(self) {}
}

/// Apply `edit` to `key`, run `mutation`, and revert the edit if it fails.
///
/// # Example
/// ```
/// use authgate::optimistic::{optimistic_update, QueryCache};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let cache: QueryCache<&str, u32> = QueryCache::new();
/// cache.insert("likes", 10);
/// let result: Result<(), &str> =
///     optimistic_update(&cache, &"likes", |n| *n += 1, async { Err("offline") }).await;
/// assert!(result.is_err());
/// assert_eq!(cache.get(&"likes"), Some(10));
/// # }
/// ```
pub async fn optimistic_update<K, V, T, E, F>(
    cache: &QueryCache<K, V>,
    key: &K,
    edit: impl FnOnce(&mut V),
    mutation: F,
) -> Result<T, E>
where
    K: Eq + Hash + Clone,
    V: Clone,
    F: Future<Output = Result<T, E>>,
{
    let patch = cache.patch(key, edit);
    let result = mutation.await;
    match (result.is_err(), patch) {
        (true, Some(patch)) => {
            tracing::debug!("mutation failed; reverting optimistic edit");
            patch.undo();
        }
        (false, Some(patch)) => patch.commit(),
        (_, None) => {}
    }
    result
}
