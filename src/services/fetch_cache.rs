use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use tokio::sync::RwLock;
use tracing::debug;

/// When cached entries are dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionPolicy {
    /// Keep every entry for the lifetime of the process
    Never,
    /// Keep at most this many entries, dropping the oldest insert first
    MaxEntries(usize),
}

impl EvictionPolicy {
    /// Policy from an optional entry bound (None = never evict)
    pub fn from_max_entries(max_entries: Option<usize>) -> Self {
        match max_entries {
            Some(n) if n > 0 => EvictionPolicy::MaxEntries(n),
            _ => EvictionPolicy::Never,
        }
    }
}

impl Default for EvictionPolicy {
    fn default() -> Self {
        EvictionPolicy::Never
    }
}

struct CacheState<K, V> {
    entries: HashMap<K, V>,
    /// Keys in insertion order, oldest first
    order: VecDeque<K>,
}

/// Key -> value memo table shared by every request of the process.
///
/// There is no TTL and no manual invalidation; entries only leave through the
/// eviction policy.
pub struct MemoCache<K, V> {
    state: RwLock<CacheState<K, V>>,
    policy: EvictionPolicy,
}

impl<K, V> MemoCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(policy: EvictionPolicy) -> Self {
        Self {
            state: RwLock::new(CacheState {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
            policy,
        }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let state = self.state.read().await;
        state.entries.get(key).cloned()
    }

    /// Store a value; replacing an existing key keeps its insertion slot
    pub async fn insert(&self, key: K, value: V) {
        let mut state = self.state.write().await;

        if state.entries.insert(key.clone(), value).is_none() {
            state.order.push_back(key);
        }

        if let EvictionPolicy::MaxEntries(max) = self.policy {
            while state.entries.len() > max {
                match state.order.pop_front() {
                    Some(oldest) => {
                        state.entries.remove(&oldest);
                        debug!(remaining = state.entries.len(), "Evicted oldest cache entry");
                    }
                    None => break,
                }
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }
}

impl<K, V> Default for MemoCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new(EvictionPolicy::Never)
    }
}
