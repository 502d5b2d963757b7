//! # Seen-Block Cache
//!
//! Bounded set of block hashes already delivered or relayed. The oldest
//! entry is evicted first once the cache is full.

use std::collections::{HashSet, VecDeque};

use parking_lot::Mutex;
use seq_types::Hash;

pub struct SeenBlockCache {
    inner: Mutex<SeenInner>,
    max_size: usize,
}

struct SeenInner {
    hashes: HashSet<Hash>,
    order: VecDeque<Hash>,
}

impl SeenBlockCache {
    pub fn new(max_size: usize) -> Self {
        Self {
            inner: Mutex::new(SeenInner {
                hashes: HashSet::with_capacity(max_size),
                order: VecDeque::with_capacity(max_size),
            }),
            max_size: max_size.max(1),
        }
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.inner.lock().hashes.contains(hash)
    }

    /// Record `hash`. Returns `false` if it was already present.
    pub fn insert(&self, hash: Hash) -> bool {
        let mut inner = self.inner.lock();
        if inner.hashes.contains(&hash) {
            return false;
        }
        if inner.order.len() >= self.max_size {
            if let Some(oldest) = inner.order.pop_front() {
                inner.hashes.remove(&oldest);
            }
        }
        inner.hashes.insert(hash);
        inner.order.push_back(hash);
        true
    }

    pub fn len(&self) -> usize {
        self.inner.lock().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_reports_duplicates() {
        let cache = SeenBlockCache::new(4);
        assert!(cache.insert([1u8; 32]));
        assert!(!cache.insert([1u8; 32]));
        assert!(cache.contains(&[1u8; 32]));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_oldest_evicted_at_capacity() {
        let cache = SeenBlockCache::new(2);
        cache.insert([1u8; 32]);
        cache.insert([2u8; 32]);
        cache.insert([3u8; 32]);

        assert!(!cache.contains(&[1u8; 32]));
        assert!(cache.contains(&[2u8; 32]));
        assert!(cache.contains(&[3u8; 32]));
        assert_eq!(cache.len(), 2);
    }
}
