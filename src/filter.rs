//! The capability set shared by every filter variant.

/// An approximate membership query filter over 64-bit keys.
///
/// `contains` never reports a false negative for a key whose `insert` returned `true`, but may
/// report false positives at a rate governed by the filter's construction parameters. Variants
/// that cannot admit keys incrementally or cannot forget them return `false` from `insert` or
/// `remove` instead of failing.
///
/// # Examples
///
/// ```
/// use amq_filters::make_filter;
///
/// let mut filter = make_filter("cuckoo", 100, 0.01).unwrap();
///
/// assert!(filter.insert(7));
/// assert!(filter.contains(7));
/// assert!(filter.remove(7));
/// assert!(!filter.contains(7));
/// ```
pub trait Filter: Send + Sync {
    /// Inserts `key`, returning `true` if the filter admitted it.
    ///
    /// A `false` return means the key was dropped: the variant is static, or a bounded probe or
    /// eviction chain ran out.
    fn insert(&mut self, key: u64) -> bool;

    /// Returns `true` if `key` is possibly in the filter.
    fn contains(&self, key: u64) -> bool;

    /// Removes one entry matching `key`, returning `true` if an entry was cleared.
    ///
    /// Only keys known to be present should be removed: an entry whose fingerprint collides with
    /// `key` may be cleared instead. The default implementation supports no removal.
    fn remove(&mut self, key: u64) -> bool {
        let _ = key;
        false
    }

    /// Returns the number of bytes held by the filter's backing storage.
    fn size_bytes(&self) -> usize;

    /// Loads a batch of keys and returns how many of them the filter admitted.
    ///
    /// Dynamic filters insert the keys one by one. Static filters override this to construct
    /// themselves from the complete key set.
    fn build(&mut self, keys: &[u64]) -> usize {
        keys.iter().filter(|key| self.insert(**key)).count()
    }

    /// Returns the number of entries held by the filter.
    fn len(&self) -> usize;

    /// Returns `true` if the filter holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clears the filter, removing all entries.
    fn clear(&mut self);
}
