use rand::Rng;
use siphasher::sip::SipHasher;
use std::hash::{BuildHasher, Hash, Hasher};
use std::{cmp, fmt};

/// Maps arbitrary hashable items to the 64-bit keys accepted by the filters.
///
/// The filters only operate on `u64` keys. Items of any other type are reduced to a key with a
/// keyed SipHash; two `ItemHasher`s built from the same seed map every item to the same key, so
/// the hasher used to insert must also be used to query.
///
/// # Examples
///
/// ```
/// use amq_filters::bloom::BloomFilter;
/// use amq_filters::{Filter, ItemHasher};
///
/// let hasher = ItemHasher::from_seed(0, 0);
/// let mut filter = BloomFilter::new(10, 0.01);
///
/// filter.insert(hasher.key("foo"));
/// assert!(filter.contains(hasher.key("foo")));
/// ```
#[derive(Clone, Copy)]
pub struct ItemHasher {
    k0: u64,
    k1: u64,
    hasher: SipHasher,
}

impl ItemHasher {
    /// Constructs a new `ItemHasher` that uses the thread-local RNG to seed itself.
    pub fn from_entropy() -> Self {
        let mut rng = rand::thread_rng();
        Self::from_seed(rng.gen(), rng.gen())
    }

    /// Constructs a new `ItemHasher` that is seeded with the given keys.
    pub fn from_seed(k0: u64, k1: u64) -> Self {
        ItemHasher {
            k0,
            k1,
            hasher: SipHasher::new_with_keys(k0, k1),
        }
    }

    /// Returns the 64-bit key of `item`.
    pub fn key<T>(&self, item: &T) -> u64
    where
        T: Hash + ?Sized,
    {
        let mut hasher = self.build_hasher();
        item.hash(&mut hasher);
        hasher.finish()
    }
}

impl fmt::Debug for ItemHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemHasher")
            .field("k0", &self.k0)
            .field("k1", &self.k1)
            .finish()
    }
}

impl cmp::PartialEq for ItemHasher {
    fn eq(&self, other: &ItemHasher) -> bool {
        self.k0 == other.k0 && self.k1 == other.k1
    }
}

impl BuildHasher for ItemHasher {
    type Hasher = SipHasher;

    #[inline]
    fn build_hasher(&self) -> SipHasher {
        self.hasher
    }
}

#[cfg(test)]
mod tests {
    use super::ItemHasher;
    use crate::cuckoo::CuckooFilter;
    use crate::Filter;

    #[test]
    fn test_same_seed_same_key() {
        let hasher_1 = ItemHasher::from_seed(0, 0);
        let hasher_2 = ItemHasher::from_seed(0, 0);
        assert_eq!(hasher_1, hasher_2);
        assert_eq!(hasher_1.key("foo"), hasher_2.key("foo"));
        assert_eq!(hasher_1.key(&String::from("foo")), hasher_1.key("foo"));
    }

    #[test]
    fn test_different_seed_different_key() {
        let hasher_1 = ItemHasher::from_seed(0, 0);
        let hasher_2 = ItemHasher::from_seed(1, 1);
        assert_ne!(hasher_1, hasher_2);
        assert_ne!(hasher_1.key("foo"), hasher_2.key("foo"));
        assert_ne!(hasher_1.key("foo"), hasher_1.key("bar"));
    }

    #[test]
    fn test_debug_hides_state() {
        let hasher = ItemHasher::from_seed(1, 2);
        assert_eq!(format!("{:?}", hasher), "ItemHasher { k0: 1, k1: 2 }");
    }

    #[test]
    fn test_items_in_filter() {
        let hasher = ItemHasher::from_entropy();
        let mut filter = CuckooFilter::with_seed(100, 0);

        for item in &["foobar", "barfoo", "baz", "qux"] {
            assert!(filter.insert(hasher.key(item)));
        }
        assert!(filter.contains(hasher.key("baz")));

        assert!(filter.remove(hasher.key("baz")));
        assert!(!filter.contains(hasher.key("baz")));
        assert!(filter.contains(hasher.key("qux")));
    }
}
