use crate::cuckoo::{DEFAULT_MAX_KICKS, ENTRIES_PER_INDEX};
use crate::hash::hash64;
use crate::Filter;
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;
use std::mem;

const EMPTY: u8 = 0;

type Bucket = [u8; ENTRIES_PER_INDEX];

/// A space-efficient probabilistic data structure to test for membership in a set. Cuckoo filters
/// also provide the flexibility to remove items.
///
/// A cuckoo filter is based on cuckoo hashing and is essentially a cuckoo hash table storing
/// each key's 8-bit fingerprint. Each key has two candidate buckets of four entries, and an
/// insertion into two full buckets relocates existing fingerprints to their alternate bucket for
/// at most 500 steps. The number of buckets is rounded up to a power of two so that the alternate
/// bucket of the alternate bucket is always the original one.
///
/// The filter never grows. An insertion that runs out of relocation steps undoes its relocations,
/// leaving the table as it was, and reports `false`.
///
/// # Examples
///
/// ```
/// use amq_filters::cuckoo::CuckooFilter;
/// use amq_filters::Filter;
///
/// let mut filter = CuckooFilter::new(100);
///
/// assert!(!filter.contains(0));
/// assert!(filter.insert(0));
/// assert!(filter.contains(0));
///
/// assert!(filter.remove(0));
/// assert!(!filter.contains(0));
///
/// assert_eq!(filter.len(), 0);
/// assert_eq!(filter.capacity(), 256);
/// assert_eq!(filter.bucket_len(), 64);
/// ```
#[derive(Clone, Debug)]
pub struct CuckooFilter {
    buckets: Vec<Bucket>,
    max_kicks: usize,
    len: usize,
    rng: XorShiftRng,
}

impl CuckooFilter {
    /// Constructs a new, empty `CuckooFilter` with an estimated max capacity of `item_count`.
    /// Relocations during insertion are chosen by a random number generator seeded from the
    /// operating system.
    ///
    /// The filter has `item_count / 4 * 2` buckets of four 8-bit entries, rounded up to the next
    /// power of two.
    ///
    /// # Panics
    ///
    /// Panics if `item_count` is 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use amq_filters::cuckoo::CuckooFilter;
    ///
    /// let filter = CuckooFilter::new(100);
    /// ```
    pub fn new(item_count: usize) -> Self {
        Self::with_rng(item_count, XorShiftRng::from_entropy())
    }

    /// Constructs a new, empty `CuckooFilter` with an estimated max capacity of `item_count`,
    /// whose relocation choices are seeded by `seed`. Two filters constructed with the same seed
    /// behave identically for the same sequence of operations.
    ///
    /// # Panics
    ///
    /// Panics if `item_count` is 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use amq_filters::cuckoo::CuckooFilter;
    ///
    /// let filter = CuckooFilter::with_seed(100, 42);
    /// ```
    pub fn with_seed(item_count: usize, seed: u64) -> Self {
        Self::with_rng(item_count, XorShiftRng::seed_from_u64(seed))
    }

    fn with_rng(item_count: usize, rng: XorShiftRng) -> Self {
        assert!(item_count > 0);
        let bucket_len = (item_count / ENTRIES_PER_INDEX * 2).max(1).next_power_of_two();
        tracing::debug!(item_count, bucket_len, "constructed cuckoo filter");
        CuckooFilter {
            buckets: vec![[EMPTY; ENTRIES_PER_INDEX]; bucket_len],
            max_kicks: DEFAULT_MAX_KICKS,
            len: 0,
            rng,
        }
    }

    // fingerprints are in 1..=255 since 0 marks an empty entry
    fn get_fingerprint(key: u64) -> u8 {
        (hash64(key, 0) % 255) as u8 + 1
    }

    fn get_alt_index(&self, index: usize, fingerprint: u8) -> usize {
        let bucket_len = self.bucket_len();
        (index ^ (hash64(u64::from(fingerprint), 2) % bucket_len as u64) as usize) % bucket_len
    }

    fn get_fingerprint_and_indexes(&self, key: u64) -> (u8, usize, usize) {
        let fingerprint = Self::get_fingerprint(key);
        let index_1 = (hash64(key, 1) % self.bucket_len() as u64) as usize;
        let index_2 = self.get_alt_index(index_1, fingerprint);
        (fingerprint, index_1, index_2)
    }

    fn insert_fingerprint(&mut self, fingerprint: u8, index: usize) -> bool {
        match self.buckets[index].iter_mut().find(|entry| **entry == EMPTY) {
            Some(entry) => {
                *entry = fingerprint;
                true
            }
            None => false,
        }
    }

    fn contains_fingerprint(&self, fingerprint: u8, index_1: usize, index_2: usize) -> bool {
        self.buckets[index_1].contains(&fingerprint) || self.buckets[index_2].contains(&fingerprint)
    }

    /// Returns the number of entries the cuckoo filter can hold.
    pub fn capacity(&self) -> usize {
        self.buckets.len() * ENTRIES_PER_INDEX
    }

    /// Returns the number of buckets in the cuckoo filter.
    pub fn bucket_len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the number of entries per bucket in the cuckoo filter.
    pub fn entries_per_index(&self) -> usize {
        ENTRIES_PER_INDEX
    }

    /// Returns the maximum number of relocations performed by a single insertion.
    pub fn max_kicks(&self) -> usize {
        self.max_kicks
    }

    /// Returns the estimated false positive probability of the cuckoo filter. This value will
    /// increase as more keys are added.
    ///
    /// # Examples
    ///
    /// ```
    /// use amq_filters::cuckoo::CuckooFilter;
    /// use amq_filters::Filter;
    ///
    /// let mut filter = CuckooFilter::new(100);
    /// assert!(filter.estimated_fpp() < std::f64::EPSILON);
    ///
    /// filter.insert(0);
    /// assert!(filter.estimated_fpp() > std::f64::EPSILON);
    /// assert!(filter.estimated_fpp() < 0.05);
    /// ```
    pub fn estimated_fpp(&self) -> f64 {
        let single_fpp = 254.0 / 255.0;
        let occupied_ratio = self.len as f64 / self.capacity() as f64;
        1.0 - f64::powf(single_fpp, 2.0 * ENTRIES_PER_INDEX as f64 * occupied_ratio)
    }
}

impl Filter for CuckooFilter {
    fn insert(&mut self, key: u64) -> bool {
        let (mut fingerprint, index_1, index_2) = self.get_fingerprint_and_indexes(key);
        if self.insert_fingerprint(fingerprint, index_1)
            || self.insert_fingerprint(fingerprint, index_2)
        {
            self.len += 1;
            return true;
        }

        // have to kick out an entry
        let mut index = if self.rng.gen::<bool>() {
            index_1
        } else {
            index_2
        };

        let mut kicks = Vec::with_capacity(self.max_kicks);
        for _ in 0..self.max_kicks {
            let entry_index = self.rng.gen_range(0, ENTRIES_PER_INDEX);
            mem::swap(&mut fingerprint, &mut self.buckets[index][entry_index]);
            kicks.push((index, entry_index));
            index = self.get_alt_index(index, fingerprint);
            if self.insert_fingerprint(fingerprint, index) {
                self.len += 1;
                return true;
            }
        }

        // undo the relocations so every previously admitted fingerprint is back in place
        for (index, entry_index) in kicks.into_iter().rev() {
            mem::swap(&mut fingerprint, &mut self.buckets[index][entry_index]);
        }

        tracing::debug!(
            key,
            max_kicks = self.max_kicks,
            len = self.len,
            "cuckoo filter rejected key after exhausting relocations"
        );
        false
    }

    fn contains(&self, key: u64) -> bool {
        let (fingerprint, index_1, index_2) = self.get_fingerprint_and_indexes(key);
        self.contains_fingerprint(fingerprint, index_1, index_2)
    }

    fn remove(&mut self, key: u64) -> bool {
        let (fingerprint, index_1, index_2) = self.get_fingerprint_and_indexes(key);
        for index in [index_1, index_2].iter() {
            if let Some(entry) = self.buckets[*index]
                .iter_mut()
                .find(|entry| **entry == fingerprint)
            {
                *entry = EMPTY;
                self.len -= 1;
                return true;
            }
        }
        false
    }

    fn size_bytes(&self) -> usize {
        self.buckets.len() * mem::size_of::<Bucket>()
    }

    fn len(&self) -> usize {
        self.len
    }

    fn clear(&mut self) {
        for bucket in &mut self.buckets {
            *bucket = [EMPTY; ENTRIES_PER_INDEX];
        }
        self.len = 0;
    }
}

impl PartialEq for CuckooFilter {
    fn eq(&self, other: &CuckooFilter) -> bool {
        self.max_kicks == other.max_kicks && self.len == other.len && self.buckets == other.buckets
    }
}

#[cfg(test)]
mod tests {
    use super::CuckooFilter;
    use crate::Filter;
    use rand::{Rng, SeedableRng};
    use rand_xorshift::XorShiftRng;

    #[test]
    fn test_new() {
        let filter = CuckooFilter::with_seed(100, 0);
        assert_eq!(filter.len(), 0);
        assert!(filter.is_empty());
        assert_eq!(filter.capacity(), 256);
        assert_eq!(filter.bucket_len(), 64);
        assert_eq!(filter.entries_per_index(), 4);
        assert_eq!(filter.max_kicks(), 500);
        assert_eq!(filter.size_bytes(), 256);
    }

    #[test]
    fn test_new_small() {
        assert_eq!(CuckooFilter::with_seed(1, 0).bucket_len(), 1);
        assert_eq!(CuckooFilter::with_seed(4, 0).bucket_len(), 2);
        assert_eq!(CuckooFilter::with_seed(12, 0).bucket_len(), 8);
    }

    #[test]
    fn test_fingerprint_is_never_empty() {
        assert!((0..100_000).all(|key| CuckooFilter::get_fingerprint(key) != 0));
    }

    #[test]
    fn test_alt_index_is_involution() {
        let filter = CuckooFilter::with_seed(1000, 0);
        for key in 0..10_000 {
            let (fingerprint, index_1, index_2) = filter.get_fingerprint_and_indexes(key);
            assert!(index_2 < filter.bucket_len());
            assert_eq!(filter.get_alt_index(index_2, fingerprint), index_1);
        }
    }

    #[test]
    fn test_insert() {
        let mut filter = CuckooFilter::with_seed(100, 0);
        assert!(filter.insert(0));
        assert_eq!(filter.len(), 1);
        assert!(!filter.is_empty());
        assert!(filter.contains(0));
    }

    #[test]
    fn test_insert_existing_item() {
        let mut filter = CuckooFilter::with_seed(100, 0);
        filter.insert(0);
        filter.insert(0);
        assert_eq!(filter.len(), 2);

        filter.remove(0);
        assert_eq!(filter.len(), 1);
        assert!(filter.contains(0));

        filter.remove(0);
        assert!(!filter.contains(0));
    }

    #[test]
    fn test_remove() {
        let mut filter = CuckooFilter::with_seed(100, 0);
        assert!(!filter.remove(0));

        filter.insert(0);
        assert!(filter.remove(0));

        assert_eq!(filter.len(), 0);
        assert!(filter.is_empty());
        assert!(!filter.contains(0));
    }

    #[test]
    fn test_half_load_insert_then_remove() {
        let mut filter = CuckooFilter::with_seed(100, 0);

        for key in 0..50 {
            assert!(filter.insert(key));
        }
        for key in 0..50 {
            assert!(filter.contains(key));
        }

        for key in 0..50 {
            assert!(filter.remove(key));
        }
        for key in 0..50 {
            assert!(!filter.contains(key));
        }
        assert!(filter.is_empty());
    }

    #[test]
    fn test_half_load_admits_all() {
        for seed in 0..20 {
            let mut rng = XorShiftRng::seed_from_u64(seed);
            let mut filter = CuckooFilter::with_seed(1000, seed);
            let keys = (0..filter.capacity() / 2)
                .map(|_| rng.gen::<u64>())
                .collect::<Vec<u64>>();

            assert_eq!(filter.build(&keys), keys.len());
            assert!(keys.iter().all(|key| filter.contains(*key)));
        }
    }

    #[test]
    fn test_kicks_exhausted() {
        for seed in 0..10 {
            let mut filter = CuckooFilter::with_seed(4, seed);
            assert_eq!(filter.capacity(), 8);

            let mut admitted = Vec::new();
            let mut rejected_count = 0;
            for key in 0..64 {
                let prev = filter.clone();
                if filter.insert(key) {
                    admitted.push(key);
                } else {
                    rejected_count += 1;
                    assert_eq!(filter, prev);
                }
                assert!(admitted.iter().all(|key| filter.contains(*key)));
            }

            assert!(rejected_count > 0);
            assert!(admitted.len() <= filter.capacity());
            assert_eq!(filter.len(), admitted.len());
        }
    }

    #[test]
    fn test_survives_removal_of_other_keys() {
        let mut filter = CuckooFilter::with_seed(1000, 3);
        for key in 0..1000 {
            filter.insert(key);
        }
        // interleave removals so that relocated entries are exercised
        for key in (0..1000).filter(|key| key % 3 == 0) {
            filter.remove(key);
        }
        for key in (0..1000).filter(|key| key % 3 != 0) {
            assert!(filter.contains(key));
        }
    }

    #[test]
    fn test_false_positive_rate() {
        let mut filter = CuckooFilter::with_seed(1000, 0);
        for key in 0..1000 {
            filter.insert(key);
        }
        let false_positives = (2_000_000..2_010_000)
            .filter(|key| filter.contains(*key))
            .count();
        assert!((false_positives as f64 / 10_000.0) < 0.05);
    }

    #[test]
    fn test_same_seed_is_reproducible() {
        let mut filter_1 = CuckooFilter::with_seed(8, 11);
        let mut filter_2 = CuckooFilter::with_seed(8, 11);
        for key in 0..32 {
            assert_eq!(filter_1.insert(key), filter_2.insert(key));
        }
        assert_eq!(filter_1, filter_2);
    }

    #[test]
    fn test_clear() {
        let mut filter = CuckooFilter::with_seed(2, 0);

        filter.insert(1);
        filter.insert(2);
        filter.insert(3);
        filter.insert(4);

        filter.clear();

        assert!(filter.is_empty());
        assert!(!filter.contains(1));
        assert!(!filter.contains(2));
        assert!(!filter.contains(3));
        assert!(!filter.contains(4));
    }

    #[test]
    fn test_estimated_fpp() {
        let mut filter = CuckooFilter::with_seed(100, 0);
        assert!(filter.estimated_fpp() < std::f64::EPSILON);

        filter.insert(0);

        let expected_fpp = 1.0 - (254.0f64 / 255.0).powf(8.0 / 256.0);
        assert!((filter.estimated_fpp() - expected_fpp).abs() < std::f64::EPSILON);
    }
}
