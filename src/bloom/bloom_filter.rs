use crate::bit_vec::BitVec;
use crate::hash::hash64;
use crate::Filter;
use std::f64::consts;

/// A space-efficient probabilistic data structure to test for membership in a set.
///
/// At its core, a bloom filter is a bit array, initially all set to zero. `K` hash functions
/// map each key to `K` bits in the bit array. A key definitely does not exist in the bloom filter
/// if any of the `K` bits are unset. A key is possibly in the set if all of the `K` bits are set.
/// The `K` hash functions are the seeded hashes `hash64(key, 0..K)`, and the bit array is packed
/// into 64-bit words. Bits are never unset by an insertion, so keys cannot be removed.
///
/// # Examples
///
/// ```
/// use amq_filters::bloom::BloomFilter;
/// use amq_filters::Filter;
///
/// let mut filter = BloomFilter::new(10, 0.01);
///
/// assert!(!filter.contains(0));
/// filter.insert(0);
/// assert!(filter.contains(0));
///
/// filter.clear();
/// assert!(!filter.contains(0));
///
/// assert_eq!(filter.bit_count(), 96);
/// assert_eq!(filter.hasher_count(), 7);
/// assert_eq!(filter.size_bytes(), 16);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct BloomFilter {
    bit_vec: BitVec,
    hasher_count: usize,
    len: usize,
}

impl BloomFilter {
    fn get_bit_count(item_count: usize, fpp: f64) -> usize {
        (-1.44 * item_count as f64 * fpp.log2()).ceil() as usize
    }

    fn get_hasher_count(bit_count: usize, item_count: usize) -> usize {
        let hasher_count = ((bit_count as f64) / (item_count as f64) * consts::LN_2).round();
        (hasher_count as usize).max(1)
    }

    /// Constructs a new, empty `BloomFilter` with an estimated max capacity of `item_count` keys,
    /// and a maximum false positive probability of `fpp`.
    ///
    /// The filter has `ceil(-1.44 * item_count * log2(fpp))` bits and
    /// `max(1, round(bits / item_count * ln 2))` hash functions.
    ///
    /// # Panics
    ///
    /// Panics if `item_count` is 0 or if `fpp` is not in the range `(0, 1)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use amq_filters::bloom::BloomFilter;
    ///
    /// let filter = BloomFilter::new(1000, 0.01);
    ///
    /// assert_eq!(filter.bit_count(), 9568);
    /// assert_eq!(filter.hasher_count(), 7);
    /// ```
    pub fn new(item_count: usize, fpp: f64) -> Self {
        assert!(item_count > 0);
        assert!(fpp > 0.0 && fpp < 1.0);
        let bit_count = Self::get_bit_count(item_count, fpp);
        let hasher_count = Self::get_hasher_count(bit_count, item_count);
        tracing::debug!(item_count, fpp, bit_count, hasher_count, "constructed bloom filter");
        BloomFilter {
            bit_vec: BitVec::new(bit_count),
            hasher_count,
            len: 0,
        }
    }

    #[inline]
    fn get_offsets(&self, key: u64) -> impl Iterator<Item = usize> {
        let bit_count = self.bit_vec.len() as u64;
        (0..self.hasher_count as u64).map(move |seed| (hash64(key, seed) % bit_count) as usize)
    }

    /// Returns the number of bits in the bloom filter.
    pub fn bit_count(&self) -> usize {
        self.bit_vec.len()
    }

    /// Returns the number of hash functions used by the bloom filter.
    pub fn hasher_count(&self) -> usize {
        self.hasher_count
    }

    /// Returns the number of set bits in the bloom filter.
    ///
    /// # Examples
    ///
    /// ```
    /// use amq_filters::bloom::BloomFilter;
    /// use amq_filters::Filter;
    ///
    /// let mut filter = BloomFilter::new(10, 0.01);
    /// filter.insert(0);
    ///
    /// assert_eq!(filter.count_ones(), 7);
    /// ```
    pub fn count_ones(&self) -> usize {
        self.bit_vec.count_ones()
    }

    /// Returns the number of unset bits in the bloom filter.
    pub fn count_zeros(&self) -> usize {
        self.bit_vec.count_zeros()
    }

    /// Returns the estimated false positive probability of the bloom filter. This value will
    /// increase as more keys are added.
    ///
    /// # Examples
    ///
    /// ```
    /// use amq_filters::bloom::BloomFilter;
    /// use amq_filters::Filter;
    ///
    /// let mut filter = BloomFilter::new(100, 0.01);
    /// assert!(filter.estimated_fpp() < std::f64::EPSILON);
    ///
    /// filter.insert(0);
    /// assert!(filter.estimated_fpp() > std::f64::EPSILON);
    /// assert!(filter.estimated_fpp() < 0.01);
    /// ```
    pub fn estimated_fpp(&self) -> f64 {
        let single_fpp = self.bit_vec.count_ones() as f64 / self.bit_vec.len() as f64;
        single_fpp.powi(self.hasher_count as i32)
    }
}

impl Filter for BloomFilter {
    fn insert(&mut self, key: u64) -> bool {
        for offset in self.get_offsets(key) {
            self.bit_vec.set(offset, true);
        }
        self.len += 1;
        true
    }

    fn contains(&self, key: u64) -> bool {
        self.get_offsets(key).all(|offset| self.bit_vec[offset])
    }

    fn size_bytes(&self) -> usize {
        self.bit_vec.byte_len()
    }

    fn len(&self) -> usize {
        self.len
    }

    fn clear(&mut self) {
        self.bit_vec.set_all(false);
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::BloomFilter;
    use crate::Filter;

    #[test]
    fn test_new() {
        let mut filter = BloomFilter::new(10, 0.01);

        assert!(!filter.contains(0));
        assert!(filter.insert(0));
        assert!(filter.contains(0));
        assert_eq!(filter.count_ones(), 7);
        assert_eq!(filter.count_zeros(), 89);
        assert_eq!(filter.len(), 1);

        filter.clear();
        assert!(!filter.contains(0));
        assert!(filter.is_empty());

        assert_eq!(filter.bit_count(), 96);
        assert_eq!(filter.hasher_count(), 7);
        assert_eq!(filter.size_bytes(), 16);
    }

    #[test]
    fn test_hasher_count_at_least_one() {
        let filter = BloomFilter::new(1000, 0.9);
        assert_eq!(filter.hasher_count(), 1);
        assert!(filter.bit_count() > 0);
    }

    #[test]
    fn test_remove_is_unsupported() {
        let mut filter = BloomFilter::new(10, 0.01);
        filter.insert(1);
        assert!(!filter.remove(1));
        assert!(filter.contains(1));
    }

    #[test]
    fn test_estimated_fpp() {
        let mut filter = BloomFilter::new(10, 0.01);
        assert!(filter.estimated_fpp() < std::f64::EPSILON);

        filter.insert(0);

        let expected_fpp = (7f64 / 96f64).powi(7);
        assert!((filter.estimated_fpp() - expected_fpp).abs() < std::f64::EPSILON);
    }

    #[test]
    fn test_false_positive_rate() {
        let mut filter = BloomFilter::new(1000, 0.01);
        for key in 0..1000 {
            filter.insert(key);
        }
        for key in 0..1000 {
            assert!(filter.contains(key));
        }

        let false_positives = (2_000_000..2_010_000)
            .filter(|key| filter.contains(*key))
            .count();
        let observed_fpp = false_positives as f64 / 10_000.0;
        assert!(observed_fpp < 0.02);
        assert_eq!(filter.size_bytes(), 1200);
    }

    #[test]
    #[should_panic]
    fn test_zero_item_count() {
        BloomFilter::new(0, 0.01);
    }

    #[test]
    #[should_panic]
    fn test_invalid_fpp() {
        BloomFilter::new(10, 1.0);
    }
}
