//! Static filter built once from a complete key set.

use crate::hash::hash64;
use crate::Filter;

const OVERHEAD: f64 = 1.23;
const FINGERPRINT_SEED: u64 = 3;

/// A static probabilistic data structure to test for membership in a set.
///
/// A xor filter stores one 8-bit fingerprint per slot in an array of roughly `1.23 * n` slots.
/// Each key maps to three slots `h1`, `h2`, `h3` and a target fingerprint, and the key is
/// considered present when `fp[h1] ^ fp[h2] ^ fp[h3]` equals its target. The filter is
/// constructed in one pass with [`Filter::build`] and does not accept further insertions.
///
/// # Construction limitations
///
/// `build` assigns `fp[h1] = fp[h2] ^ fp[h3] ^ target` for each key in the order given, without
/// the peeling pass that orders assignments so that no later key overwrites a slot an earlier key
/// depends on. Keys whose slots are reused by later keys can therefore stop matching, which makes
/// false negatives possible. `build` returns the number of keys that still match so callers can
/// observe this.
///
/// # Examples
///
/// ```
/// use amq_filters::xor::XorFilter;
/// use amq_filters::Filter;
///
/// let mut filter = XorFilter::new(10);
/// assert_eq!(filter.build(&[0]), 1);
///
/// assert!(filter.contains(0));
/// assert!(!filter.insert(1));
/// assert_eq!(filter.size_bytes(), 12);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct XorFilter {
    fingerprints: Vec<u8>,
    len: usize,
}

impl XorFilter {
    /// Constructs a new, empty `XorFilter` sized for `item_count` keys.
    ///
    /// # Panics
    ///
    /// Panics if `item_count` is 0.
    pub fn new(item_count: usize) -> Self {
        assert!(item_count > 0);
        let slot_count = ((item_count as f64 * OVERHEAD) as usize).max(1);
        tracing::debug!(item_count, slot_count, "constructed xor filter");
        XorFilter {
            fingerprints: vec![0; slot_count],
            len: 0,
        }
    }

    fn get_indexes_and_fingerprint(&self, key: u64) -> ([usize; 3], u8) {
        let slot_count = self.fingerprints.len() as u64;
        let indexes = [
            (hash64(key, 0) % slot_count) as usize,
            (hash64(key, 1) % slot_count) as usize,
            (hash64(key, 2) % slot_count) as usize,
        ];
        (indexes, (hash64(key, FINGERPRINT_SEED) & 0xFF) as u8)
    }

    /// Returns the number of fingerprint slots in the filter.
    pub fn slot_count(&self) -> usize {
        self.fingerprints.len()
    }
}

impl Filter for XorFilter {
    fn insert(&mut self, _key: u64) -> bool {
        false
    }

    fn contains(&self, key: u64) -> bool {
        let ([h1, h2, h3], fingerprint) = self.get_indexes_and_fingerprint(key);
        self.fingerprints[h1] ^ self.fingerprints[h2] ^ self.fingerprints[h3] == fingerprint
    }

    fn size_bytes(&self) -> usize {
        self.fingerprints.len()
    }

    /// Assigns the fingerprints for `keys` and returns how many of them the filter reports as
    /// present afterwards. Fingerprints from a previous build are discarded.
    fn build(&mut self, keys: &[u64]) -> usize {
        self.clear();
        for &key in keys {
            let ([h1, h2, h3], fingerprint) = self.get_indexes_and_fingerprint(key);
            self.fingerprints[h1] = self.fingerprints[h2] ^ self.fingerprints[h3] ^ fingerprint;
        }
        self.len = keys.len();

        let matched = keys.iter().filter(|key| self.contains(**key)).count();
        if matched < keys.len() {
            tracing::warn!(
                key_count = keys.len(),
                unmatched = keys.len() - matched,
                "xor filter build left keys unmatched"
            );
        }
        matched
    }

    fn len(&self) -> usize {
        self.len
    }

    fn clear(&mut self) {
        for fingerprint in &mut self.fingerprints {
            *fingerprint = 0;
        }
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::XorFilter;
    use crate::Filter;

    #[test]
    fn test_new() {
        let filter = XorFilter::new(100);
        assert_eq!(filter.slot_count(), 123);
        assert_eq!(filter.size_bytes(), 123);
        assert!(filter.is_empty());
    }

    #[test]
    fn test_new_small() {
        let filter = XorFilter::new(1);
        assert_eq!(filter.slot_count(), 1);
    }

    #[test]
    fn test_build_single_key() {
        let mut filter = XorFilter::new(10);
        assert_eq!(filter.build(&[0]), 1);
        assert_eq!(filter.len(), 1);
        assert!(filter.contains(0));
    }

    #[test]
    fn test_build_reports_matched_keys() {
        let keys = (0..1000).collect::<Vec<u64>>();
        let mut filter = XorFilter::new(keys.len());

        let matched = filter.build(&keys);
        assert!(matched > 0);
        assert!(matched <= keys.len());
        assert_eq!(
            keys.iter().filter(|key| filter.contains(**key)).count(),
            matched
        );
    }

    #[test]
    fn test_false_positive_rate() {
        let keys = (0..1000).collect::<Vec<u64>>();
        let mut filter = XorFilter::new(keys.len());
        filter.build(&keys);

        let false_positives = (1_000_000..1_010_000)
            .filter(|key| filter.contains(*key))
            .count();
        assert!((false_positives as f64 / 10_000.0) < 0.01);
    }

    #[test]
    fn test_insert_and_remove_are_unsupported() {
        let mut filter = XorFilter::new(10);
        assert!(!filter.insert(5));
        assert!(filter.is_empty());
        filter.build(&[5]);
        assert!(!filter.remove(5));
    }

    #[test]
    fn test_rebuild_replaces_keys() {
        let mut filter = XorFilter::new(1000);
        filter.build(&(0..1000).collect::<Vec<u64>>());
        assert_eq!(filter.build(&[5]), 1);
        assert_eq!(filter.len(), 1);

        let mut expected = XorFilter::new(1000);
        expected.build(&[5]);
        assert_eq!(filter, expected);
    }

    #[test]
    fn test_clear() {
        let mut filter = XorFilter::new(10);
        filter.build(&[0]);
        filter.clear();
        assert!(filter.is_empty());
        assert!(!filter.contains(0));
    }
}
