//! Space-efficient probabilistic data structure to test for membership in a set with the ability
//! to remove items.

mod cuckoo_filter;

const ENTRIES_PER_INDEX: usize = 4;
const DEFAULT_MAX_KICKS: usize = 500;

pub use self::cuckoo_filter::CuckooFilter;
