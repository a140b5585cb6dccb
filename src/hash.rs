//! Seeded 64-bit hashing shared by every filter.
//!
//! All filters derive their probe positions and fingerprints from a single key by calling
//! [`hash64`] with small consecutive seeds (`0, 1, 2, ...`). The mixing step is the 64-bit
//! finalizer used by MurmurHash3. It is fast and avalanches well, but it is not a cryptographic
//! hash.

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;
const SEED_MULTIPLIER: u64 = 0xBF58_476D_1CE4_E5B9;

/// Mixes the bits of `x` so that every input bit affects every output bit.
///
/// # Examples
///
/// ```
/// use amq_filters::hash::mix64;
///
/// assert_eq!(mix64(0), 0);
/// assert_ne!(mix64(1), mix64(2));
/// ```
#[inline]
pub fn mix64(mut x: u64) -> u64 {
    x ^= x >> 33;
    x = x.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    x ^= x >> 33;
    x = x.wrapping_mul(0xC4CE_B9FE_1A85_EC53);
    x ^= x >> 33;
    x
}

/// Hashes `key` with the hash function selected by `seed`.
///
/// Different seeds produce effectively independent hashes of the same key.
///
/// # Examples
///
/// ```
/// use amq_filters::hash::hash64;
///
/// assert_eq!(hash64(42, 1), hash64(42, 1));
/// assert_ne!(hash64(42, 0), hash64(42, 1));
/// ```
#[inline]
pub fn hash64(key: u64, seed: u64) -> u64 {
    mix64(
        key.wrapping_add(GOLDEN_GAMMA)
            .wrapping_add(seed.wrapping_mul(SEED_MULTIPLIER)),
    )
}
