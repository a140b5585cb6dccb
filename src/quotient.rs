//! Space-efficient probabilistic data structure to test for membership in a set using a
//! linear-probed table of hash remainders.

use crate::hash::hash64;
use crate::Filter;
use std::fmt;
use std::mem;

const OCCUPIED_MASK: u8 = 0b01;
const SHIFTED_MASK: u8 = 0b10;
const MAX_SHIFT: usize = 32;
const SLOTS_PER_BLOCK: usize = 16;
const DEFAULT_REMAINDER_BITS: u8 = 8;
const MAX_REMAINDER_BITS: u8 = 16;

// MM
// ||
// |- is_occupied: the slot holds a remainder
// -- is_shifted: the remainder is not in its home slot, or the slot was vacated by a removal
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[repr(C)]
struct Slot {
    remainder: u16,
    metadata: u8,
}

impl Slot {
    fn is_occupied(self) -> bool {
        self.metadata & OCCUPIED_MASK != 0
    }

    fn is_empty(self) -> bool {
        self.metadata == 0
    }
}

// one cache line of slots
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[repr(C, align(64))]
struct SlotBlock([Slot; SLOTS_PER_BLOCK]);

/// A space-efficient probabilistic data structure to test for membership in a set.
///
/// A quotient filter is essentially a compact hash table. Each key is hashed to 64 bits. The
/// bottom `r` bits are the remainder of the key and the bits above them, reduced modulo the
/// table length, select the "home slot" of the key. The remainder is stored in the first free
/// slot at or after the home slot, and lookups scan forward from the home slot comparing
/// remainders. Both scans are capped at 32 slots, so an insertion into a long cluster is rejected
/// rather than shifting the table.
///
/// The table has twice as many slots as the next power of two above the expected number of
/// keys, which keeps clusters short. Slots are four bytes and are stored in cache-line aligned
/// blocks of sixteen.
///
/// Removal scans the whole table for the first slot holding the key's remainder, regardless of
/// the key's home slot. A key with a different home slot but the same remainder can be removed
/// in its place.
///
/// # Examples
///
/// ```
/// use amq_filters::quotient::QuotientFilter;
/// use amq_filters::Filter;
///
/// let mut filter = QuotientFilter::new(100);
///
/// assert!(!filter.contains(0));
/// assert!(filter.insert(0));
/// assert!(filter.contains(0));
///
/// filter.clear();
/// assert!(!filter.contains(0));
///
/// assert_eq!(filter.quotient_bits(), 7);
/// assert_eq!(filter.remainder_bits(), 8);
/// assert_eq!(filter.capacity(), 256);
/// assert_eq!(filter.size_bytes(), 1024);
/// ```
#[derive(Clone, PartialEq)]
pub struct QuotientFilter {
    quotient_bits: u8,
    remainder_bits: u8,
    remainder_mask: u64,
    slot_count: usize,
    table: Vec<SlotBlock>,
    len: usize,
}

impl QuotientFilter {
    /// Constructs a new, empty `QuotientFilter` for `item_count` keys with 8-bit remainders.
    ///
    /// # Panics
    ///
    /// Panics if `item_count` is 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use amq_filters::quotient::QuotientFilter;
    ///
    /// let filter = QuotientFilter::new(1000);
    /// assert_eq!(filter.capacity(), 2048);
    /// ```
    pub fn new(item_count: usize) -> Self {
        Self::with_remainder_bits(item_count, DEFAULT_REMAINDER_BITS)
    }

    /// Constructs a new, empty `QuotientFilter` for `item_count` keys with remainders of
    /// `remainder_bits` bits. Wider remainders lower the false positive probability.
    ///
    /// # Panics
    ///
    /// Panics if `item_count` is 0, or if `remainder_bits` is not in the range `[1, 16]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use amq_filters::quotient::QuotientFilter;
    ///
    /// let filter = QuotientFilter::with_remainder_bits(1000, 12);
    /// assert_eq!(filter.remainder_bits(), 12);
    /// ```
    pub fn with_remainder_bits(item_count: usize, remainder_bits: u8) -> Self {
        assert!(item_count > 0);
        assert!(remainder_bits > 0 && remainder_bits <= MAX_REMAINDER_BITS);
        let quotient_bits = item_count.next_power_of_two().trailing_zeros() as u8;
        let slot_count = (1usize << quotient_bits) * 2;
        let block_count = (slot_count + SLOTS_PER_BLOCK - 1) / SLOTS_PER_BLOCK;
        tracing::debug!(
            item_count,
            quotient_bits,
            remainder_bits,
            slot_count,
            "constructed quotient filter"
        );
        QuotientFilter {
            quotient_bits,
            remainder_bits,
            remainder_mask: (1u64 << remainder_bits) - 1,
            slot_count,
            table: vec![SlotBlock::default(); block_count],
            len: 0,
        }
    }

    fn get_quotient_and_remainder(&self, key: u64) -> (usize, u16) {
        let hash = hash64(key, 0);
        (
            ((hash >> self.remainder_bits) % self.slot_count as u64) as usize,
            (hash & self.remainder_mask) as u16,
        )
    }

    #[inline]
    fn get_slot(&self, index: usize) -> Slot {
        self.table[index / SLOTS_PER_BLOCK].0[index % SLOTS_PER_BLOCK]
    }

    #[inline]
    fn set_slot(&mut self, index: usize, slot: Slot) {
        self.table[index / SLOTS_PER_BLOCK].0[index % SLOTS_PER_BLOCK] = slot;
    }

    // the probe positions of a key: its home slot and the slots after it, wrapping around
    fn probe(&self, quotient: usize) -> impl Iterator<Item = usize> {
        let slot_count = self.slot_count;
        (0..MAX_SHIFT.min(slot_count)).map(move |offset| (quotient + offset) % slot_count)
    }

    fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.table
            .iter()
            .flat_map(|block| block.0.iter())
            .take(self.slot_count)
    }

    /// Returns the number of slots in the quotient filter.
    pub fn capacity(&self) -> usize {
        self.slot_count
    }

    /// Returns the number of bits used to select a key's home slot.
    pub fn quotient_bits(&self) -> u8 {
        self.quotient_bits
    }

    /// Returns the number of remainder bits stored for each key.
    pub fn remainder_bits(&self) -> u8 {
        self.remainder_bits
    }

    /// Returns the estimated false positive probability of the quotient filter. This value will
    /// increase as more keys are added.
    ///
    /// # Examples
    ///
    /// ```
    /// use amq_filters::quotient::QuotientFilter;
    /// use amq_filters::Filter;
    ///
    /// let mut filter = QuotientFilter::new(100);
    /// assert!(filter.estimated_fpp() < 1e-15);
    ///
    /// filter.insert(0);
    /// assert!(filter.estimated_fpp() > 1e-15);
    /// assert!(filter.estimated_fpp() < 0.01);
    /// ```
    pub fn estimated_fpp(&self) -> f64 {
        let fill_ratio = self.len as f64 / self.capacity() as f64;
        1.0 - (-fill_ratio / 2.0f64.powi(i32::from(self.remainder_bits))).exp()
    }
}

impl Filter for QuotientFilter {
    fn insert(&mut self, key: u64) -> bool {
        let (quotient, remainder) = self.get_quotient_and_remainder(key);
        let free_index = self
            .probe(quotient)
            .find(|index| !self.get_slot(*index).is_occupied());

        match free_index {
            Some(index) => {
                let mut metadata = OCCUPIED_MASK;
                if index != quotient {
                    metadata |= SHIFTED_MASK;
                }
                self.set_slot(index, Slot { remainder, metadata });
                self.len += 1;
                true
            }
            None => {
                tracing::debug!(
                    key,
                    quotient,
                    max_shift = MAX_SHIFT,
                    "quotient filter rejected key after exhausting probes"
                );
                false
            }
        }
    }

    fn contains(&self, key: u64) -> bool {
        let (quotient, remainder) = self.get_quotient_and_remainder(key);
        for index in self.probe(quotient) {
            let slot = self.get_slot(index);
            if slot.is_empty() {
                return false;
            }
            if slot.is_occupied() && slot.remainder == remainder {
                return true;
            }
        }
        false
    }

    fn remove(&mut self, key: u64) -> bool {
        let (_, remainder) = self.get_quotient_and_remainder(key);
        let position = self
            .slots()
            .position(|slot| slot.is_occupied() && slot.remainder == remainder);

        match position {
            Some(index) => {
                // leave a marker so that scans continue past the vacated slot
                self.set_slot(
                    index,
                    Slot {
                        remainder: 0,
                        metadata: SHIFTED_MASK,
                    },
                );
                self.len -= 1;
                true
            }
            None => false,
        }
    }

    fn size_bytes(&self) -> usize {
        self.table.len() * mem::size_of::<SlotBlock>()
    }

    fn len(&self) -> usize {
        self.len
    }

    fn clear(&mut self) {
        for block in &mut self.table {
            *block = SlotBlock::default();
        }
        self.len = 0;
    }
}

impl fmt::Debug for QuotientFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, slot) in self.slots().enumerate() {
            write!(f, "{}|{}:{:02b} ", index, slot.remainder, slot.metadata)?;
        }
        Ok(())
    }
}
