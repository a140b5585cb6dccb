//! Fixed-length list of bits packed into 64-bit words.

use std::mem;
use std::ops::Index;

/// A fixed-length list of bits implemented using a `Vec<u64>`.
///
/// # Examples
///
/// ```
/// use amq_filters::bit_vec::BitVec;
///
/// let mut bv = BitVec::new(5);
///
/// bv.set(0, true);
/// bv.set(3, true);
/// assert_eq!(
///     bv.iter().collect::<Vec<bool>>(),
///     vec![true, false, false, true, false],
/// );
///
/// bv.set_all(true);
/// assert_eq!(bv.count_ones(), 5);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct BitVec {
    blocks: Vec<u64>,
    len: usize,
    one_count: usize,
}

const BLOCK_BIT_COUNT: usize = mem::size_of::<u64>() * 8;

impl BitVec {
    fn get_block_count(len: usize) -> usize {
        (len + BLOCK_BIT_COUNT - 1) / BLOCK_BIT_COUNT
    }

    fn clear_extra_bits(&mut self) {
        let extra_bits = self.len() % BLOCK_BIT_COUNT;
        if extra_bits > 0 {
            let mask = (1u64 << extra_bits) - 1;
            if let Some(block) = self.blocks.last_mut() {
                *block &= mask;
            }
        }
    }

    /// Constructs a new `BitVec` with a certain number of bits. All bits are initialized to false.
    ///
    /// # Examples
    ///
    /// ```
    /// use amq_filters::bit_vec::BitVec;
    ///
    /// let bv = BitVec::new(5);
    /// assert_eq!(
    ///     bv.iter().collect::<Vec<bool>>(),
    ///     vec![false, false, false, false, false],
    /// );
    /// ```
    pub fn new(len: usize) -> Self {
        BitVec {
            blocks: vec![0; Self::get_block_count(len)],
            len,
            one_count: 0,
        }
    }

    /// Sets the value at index `index` to `bit`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// use amq_filters::bit_vec::BitVec;
    ///
    /// let mut bv = BitVec::new(1);
    /// bv.set(0, true);
    /// assert_eq!(bv.get(0), Some(true));
    /// ```
    pub fn set(&mut self, index: usize, bit: bool) {
        assert!(index < self.len);
        let block_index = index / BLOCK_BIT_COUNT;
        let bit_index = index % BLOCK_BIT_COUNT;
        let mask = 1u64 << bit_index;
        let prev = self.blocks[block_index] & mask != 0;
        if bit {
            if !prev {
                self.one_count += 1;
            }
            self.blocks[block_index] |= mask;
        } else {
            if prev {
                self.one_count -= 1;
            }
            self.blocks[block_index] &= !mask;
        }
    }

    /// Returns the value at index `index`, or `None` if index is out of bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// use amq_filters::bit_vec::BitVec;
    ///
    /// let mut bv = BitVec::new(1);
    /// bv.set(0, true);
    ///
    /// assert_eq!(bv.get(0), Some(true));
    /// assert_eq!(bv.get(1), None);
    /// ```
    pub fn get(&self, index: usize) -> Option<bool> {
        if index >= self.len {
            None
        } else {
            let block_index = index / BLOCK_BIT_COUNT;
            let bit_index = index % BLOCK_BIT_COUNT;
            self.blocks
                .get(block_index)
                .map(|block| (block >> bit_index) & 1 != 0)
        }
    }

    /// Sets all values in the `BitVec` to `bit`.
    ///
    /// # Examples
    ///
    /// ```
    /// use amq_filters::bit_vec::BitVec;
    ///
    /// let mut bv = BitVec::new(3);
    /// bv.set_all(true);
    ///
    /// assert_eq!(bv.iter().collect::<Vec<bool>>(), vec![true, true, true]);
    /// ```
    pub fn set_all(&mut self, bit: bool) {
        let mask = if bit { !0 } else { 0 };
        self.one_count = if bit { self.len } else { 0 };
        for block in &mut self.blocks {
            *block = mask;
        }
        self.clear_extra_bits();
    }

    /// Returns an iterator over the elements of the vector in order.
    pub fn iter(&self) -> BitVecIter<'_> {
        BitVecIter {
            bit_vec: self,
            index: 0,
        }
    }

    /// Returns `true` if the `BitVec` is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of elements in the `BitVec`.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns the number of bytes used by the underlying words.
    ///
    /// # Examples
    ///
    /// ```
    /// use amq_filters::bit_vec::BitVec;
    ///
    /// assert_eq!(BitVec::new(1).byte_len(), 8);
    /// assert_eq!(BitVec::new(65).byte_len(), 16);
    /// ```
    pub fn byte_len(&self) -> usize {
        self.blocks.len() * mem::size_of::<u64>()
    }

    /// Returns the number of set bits in the `BitVec`.
    pub fn count_ones(&self) -> usize {
        self.one_count
    }

    /// Returns the number of unset bits in the `BitVec`.
    pub fn count_zeros(&self) -> usize {
        self.len - self.one_count
    }
}

/// An iterator for `BitVec`.
pub struct BitVecIter<'a> {
    bit_vec: &'a BitVec,
    index: usize,
}

impl<'a> Iterator for BitVecIter<'a> {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        let ret = self.bit_vec.get(self.index);
        if ret.is_some() {
            self.index += 1;
        }
        ret
    }
}

impl<'a> IntoIterator for &'a BitVec {
    type IntoIter = BitVecIter<'a>;
    type Item = bool;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

static TRUE: bool = true;
static FALSE: bool = false;

impl Index<usize> for BitVec {
    type Output = bool;

    fn index(&self, index: usize) -> &bool {
        match self.get(index) {
            Some(true) => &TRUE,
            Some(false) => &FALSE,
            None => panic!("index out of bounds: the len is {} but the index is {}", self.len, index),
        }
    }
}
