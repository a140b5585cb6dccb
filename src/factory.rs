//! Selecting and configuring filters at runtime.

use crate::bloom::BloomFilter;
use crate::cuckoo::CuckooFilter;
use crate::quotient::QuotientFilter;
use crate::xor::XorFilter;
use crate::{Error, Filter, Result};
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const DEFAULT_FPP: f64 = 0.01;

/// The filter variants that can be constructed by name.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Deserialize, Serialize),
    serde(crate = "serde_crate", rename_all = "lowercase")
)]
pub enum FilterKind {
    /// [`BloomFilter`](crate::bloom::BloomFilter), selected by `"bloom"`.
    Bloom,
    /// [`XorFilter`](crate::xor::XorFilter), selected by `"xor"`.
    Xor,
    /// [`CuckooFilter`](crate::cuckoo::CuckooFilter), selected by `"cuckoo"`.
    Cuckoo,
    /// [`QuotientFilter`](crate::quotient::QuotientFilter), selected by `"quotient"`.
    Quotient,
}

impl FilterKind {
    /// Every variant, in a fixed order.
    pub const ALL: [FilterKind; 4] = [
        FilterKind::Bloom,
        FilterKind::Xor,
        FilterKind::Cuckoo,
        FilterKind::Quotient,
    ];

    /// Returns the name the variant is selected by.
    pub fn name(self) -> &'static str {
        match self {
            FilterKind::Bloom => "bloom",
            FilterKind::Xor => "xor",
            FilterKind::Cuckoo => "cuckoo",
            FilterKind::Quotient => "quotient",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterKind {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        FilterKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| Error::UnsupportedVariant(name.to_string()))
    }
}

/// Constructs an empty filter of the variant called `name`, sized for `item_count` keys.
///
/// `fpp` is the target false positive probability. Only the Bloom filter is sized from it; the
/// other variants have a false positive rate fixed by their fingerprint width.
///
/// # Errors
///
/// Returns [`Error::UnsupportedVariant`] if `name` is not one of `"bloom"`, `"xor"`, `"cuckoo"`
/// or `"quotient"`, and [`Error::InvalidArgument`] if `item_count` is 0 or `fpp` is not strictly
/// between 0 and 1.
///
/// # Examples
///
/// ```
/// use amq_filters::{make_filter, Error};
///
/// let mut filter = make_filter("bloom", 10, 0.01).unwrap();
/// filter.insert(0);
/// assert!(filter.contains(0));
/// assert_eq!(filter.size_bytes(), 16);
///
/// assert_eq!(
///     make_filter("ribbon", 10, 0.01).err(),
///     Some(Error::UnsupportedVariant("ribbon".to_string())),
/// );
/// ```
pub fn make_filter(name: &str, item_count: usize, fpp: f64) -> Result<Box<dyn Filter>> {
    let kind = name.parse::<FilterKind>()?;
    FilterConfig::new(kind, item_count).with_fpp(fpp).build()
}

/// Construction parameters for a filter.
///
/// # Examples
///
/// ```
/// use amq_filters::{FilterConfig, FilterKind};
///
/// let mut filter = FilterConfig::new(FilterKind::Cuckoo, 100)
///     .with_seed(7)
///     .build()
///     .unwrap();
///
/// assert!(filter.insert(1));
/// assert!(filter.remove(1));
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Deserialize, Serialize),
    serde(crate = "serde_crate")
)]
pub struct FilterConfig {
    kind: FilterKind,
    item_count: usize,
    #[cfg_attr(feature = "serde", serde(default = "default_fpp"))]
    fpp: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    remainder_bits: Option<u8>,
    #[cfg_attr(feature = "serde", serde(default))]
    seed: Option<u64>,
}

#[cfg(feature = "serde")]
fn default_fpp() -> f64 {
    DEFAULT_FPP
}

impl FilterConfig {
    /// Constructs a configuration for a `kind` filter sized for `item_count` keys, with a target
    /// false positive probability of 0.01.
    pub fn new(kind: FilterKind, item_count: usize) -> Self {
        FilterConfig {
            kind,
            item_count,
            fpp: DEFAULT_FPP,
            remainder_bits: None,
            seed: None,
        }
    }

    /// Sets the number of keys the filter is sized for.
    pub fn with_item_count(mut self, item_count: usize) -> Self {
        self.item_count = item_count;
        self
    }

    /// Sets the target false positive probability. Only used by the Bloom filter.
    pub fn with_fpp(mut self, fpp: f64) -> Self {
        self.fpp = fpp;
        self
    }

    /// Sets the remainder width of a quotient filter, which defaults to 8 bits.
    pub fn with_remainder_bits(mut self, remainder_bits: u8) -> Self {
        self.remainder_bits = Some(remainder_bits);
        self
    }

    /// Seeds the relocation RNG of a cuckoo filter, making its insertions reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Returns the configured variant.
    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    /// Returns the number of keys the filter is sized for.
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Returns the target false positive probability.
    pub fn fpp(&self) -> f64 {
        self.fpp
    }

    /// Checks that every parameter is in range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] naming the first parameter that is out of range.
    pub fn validate(&self) -> Result<()> {
        if self.item_count == 0 {
            return Err(Error::InvalidArgument(
                "item_count must be positive".to_string(),
            ));
        }
        if !(self.fpp > 0.0 && self.fpp < 1.0) {
            return Err(Error::InvalidArgument(format!(
                "fpp must be in (0, 1), got {}",
                self.fpp
            )));
        }
        if let Some(remainder_bits) = self.remainder_bits {
            if !(1..=16).contains(&remainder_bits) {
                return Err(Error::InvalidArgument(format!(
                    "remainder_bits must be in [1, 16], got {}",
                    remainder_bits
                )));
            }
        }
        Ok(())
    }

    /// Validates the configuration and constructs an empty filter from it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if [`validate`](FilterConfig::validate) fails.
    pub fn build(&self) -> Result<Box<dyn Filter>> {
        self.validate()?;
        tracing::debug!(
            kind = self.kind.name(),
            item_count = self.item_count,
            fpp = self.fpp,
            "building filter"
        );

        let filter: Box<dyn Filter> = match self.kind {
            FilterKind::Bloom => Box::new(BloomFilter::new(self.item_count, self.fpp)),
            FilterKind::Xor => Box::new(XorFilter::new(self.item_count)),
            FilterKind::Cuckoo => match self.seed {
                Some(seed) => Box::new(CuckooFilter::with_seed(self.item_count, seed)),
                None => Box::new(CuckooFilter::new(self.item_count)),
            },
            FilterKind::Quotient => match self.remainder_bits {
                Some(remainder_bits) => Box::new(QuotientFilter::with_remainder_bits(
                    self.item_count,
                    remainder_bits,
                )),
                None => Box::new(QuotientFilter::new(self.item_count)),
            },
        };
        Ok(filter)
    }
}
