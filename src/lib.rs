//! # amq-filters
//!
//! `amq-filters` contains interchangeable approximate membership query (AMQ) filters over 64-bit
//! keys. Every filter answers "is this key possibly in the set?" without false negatives for
//! admitted keys, trading a bounded false positive rate for far less memory than an exact set.
//!
//! The crate provides four variants behind the common [`Filter`] trait:
//!
//!  - [`BloomFilter`](bloom::BloomFilter): a bit array probed by `k` hash functions.
//!  - [`XorFilter`](xor::XorFilter): a static filter constructed once from a complete key set.
//!  - [`CuckooFilter`](cuckoo::CuckooFilter): 8-bit fingerprints in four-way buckets with
//!    relocation and removal.
//!  - [`QuotientFilter`](quotient::QuotientFilter): remainders in cache-line aligned slots with
//!    bounded linear probing and removal.
//!
//! Filters are selected by name through [`make_filter`] or configured with [`FilterConfig`].
//! Arbitrary hashable items are reduced to keys with [`ItemHasher`].
//!
//! ## Usage
//!
//! Add this to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! amq-filters = "*"
//! ```
//!
//! ```rust
//! use amq_filters::{make_filter, Filter};
//!
//! let mut filter = make_filter("bloom", 1000, 0.01).unwrap();
//! filter.insert(42);
//! assert!(filter.contains(42));
//! ```
//!
//! ## References
//!
//!  - [Space/Time Trade-offs in Hash Coding with Allowable Errors](https://dl.acm.org/citation.cfm?id=362692)
//!  > Bloom, Burton H. 1970. “Space/Time Trade-Offs in Hash Coding with Allowable Errors.” *Commun. ACM* 13 (7). New York, NY, USA: ACM: 422–26. doi:[10.1145/362686.362692](https://doi.org/10.1145/362686.362692).
//!  - [Cuckoo Filter: Practically Better Than Bloom](https://dl.acm.org/citation.cfm?id=2674994)
//!  > Fan, Bin, Dave G. Andersen, Michael Kaminsky, and Michael D. Mitzenmacher. 2014. “Cuckoo Filter: Practically Better Than Bloom.” In *Proceedings of the 10th Acm International on Conference on Emerging Networking Experiments and Technologies*, 75–88. CoNEXT ’14. New York, NY, USA: ACM. doi:[10.1145/2674005.2674994](https://doi.org/10.1145/2674005.2674994).
//!  - [Don’t Thrash: How to Cache Your Hash on Flash](https://dl.acm.org/citation.cfm?id=2350275)
//!  > Bender, Michael A., Martin Farach-Colton, Rob Johnson, Russell Kraner, Bradley C. Kuszmaul, Dzejla Medjedovic, Pablo Montes, Pradeep Shetty, Richard P. Spillane, and Erez Zadok. 2012. “Don’t Thrash: How to Cache Your Hash on Flash.” *Proc. VLDB Endow.* 5 (11): 1627–37. doi:[10.14778/2350229.2350275](https://doi.org/10.14778/2350229.2350275).
//!  - [Xor Filters: Faster and Smaller Than Bloom and Cuckoo Filters](https://arxiv.org/abs/1912.08258)
//!  > Graf, Thomas Mueller, and Daniel Lemire. 2020. “Xor Filters: Faster and Smaller Than Bloom and Cuckoo Filters.” *ACM J. Exp. Algorithmics* 25. doi:[10.1145/3376122](https://doi.org/10.1145/3376122).

#![warn(missing_docs)]

pub mod bit_vec;
pub mod bloom;
pub mod cuckoo;
pub mod error;
pub mod factory;
mod filter;
pub mod hash;
pub mod quotient;
mod util;
pub mod xor;

pub use crate::error::{Error, Result};
pub use crate::factory::{make_filter, FilterConfig, FilterKind};
pub use crate::filter::Filter;
pub use crate::util::ItemHasher;
