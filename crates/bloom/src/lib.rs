//! Probabilistic membership primitives for conflict detection.
//!
//! This crate provides the two building blocks the workload model uses to
//! approximate read/write sets without storing them exactly:
//!
//! - **`HashFamily`**: `n_parts` fixed-width hash functions derived from a
//!   single 64-bit multiplicative hash via bit interleaving. One multiply
//!   per input, every output bit of entropy used at most once.
//! - **`BloomFilter`**: a fixed-capacity approximate set built on a shared
//!   `HashFamily`. Membership tests have one-sided error: never a false
//!   negative for an inserted id, false positives at the standard
//!   `(1 - e^(-kn/m))^k` rate.
//!
//! A rotate-XOR cascade hash predating the interleaved family is kept in
//! [`legacy`] as a comparison baseline for uniformity analysis.

pub mod family;
pub mod filter;
pub mod legacy;

pub use family::{FamilyError, HashFamily};
pub use filter::{BloomFamily, BloomFilter, FilterError};
pub use legacy::{legacy_hash, legacy_hashes, LEGACY_SEEDS};
