//! Fixed-capacity approximate membership sets.
//!
//! A `BloomFilter` answers `contains` with one-sided error: an inserted id
//! is always reported present, an absent id is reported present with
//! probability `(1 - e^(-kn/m))^k` for `n` insertions, `m` bits and `k`
//! hash slices. The `k` slices are the first `k` members of a shared
//! [`HashFamily`], so every filter produced by the same [`BloomFamily`]
//! places any given id on the same bits. That alignment is what makes the
//! bitwise `intersects`/`union` algebra sound.

use crate::family::HashFamily;

/// Bits per storage block.
const BLOCK_BITS: usize = 64;

/// Factory for empty filters bound to one hash family and geometry.
///
/// The factory is the "family member" producer of the compression
/// pipeline: it takes no arguments and returns a fresh empty filter
/// sharing the family. Cheap to clone, safe to share across threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BloomFamily {
    family: HashFamily,
    bits: usize,
    hashes: u32,
}

impl BloomFamily {
    /// Bind a hash family to a filter geometry.
    ///
    /// Fails when the bit-array length or the slice count is zero, or
    /// when more slices are requested than the family has members.
    pub fn new(family: HashFamily, bits: usize, hashes: u32) -> Result<Self, FilterError> {
        if bits == 0 {
            return Err(FilterError::ZeroLength);
        }
        if hashes == 0 {
            return Err(FilterError::ZeroHashes);
        }
        if hashes > family.n_parts() {
            return Err(FilterError::NotEnoughParts {
                requested: hashes,
                available: family.n_parts(),
            });
        }

        Ok(Self {
            family,
            bits,
            hashes,
        })
    }

    /// Produce a fresh empty member filter.
    pub fn member(&self) -> BloomFilter {
        BloomFilter {
            family: self.family,
            bits: self.bits,
            hashes: self.hashes,
            blocks: vec![0u64; self.bits.div_ceil(BLOCK_BITS)],
        }
    }

    /// The underlying hash family.
    pub fn family(&self) -> HashFamily {
        self.family
    }

    /// Bit-array length of produced members.
    pub fn bits(&self) -> usize {
        self.bits
    }

    /// Number of hash slices per id.
    pub fn hashes(&self) -> u32 {
        self.hashes
    }
}

/// An approximate set of 32-bit object ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BloomFilter {
    family: HashFamily,
    bits: usize,
    hashes: u32,
    blocks: Vec<u64>,
}

impl BloomFilter {
    /// Insert an id: sets the `k` slice bits. Inserting again is a no-op.
    pub fn insert(&mut self, id: u32) {
        for part in 0..self.hashes {
            let slot = self.slot(part, id);
            self.blocks[slot / BLOCK_BITS] |= 1u64 << (slot % BLOCK_BITS);
        }
    }

    /// Approximate membership test.
    ///
    /// Never returns `false` for an id inserted into this filter. May
    /// return `true` for an id never inserted.
    pub fn contains(&self, id: u32) -> bool {
        (0..self.hashes).all(|part| {
            let slot = self.slot(part, id);
            (self.blocks[slot / BLOCK_BITS] >> (slot % BLOCK_BITS)) & 1 == 1
        })
    }

    /// True iff no bit is set (nothing was ever inserted).
    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|&b| b == 0)
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.blocks.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Bit-array length.
    pub fn bit_len(&self) -> usize {
        self.bits
    }

    /// Number of hash slices per id.
    pub fn hash_count(&self) -> u32 {
        self.hashes
    }

    /// The hash family this filter draws slices from.
    pub fn family(&self) -> HashFamily {
        self.family
    }

    /// Whether `other` was produced by the same family and geometry, i.e.
    /// whether the bitwise algebra between the two is meaningful.
    pub fn shares_geometry(&self, other: &BloomFilter) -> bool {
        self.family == other.family && self.bits == other.bits && self.hashes == other.hashes
    }

    /// Conservative overlap test: `false` guarantees the two filters hold
    /// no common id; `true` means a common id may exist.
    ///
    /// Any id present in both filters sets the same slice bits in both,
    /// so a nonzero bitwise AND is implied by real overlap and a shared
    /// id can never be missed.
    ///
    /// # Panics
    ///
    /// Panics if the filters do not share family and geometry.
    pub fn intersects(&self, other: &BloomFilter) -> bool {
        assert!(
            self.shares_geometry(other),
            "bloom filters from different families cannot be compared"
        );
        self.blocks
            .iter()
            .zip(&other.blocks)
            .any(|(a, b)| a & b != 0)
    }

    /// Bitwise union: contains every id either input contained, with the
    /// same one-sided guarantee.
    ///
    /// # Panics
    ///
    /// Panics if the filters do not share family and geometry.
    pub fn union(&self, other: &BloomFilter) -> BloomFilter {
        assert!(
            self.shares_geometry(other),
            "bloom filters from different families cannot be merged"
        );
        BloomFilter {
            family: self.family,
            bits: self.bits,
            hashes: self.hashes,
            blocks: self
                .blocks
                .iter()
                .zip(&other.blocks)
                .map(|(a, b)| a | b)
                .collect(),
        }
    }

    /// Estimate of how many distinct ids were inserted, from the fill
    /// ratio: `-(m/k) * ln(1 - ones/m)`. Diagnostic only.
    pub fn estimated_len(&self) -> f64 {
        let ones = self.count_ones() as f64;
        let m = self.bits as f64;
        if ones >= m {
            return f64::INFINITY;
        }
        -(m / self.hashes as f64) * (1.0 - ones / m).ln()
    }

    fn slot(&self, part: u32, id: u32) -> usize {
        (self.family.hash(part, id) as usize) % self.bits
    }
}

/// Errors from invalid filter geometry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    /// The bit array must have at least one bit.
    #[error("bloom filter bit-array length must be positive")]
    ZeroLength,

    /// At least one hash slice is needed for membership to mean anything.
    #[error("bloom filter needs at least one hash slice")]
    ZeroHashes,

    /// The family cannot supply the requested number of slices.
    #[error("{requested} hash slices requested but the family has {available} members")]
    NotEnoughParts {
        /// Requested slice count.
        requested: u32,
        /// Members available in the family.
        available: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    fn test_family() -> BloomFamily {
        let family = HashFamily::new(4, 11).unwrap();
        BloomFamily::new(family, 1024, 4).unwrap()
    }

    #[test]
    fn test_geometry_validation() {
        let family = HashFamily::new(4, 11).unwrap();

        assert!(BloomFamily::new(family, 1024, 4).is_ok());
        assert!(BloomFamily::new(family, 1, 1).is_ok());

        assert_eq!(
            BloomFamily::new(family, 0, 4),
            Err(FilterError::ZeroLength)
        );
        assert_eq!(
            BloomFamily::new(family, 1024, 0),
            Err(FilterError::ZeroHashes)
        );
        assert_eq!(
            BloomFamily::new(family, 1024, 5),
            Err(FilterError::NotEnoughParts {
                requested: 5,
                available: 4
            })
        );
    }

    #[test]
    fn test_fresh_member_is_empty() {
        let member = test_family().member();
        assert!(member.is_empty());
        assert_eq!(member.count_ones(), 0);
        for id in 0..1_000 {
            assert!(!member.contains(id));
        }
    }

    #[test]
    fn test_no_false_negatives() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut filter = test_family().member();

        let ids: HashSet<u32> = (0..1_000).map(|_| rng.gen()).collect();
        for &id in &ids {
            filter.insert(id);
        }
        for &id in &ids {
            assert!(filter.contains(id), "inserted id {id} reported absent");
        }
    }

    #[test]
    fn test_false_positive_rate_is_bounded() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut filter = test_family().member();

        let members: HashSet<u32> = (0..100).map(|_| rng.gen()).collect();
        for &id in &members {
            filter.insert(id);
        }

        // Expected rate for m=1024, k=4, n=100 is about 1%.
        let mut false_positives = 0;
        let mut probes = 0;
        while probes < 10_000 {
            let id: u32 = rng.gen();
            if members.contains(&id) {
                continue;
            }
            probes += 1;
            if filter.contains(id) {
                false_positives += 1;
            }
        }
        assert!(
            false_positives < 300,
            "false positive rate too high: {false_positives}/10000"
        );
        assert!(false_positives > 0, "a filter this loaded must collide");
    }

    #[test]
    fn test_intersects_never_misses_shared_id() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let family = test_family();

        for _ in 0..100 {
            let mut a = family.member();
            let mut b = family.member();
            for _ in 0..20 {
                a.insert(rng.gen());
                b.insert(rng.gen());
            }
            let shared: u32 = rng.gen();
            a.insert(shared);
            b.insert(shared);
            assert!(a.intersects(&b));
            assert!(b.intersects(&a));
        }
    }

    #[test]
    fn test_slot_disjoint_filters_do_not_intersect() {
        let family = test_family();

        // Pick two ids whose slice slots are provably disjoint, so the
        // conservative test must report no overlap.
        let hashes = family.family();
        let slots = |id: u32| -> HashSet<usize> {
            (0..4).map(|p| (hashes.hash(p, id) as usize) % 1024).collect()
        };
        let first = 1u32;
        let mut second = 2u32;
        while !slots(first).is_disjoint(&slots(second)) {
            second += 1;
        }

        let mut a = family.member();
        let mut b = family.member();
        a.insert(first);
        b.insert(second);
        assert!(!a.intersects(&b));

        let empty = family.member();
        assert!(!a.intersects(&empty));
        assert!(!empty.intersects(&a));
    }

    #[test]
    fn test_union_contains_both_sides() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let family = test_family();

        let mut a = family.member();
        let mut b = family.member();
        let left: Vec<u32> = (0..50).map(|_| rng.gen()).collect();
        let right: Vec<u32> = (0..50).map(|_| rng.gen()).collect();
        for &id in &left {
            a.insert(id);
        }
        for &id in &right {
            b.insert(id);
        }

        let merged = a.union(&b);
        for &id in left.iter().chain(&right) {
            assert!(merged.contains(id));
        }
        assert_eq!(merged, b.union(&a));
    }

    #[test]
    fn test_estimated_len_tracks_cardinality() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut filter = test_family().member();

        let ids: HashSet<u32> = (0..100).map(|_| rng.gen()).collect();
        for &id in &ids {
            filter.insert(id);
        }
        let estimate = filter.estimated_len();
        assert!(
            (80.0..120.0).contains(&estimate),
            "estimate {estimate} far from {}",
            ids.len()
        );
    }

    #[test]
    #[should_panic(expected = "different families")]
    fn test_mismatched_geometry_panics() {
        let family = HashFamily::new(4, 11).unwrap();
        let a = BloomFamily::new(family, 1024, 4).unwrap().member();
        let b = BloomFamily::new(family, 2048, 4).unwrap().member();
        a.intersects(&b);
    }
}
