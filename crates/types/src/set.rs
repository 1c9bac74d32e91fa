//! Exact and approximate access-set representations.
//!
//! The conflict algebra only ever asks a set three questions: add an id,
//! test an id, test overlap with another set. [`AccessSet`] answers those
//! through one of two representations:
//!
//! - **Exact**: a `BTreeSet` of object ids. No error, enumerable,
//!   deterministic iteration order.
//! - **Approx**: a bloom filter sharing a hash family with every other
//!   approximate set in the workload. One-sided error: overlap tests may
//!   report phantom conflicts, never miss real ones.

use crate::ids::ObjectId;
use skewbench_bloom::BloomFilter;
use std::collections::BTreeSet;

/// Exact set of object ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExactSet {
    ids: BTreeSet<ObjectId>,
}

impl ExactSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an id. Duplicates are absorbed.
    pub fn insert(&mut self, id: ObjectId) {
        self.ids.insert(id);
    }

    /// Exact membership test.
    pub fn contains(&self, id: ObjectId) -> bool {
        self.ids.contains(&id)
    }

    /// Number of distinct ids.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True iff no id was added.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Iterate ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.ids.iter().copied()
    }

    /// Exact overlap test. Probes with the smaller side so the cost is
    /// `O(min * log max)`.
    pub fn intersects(&self, other: &ExactSet) -> bool {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small.iter().any(|id| large.contains(id))
    }

    /// Set union.
    pub fn union(&self, other: &ExactSet) -> ExactSet {
        ExactSet {
            ids: self.ids.union(&other.ids).copied().collect(),
        }
    }
}

impl FromIterator<ObjectId> for ExactSet {
    fn from_iter<T: IntoIterator<Item = ObjectId>>(iter: T) -> Self {
        ExactSet {
            ids: iter.into_iter().collect(),
        }
    }
}

/// An access set in either representation.
///
/// `compat` and `merge` are written against this type, so exact and
/// compressed workloads flow through the same algebra.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessSet {
    /// True membership, no error.
    Exact(ExactSet),
    /// Bloom-filter membership, one-sided error.
    Approx(BloomFilter),
}

impl AccessSet {
    /// An empty exact set.
    pub fn exact() -> Self {
        AccessSet::Exact(ExactSet::new())
    }

    /// Add an id.
    pub fn insert(&mut self, id: ObjectId) {
        match self {
            AccessSet::Exact(set) => set.insert(id),
            AccessSet::Approx(filter) => filter.insert(id.0),
        }
    }

    /// Membership test under the representation's contract: exact for
    /// `Exact`, no-false-negative for `Approx`.
    pub fn contains(&self, id: ObjectId) -> bool {
        match self {
            AccessSet::Exact(set) => set.contains(id),
            AccessSet::Approx(filter) => filter.contains(id.0),
        }
    }

    /// True iff nothing was ever added.
    pub fn is_empty(&self) -> bool {
        match self {
            AccessSet::Exact(set) => set.is_empty(),
            AccessSet::Approx(filter) => filter.is_empty(),
        }
    }

    /// Whether this is the approximate representation.
    pub fn is_approx(&self) -> bool {
        matches!(self, AccessSet::Approx(_))
    }

    /// The exact representation, if that is what this set is.
    pub fn as_exact(&self) -> Option<&ExactSet> {
        match self {
            AccessSet::Exact(set) => Some(set),
            AccessSet::Approx(_) => None,
        }
    }

    /// The approximate representation, if that is what this set is.
    pub fn as_approx(&self) -> Option<&BloomFilter> {
        match self {
            AccessSet::Exact(_) => None,
            AccessSet::Approx(filter) => Some(filter),
        }
    }

    /// Overlap test between two access sets.
    ///
    /// Exact/exact enumerates, exact/approx enumerates the exact side and
    /// probes the filter, approx/approx uses the filters' bitwise test.
    /// Whenever an approximate set is involved the answer is conservative:
    /// real overlap is never reported absent.
    ///
    /// # Panics
    ///
    /// Panics if both sides are approximate but were built by different
    /// bloom families.
    pub fn intersects(&self, other: &AccessSet) -> bool {
        match (self, other) {
            (AccessSet::Exact(a), AccessSet::Exact(b)) => a.intersects(b),
            (AccessSet::Exact(exact), AccessSet::Approx(filter))
            | (AccessSet::Approx(filter), AccessSet::Exact(exact)) => {
                exact.iter().any(|id| filter.contains(id.0))
            }
            (AccessSet::Approx(a), AccessSet::Approx(b)) => a.intersects(b),
        }
    }

    /// Union of two access sets in the same representation.
    ///
    /// # Panics
    ///
    /// Panics on mixed representations or mismatched bloom families;
    /// merged transactions never mix representations in this model.
    pub fn union(&self, other: &AccessSet) -> AccessSet {
        match (self, other) {
            (AccessSet::Exact(a), AccessSet::Exact(b)) => AccessSet::Exact(a.union(b)),
            (AccessSet::Approx(a), AccessSet::Approx(b)) => AccessSet::Approx(a.union(b)),
            _ => panic!("cannot union exact and approximate access sets"),
        }
    }
}

impl From<ExactSet> for AccessSet {
    fn from(set: ExactSet) -> Self {
        AccessSet::Exact(set)
    }
}

impl From<BloomFilter> for AccessSet {
    fn from(filter: BloomFilter) -> Self {
        AccessSet::Approx(filter)
    }
}

impl FromIterator<ObjectId> for AccessSet {
    fn from_iter<T: IntoIterator<Item = ObjectId>>(iter: T) -> Self {
        AccessSet::Exact(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skewbench_bloom::{BloomFamily, HashFamily};

    fn bloom_family() -> BloomFamily {
        BloomFamily::new(HashFamily::new(4, 11).unwrap(), 2048, 4).unwrap()
    }

    fn exact(ids: &[u32]) -> AccessSet {
        ids.iter().map(|&id| ObjectId(id)).collect()
    }

    fn approx(family: &BloomFamily, ids: &[u32]) -> AccessSet {
        let mut filter = family.member();
        for &id in ids {
            filter.insert(id);
        }
        AccessSet::Approx(filter)
    }

    #[test]
    fn test_exact_set_basics() {
        let mut set = ExactSet::new();
        assert!(set.is_empty());

        set.insert(ObjectId(3));
        set.insert(ObjectId(1));
        set.insert(ObjectId(3));

        assert_eq!(set.len(), 2);
        assert!(set.contains(ObjectId(1)));
        assert!(!set.contains(ObjectId(2)));
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![ObjectId(1), ObjectId(3)]
        );
    }

    #[test]
    fn test_exact_intersects_and_union() {
        let a: ExactSet = [1, 2, 3].iter().map(|&i| ObjectId(i)).collect();
        let b: ExactSet = [3, 4].iter().map(|&i| ObjectId(i)).collect();
        let c: ExactSet = [5].iter().map(|&i| ObjectId(i)).collect();

        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));

        let merged = a.union(&b);
        assert_eq!(merged.len(), 4);
        assert!(merged.contains(ObjectId(4)));
    }

    #[test]
    fn test_mixed_intersects_probes_filter() {
        let family = bloom_family();
        let shared = [10u32, 20, 30];

        let filter = approx(&family, &shared);
        assert!(exact(&[30, 99]).intersects(&filter));
        assert!(filter.intersects(&exact(&[30, 99])));
        assert!(!exact(&[]).intersects(&filter));
    }

    #[test]
    fn test_approx_pair_never_misses_overlap() {
        let family = bloom_family();
        let a = approx(&family, &[1, 2, 3]);
        let b = approx(&family, &[3, 100]);
        assert!(a.intersects(&b));
    }

    #[test]
    fn test_union_preserves_membership() {
        let family = bloom_family();
        let merged = approx(&family, &[1, 2]).union(&approx(&family, &[7, 8]));
        for id in [1u32, 2, 7, 8] {
            assert!(merged.contains(ObjectId(id)));
        }
        assert!(merged.is_approx());
    }

    #[test]
    #[should_panic(expected = "cannot union exact and approximate")]
    fn test_mixed_union_panics() {
        let family = bloom_family();
        exact(&[1]).union(&approx(&family, &[2]));
    }
}
