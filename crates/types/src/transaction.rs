//! Transactions and the conflict algebra.

use crate::ids::{ObjectId, TxnId};
use crate::set::AccessSet;
use std::collections::BTreeSet;
use std::fmt;

/// An immutable transaction: a set of identities plus read and write
/// access sets.
///
/// Transactions are values. They are created by the synthesizer (exact
/// sets) or by the compression transform (approximate sets), and the only
/// way to obtain a combined transaction is [`Transaction::merge`], which
/// returns a new value. The read and write sets are treated independently;
/// nothing requires them to be disjoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    ids: BTreeSet<TxnId>,
    read_set: AccessSet,
    write_set: AccessSet,
}

impl Transaction {
    /// Assemble a transaction from parts.
    pub fn new(ids: BTreeSet<TxnId>, read_set: AccessSet, write_set: AccessSet) -> Self {
        Self {
            ids,
            read_set,
            write_set,
        }
    }

    /// A transaction with a single identity.
    pub fn singleton(id: TxnId, read_set: AccessSet, write_set: AccessSet) -> Self {
        Self::new(BTreeSet::from([id]), read_set, write_set)
    }

    /// A no-op transaction: single identity, empty exact access sets.
    pub fn empty(id: TxnId) -> Self {
        Self::singleton(id, AccessSet::exact(), AccessSet::exact())
    }

    /// Build an exact-representation transaction from raw accesses.
    pub fn from_accesses(
        id: TxnId,
        reads: impl IntoIterator<Item = ObjectId>,
        writes: impl IntoIterator<Item = ObjectId>,
    ) -> Self {
        Self::singleton(id, reads.into_iter().collect(), writes.into_iter().collect())
    }

    /// The identities this transaction carries.
    pub fn ids(&self) -> &BTreeSet<TxnId> {
        &self.ids
    }

    /// Objects accessed for read.
    pub fn read_set(&self) -> &AccessSet {
        &self.read_set
    }

    /// Objects accessed for write.
    pub fn write_set(&self) -> &AccessSet {
        &self.write_set
    }

    /// Whether `self` and `other` can share a non-conflicting batch.
    ///
    /// True iff all three conflict intersections are empty: `self` reads
    /// vs `other` writes, `self` writes vs `other` reads, writes vs
    /// writes. Symmetric by construction. Deliberately *not* reflexive:
    /// a transaction whose own write set overlaps its accesses conflicts
    /// with itself, and no special case hides that.
    ///
    /// With approximate sets the answer is conservative: a real conflict
    /// is never reported compatible, but bit-array collisions may report
    /// phantom conflicts.
    pub fn compat(&self, other: &Transaction) -> bool {
        !(self.read_set.intersects(&other.write_set)
            || self.write_set.intersects(&other.read_set)
            || self.write_set.intersects(&other.write_set))
    }

    /// Combine two compatible transactions into one whose identity, read
    /// and write sets are the unions of the inputs'.
    ///
    /// Fails with [`MergeError::Incompatible`] when [`Transaction::compat`]
    /// does not hold; an incompatible pair is never silently merged.
    pub fn merge(&self, other: &Transaction) -> Result<Transaction, MergeError> {
        if !self.compat(other) {
            return Err(MergeError::Incompatible {
                left: IdSet(self.ids.clone()),
                right: IdSet(other.ids.clone()),
            });
        }

        Ok(Transaction {
            ids: self.ids.union(&other.ids).copied().collect(),
            read_set: self.read_set.union(&other.read_set),
            write_set: self.write_set.union(&other.write_set),
        })
    }
}

/// Identity set wrapper so errors print compactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdSet(pub BTreeSet<TxnId>);

impl fmt::Display for IdSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", id.0)?;
        }
        write!(f, "}}")
    }
}

/// Errors from combining transactions.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MergeError {
    /// The inputs conflict, so merging them would build a transaction no
    /// schedule could honor.
    #[error("transactions {left} and {right} conflict and cannot be merged")]
    Incompatible {
        /// Identities of the left input.
        left: IdSet,
        /// Identities of the right input.
        right: IdSet,
    },
}
