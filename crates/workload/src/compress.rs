//! Exact-to-approximate workload compression.
//!
//! Replaces each transaction's exact read/write sets with bloom filters
//! produced by one shared [`BloomFamily`]. Identities stay exact. The
//! transform preserves the conflict algebra's one-sided guarantee: every
//! id present in an exact set is inserted into the replacement filter, so
//! an exact conflict can never disappear under compression; only phantom
//! conflicts can appear.

use rayon::prelude::*;
use skewbench_bloom::BloomFamily;
use skewbench_types::transaction::IdSet;
use skewbench_types::{AccessSet, Transaction, Workload};
use tracing::info;

/// Compress one transaction into the approximate representation.
///
/// Both access sets must currently be exact; compressing an
/// already-approximate transaction is a caller error because a bloom
/// filter cannot be enumerated into a fresh one.
pub fn compress_transaction(
    transaction: &Transaction,
    family: &BloomFamily,
) -> Result<Transaction, CompressError> {
    let read_set = compress_set(transaction, transaction.read_set(), family)?;
    let write_set = compress_set(transaction, transaction.write_set(), family)?;
    Ok(Transaction::new(
        transaction.ids().clone(),
        read_set,
        write_set,
    ))
}

/// Compress every transaction of a workload, preserving count and order.
///
/// Transactions are compressed concurrently; the family is shared
/// read-only across workers and each filter is built by exactly one
/// worker. Fails without producing a partial workload if any transaction
/// is already approximate.
pub fn compress_workload(
    workload: &Workload,
    family: &BloomFamily,
) -> Result<Workload, CompressError> {
    info!(
        num_txn = workload.len(),
        bits = family.bits(),
        hashes = family.hashes(),
        "Compressing workload"
    );

    let transactions: Result<Vec<Transaction>, CompressError> = workload
        .transactions()
        .par_iter()
        .map(|transaction| compress_transaction(transaction, family))
        .collect();

    Ok(Workload::new(transactions?))
}

fn compress_set(
    transaction: &Transaction,
    set: &AccessSet,
    family: &BloomFamily,
) -> Result<AccessSet, CompressError> {
    let exact = set.as_exact().ok_or_else(|| CompressError::AlreadyApproximate {
        ids: IdSet(transaction.ids().clone()),
    })?;

    let mut filter = family.member();
    for id in exact.iter() {
        filter.insert(id.0);
    }
    Ok(AccessSet::Approx(filter))
}

/// Errors from the compression transform.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompressError {
    /// The source transaction already carries approximate sets.
    #[error("transaction {ids} is already approximate and cannot be re-compressed")]
    AlreadyApproximate {
        /// Identities of the offending transaction.
        ids: IdSet,
    },
}
