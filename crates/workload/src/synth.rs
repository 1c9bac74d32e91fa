//! Skewed workload synthesis.

use crate::zipf::ZipfCache;
use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use skewbench_types::{ExactSet, ObjectId, Transaction, TxnId, Workload};
use tracing::{debug, info};

/// Parameters for one synthesis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthConfig {
    /// Size of the object address space; ids are drawn from `[0, size)`.
    pub addr_space_size: u32,

    /// Number of transactions to generate.
    pub num_txn: usize,

    /// Accesses per transaction before deduplication. Zero produces
    /// no-op transactions with empty access sets.
    pub accesses_per_txn: usize,

    /// Zipf skew parameter theta. Zero is uniform.
    pub zipf_theta: f64,

    /// Probability that any single access is a write.
    pub write_probability: f64,
}

impl SynthConfig {
    /// Create a configuration with the given space and transaction count,
    /// defaulting to mildly skewed, read-heavy accesses.
    pub fn new(addr_space_size: u32, num_txn: usize) -> Self {
        Self {
            addr_space_size,
            num_txn,
            accesses_per_txn: 8,
            zipf_theta: 0.6,
            write_probability: 0.05,
        }
    }

    /// Set the number of accesses per transaction.
    pub fn with_accesses_per_txn(mut self, accesses: usize) -> Self {
        self.accesses_per_txn = accesses;
        self
    }

    /// Set the Zipf skew parameter.
    pub fn with_zipf_theta(mut self, theta: f64) -> Self {
        self.zipf_theta = theta;
        self
    }

    /// Set the per-access write probability.
    pub fn with_write_probability(mut self, probability: f64) -> Self {
        self.write_probability = probability;
        self
    }

    /// Check the parameter domain.
    pub fn validate(&self) -> Result<(), SynthError> {
        if !self.write_probability.is_finite()
            || !(0.0..=1.0).contains(&self.write_probability)
        {
            return Err(SynthError::WriteProbabilityOutOfRange {
                value: self.write_probability,
            });
        }
        if !self.zipf_theta.is_finite() || self.zipf_theta < 0.0 {
            return Err(SynthError::ThetaOutOfRange {
                value: self.zipf_theta,
            });
        }
        if self.addr_space_size == 0 && self.accesses_per_txn > 0 {
            return Err(SynthError::EmptyAddressSpace {
                accesses_per_txn: self.accesses_per_txn,
            });
        }
        Ok(())
    }
}

/// Generates workloads, reusing Zipf weight vectors across runs.
#[derive(Debug, Default)]
pub struct Synthesizer {
    cache: ZipfCache,
}

impl Synthesizer {
    /// Create a synthesizer with an empty weight cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The owned weight cache, for inspection or explicit clearing.
    pub fn zipf_cache(&mut self) -> &mut ZipfCache {
        &mut self.cache
    }

    /// Generate `config.num_txn` transactions.
    ///
    /// All randomness is drawn sequentially from `rng`, so the result is
    /// a pure function of the RNG state. Per-transaction construction
    /// then fans out across the rayon pool over the pre-sampled,
    /// read-only draws; the output order matches the sampled group order
    /// no matter how the workers are scheduled. On error no partial
    /// workload is returned.
    pub fn synthesize<R: Rng + ?Sized>(
        &mut self,
        config: &SynthConfig,
        rng: &mut R,
    ) -> Result<Workload, SynthError> {
        config.validate()?;

        info!(
            num_txn = config.num_txn,
            accesses_per_txn = config.accesses_per_txn,
            addr_space_size = config.addr_space_size,
            zipf_theta = config.zipf_theta,
            write_probability = config.write_probability,
            "Synthesizing workload"
        );

        // No accesses to draw: emit no-op transactions without touching
        // the sampler at all.
        if config.accesses_per_txn == 0 {
            let transactions = (0..config.num_txn)
                .map(|index| Transaction::empty(TxnId(index as u64)))
                .collect();
            return Ok(transactions);
        }

        let weights = self
            .cache
            .get(config.addr_space_size as usize, config.zipf_theta);
        debug!(cached_vectors = self.cache.len(), "Zipf weights ready");

        let sampler = WeightedIndex::new(weights.weights().iter().copied())
            .expect("validated zipf weights are positive");

        let total_draws = config.num_txn * config.accesses_per_txn;
        let object_ids: Vec<u32> = (0..total_draws)
            .map(|_| sampler.sample(rng) as u32)
            .collect();
        let write_flags: Vec<bool> = (0..total_draws)
            .map(|_| rng.gen_bool(config.write_probability))
            .collect();

        // Independent per-transaction construction over disjoint slices;
        // the indexed collect reassembles results in group order.
        let transactions: Vec<Transaction> = object_ids
            .par_chunks(config.accesses_per_txn)
            .zip(write_flags.par_chunks(config.accesses_per_txn))
            .enumerate()
            .map(|(index, (objects, flags))| build_transaction(index as u64, objects, flags))
            .collect();

        Ok(Workload::new(transactions))
    }

    /// Generate a workload from a fixed seed (deterministic runs).
    pub fn synthesize_seeded(
        &mut self,
        config: &SynthConfig,
        seed: u64,
    ) -> Result<Workload, SynthError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.synthesize(config, &mut rng)
    }
}

fn build_transaction(index: u64, objects: &[u32], flags: &[bool]) -> Transaction {
    let mut read_set = ExactSet::new();
    let mut write_set = ExactSet::new();
    for (&object, &is_write) in objects.iter().zip(flags) {
        if is_write {
            write_set.insert(ObjectId(object));
        } else {
            read_set.insert(ObjectId(object));
        }
    }
    Transaction::singleton(TxnId(index), read_set.into(), write_set.into())
}

/// Errors from workload-synthesis arguments outside their domain.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SynthError {
    /// The per-access write probability is not a probability.
    #[error("write probability {value} is outside [0, 1]")]
    WriteProbabilityOutOfRange {
        /// Offending value.
        value: f64,
    },

    /// The skew parameter is negative, infinite or NaN.
    #[error("zipf parameter {value} must be finite and non-negative")]
    ThetaOutOfRange {
        /// Offending value.
        value: f64,
    },

    /// Accesses were requested from an empty address space.
    #[error("cannot draw {accesses_per_txn} accesses per transaction from an empty address space")]
    EmptyAddressSpace {
        /// Requested accesses per transaction.
        accesses_per_txn: usize,
    },
}
