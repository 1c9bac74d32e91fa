//! Synthetic workload generation with controllable contention.
//!
//! Produces sequences of transactions whose object accesses follow a
//! Zipf-like skew, so scheduler simulations can be driven with realistic
//! hot-object contention. Generation is deterministic for a given RNG
//! seed and parallelized per transaction; the output order always matches
//! the sampled group order.
//!
//! The [`compress`] module converts an exact workload into the
//! bloom-filter representation, trading memory for a conservative
//! conflict test (phantom conflicts possible, missed conflicts never).

pub mod compress;
pub mod stats;
pub mod synth;
pub mod zipf;

pub use compress::{compress_transaction, compress_workload, CompressError};
pub use stats::WorkloadStats;
pub use synth::{SynthConfig, SynthError, Synthesizer};
pub use zipf::{ZipfCache, ZipfWeights};
