//! Empirical uniformity analysis for hash constructions.
//!
//! Hashes a large set of *distinct* random 32-bit ids, buckets the
//! outputs, and reports the ratio of the population standard deviation of
//! bucket counts to their mean. Lower is more uniform; a perfectly
//! random hash lands near `sqrt(buckets / samples)` and a degenerate one
//! orders of magnitude higher. The method is deterministic for a fixed
//! RNG, so scores can serve as regression tests when a hash construction
//! changes.
//!
//! This is a diagnostic tool: nothing on the workload or scheduling path
//! depends on it.

use rand::Rng;
use serde::{Deserialize, Serialize};
use skewbench_bloom::{legacy_hash, HashFamily, LEGACY_SEEDS};
use std::collections::HashSet;
use tracing::info;

/// Parameters for one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniformityConfig {
    /// Number of distinct ids to hash.
    pub num_samples: usize,
    /// Number of buckets the outputs are folded into.
    pub max_value: usize,
}

impl UniformityConfig {
    /// Create a configuration.
    pub fn new(num_samples: usize, max_value: usize) -> Self {
        Self {
            num_samples,
            max_value,
        }
    }
}

impl Default for UniformityConfig {
    fn default() -> Self {
        Self::new(100_000, 256)
    }
}

/// Bucket counts and their dispersion for one hash function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniformityReport {
    buckets: Vec<u64>,
    mean: f64,
    std_dev: f64,
}

impl UniformityReport {
    /// Per-bucket output counts.
    pub fn buckets(&self) -> &[u64] {
        &self.buckets
    }

    /// Mean bucket count.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Population standard deviation of bucket counts.
    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    /// Uniformity score: standard deviation over mean. Lower is more
    /// uniform.
    pub fn score(&self) -> f64 {
        if self.mean == 0.0 {
            0.0
        } else {
            self.std_dev / self.mean
        }
    }
}

/// Draw `count` distinct 32-bit ids, rejecting repeats until the
/// requested count is reached.
///
/// # Panics
///
/// Panics if `count` exceeds the number of distinct 32-bit values.
pub fn sample_distinct<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<u32> {
    assert!(
        count as u64 <= u32::MAX as u64 + 1,
        "cannot draw {count} distinct 32-bit ids"
    );

    let mut seen = HashSet::with_capacity(count);
    let mut samples = Vec::with_capacity(count);
    while samples.len() < count {
        let candidate: u32 = rng.gen();
        if seen.insert(candidate) {
            samples.push(candidate);
        }
    }
    samples
}

/// Bucket the outputs of `hash` over pre-drawn samples.
///
/// Outputs are folded into `max_value` buckets by modulo, so hashes wider
/// than the bucket range are still comparable.
///
/// # Panics
///
/// Panics if `max_value` is zero.
pub fn analyze_samples(hash: impl Fn(u32) -> u32, samples: &[u32], max_value: usize) -> UniformityReport {
    assert!(max_value > 0, "need at least one bucket");

    let mut buckets = vec![0u64; max_value];
    for &sample in samples {
        buckets[hash(sample) as usize % max_value] += 1;
    }

    let mean = samples.len() as f64 / max_value as f64;
    let variance = buckets
        .iter()
        .map(|&count| {
            let delta = count as f64 - mean;
            delta * delta
        })
        .sum::<f64>()
        / max_value as f64;

    UniformityReport {
        buckets,
        mean,
        std_dev: variance.sqrt(),
    }
}

/// Draw fresh distinct samples and analyze one hash function.
pub fn analyze<R: Rng + ?Sized>(
    hash: impl Fn(u32) -> u32,
    config: &UniformityConfig,
    rng: &mut R,
) -> UniformityReport {
    let samples = sample_distinct(config.num_samples, rng);
    analyze_samples(hash, &samples, config.max_value)
}

/// Analyze every member of a hash family against one shared sample set,
/// returning one report per member in part order.
pub fn analyze_family<R: Rng + ?Sized>(
    family: &HashFamily,
    config: &UniformityConfig,
    rng: &mut R,
) -> Vec<UniformityReport> {
    info!(
        n_parts = family.n_parts(),
        index_length = family.index_length(),
        num_samples = config.num_samples,
        max_value = config.max_value,
        "Analyzing hash family"
    );

    let samples = sample_distinct(config.num_samples, rng);
    (0..family.n_parts())
        .map(|part| analyze_samples(|id| family.hash(part, id), &samples, config.max_value))
        .collect()
}

/// Analyze the four canonical legacy cascade instances against one shared
/// sample set. Baseline for comparing new constructions.
pub fn analyze_legacy<R: Rng + ?Sized>(
    config: &UniformityConfig,
    rng: &mut R,
) -> Vec<UniformityReport> {
    info!(
        num_samples = config.num_samples,
        max_value = config.max_value,
        "Analyzing legacy cascade"
    );

    let samples = sample_distinct(config.num_samples, rng);
    LEGACY_SEEDS
        .iter()
        .map(|&seed| analyze_samples(|id| legacy_hash(id, seed), &samples, config.max_value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    // Enough samples that a sound hash scores well below the threshold:
    // the random-hash expectation is sqrt(256/32768), about 0.09.
    const SAMPLES: usize = 32_768;
    const BUCKETS: usize = 256;
    const THRESHOLD: f64 = 0.15;

    #[test]
    fn test_samples_are_distinct() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let samples = sample_distinct(10_000, &mut rng);
        let unique: HashSet<u32> = samples.iter().copied().collect();
        assert_eq!(samples.len(), 10_000);
        assert_eq!(unique.len(), 10_000);
    }

    #[test]
    fn test_family_members_are_uniform() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let family = HashFamily::new(8, 8).unwrap();
        let config = UniformityConfig::new(SAMPLES, BUCKETS);

        let reports = analyze_family(&family, &config, &mut rng);
        assert_eq!(reports.len(), 8);
        for (part, report) in reports.iter().enumerate() {
            assert!(
                report.score() < THRESHOLD,
                "part {part} scored {}",
                report.score()
            );
        }
    }

    #[test]
    fn test_legacy_baseline_is_uniform() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let config = UniformityConfig::new(SAMPLES, BUCKETS);

        for report in analyze_legacy(&config, &mut rng) {
            assert!(report.score() < THRESHOLD);
        }
    }

    #[test]
    fn test_degenerate_hash_scores_far_worse() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let config = UniformityConfig::new(SAMPLES, BUCKETS);
        let samples = sample_distinct(config.num_samples, &mut rng);

        let family = HashFamily::new(8, 8).unwrap();
        let good = analyze_samples(|id| family.hash(0, id), &samples, BUCKETS);
        // Collapses all mass onto four of the 256 buckets.
        let degenerate = analyze_samples(|id| id & 0xC0, &samples, BUCKETS);

        assert!(degenerate.score() > good.score() * 10.0);
        assert!(degenerate.score() > 1.0);
    }

    #[test]
    fn test_report_is_reproducible() {
        let config = UniformityConfig::new(4_096, 64);
        let family = HashFamily::new(4, 11).unwrap();

        let mut rng_a = ChaCha8Rng::seed_from_u64(5);
        let mut rng_b = ChaCha8Rng::seed_from_u64(5);
        let a = analyze_family(&family, &config, &mut rng_a);
        let b = analyze_family(&family, &config, &mut rng_b);
        assert_eq!(a, b);
    }

    #[test]
    fn test_bucket_counts_conserve_samples() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let report = analyze(|id| id, &UniformityConfig::new(1_000, 32), &mut rng);
        assert_eq!(report.buckets().iter().sum::<u64>(), 1_000);
        assert!((report.mean() - 1_000.0 / 32.0).abs() < 1e-12);
    }
}
