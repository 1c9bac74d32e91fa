//! Zipf-like access weights.

use std::collections::HashMap;
use std::sync::Arc;

/// Rank weights for skewed object selection: `w[i] = 1 / (i+1)^theta`.
///
/// Rank 0 is the hottest object. `theta = 0` degenerates to uniform
/// selection; larger values concentrate mass on low ranks.
#[derive(Debug, Clone, PartialEq)]
pub struct ZipfWeights {
    theta: f64,
    weights: Vec<f64>,
}

impl ZipfWeights {
    fn build(n: usize, theta: f64) -> Self {
        let weights = (0..n)
            .map(|rank| 1.0 / ((rank + 1) as f64).powf(theta))
            .collect();
        Self { theta, weights }
    }

    /// Number of ranks.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// True iff the address space is empty.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// The skew parameter these weights were built with.
    pub fn theta(&self) -> f64 {
        self.theta
    }

    /// Raw, unnormalized weights in rank order.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Weights scaled to sum to one.
    pub fn normalized(&self) -> Vec<f64> {
        let total: f64 = self.weights.iter().sum();
        self.weights.iter().map(|w| w / total).collect()
    }

    /// Fraction of the total selection mass carried by the `k` hottest
    /// ranks. Useful for eyeballing how contended a parameter choice is:
    /// at `theta = 0` this is simply `k / n`, and it grows toward one as
    /// the skew sharpens.
    pub fn top_fraction(&self, k: usize) -> f64 {
        if self.weights.is_empty() {
            return 0.0;
        }
        let total: f64 = self.weights.iter().sum();
        let top: f64 = self.weights.iter().take(k).sum();
        top / total
    }
}

/// Explicit memo of weight vectors keyed by `(n, theta)`.
///
/// The weight vector for a large address space is expensive to build and
/// read-only afterwards, so the synthesizer reuses it across calls. The
/// cache is an owned object with caller-controlled lifetime rather than
/// process-wide state; entries are `Arc`-shared so concurrent workers can
/// hold the vector while the cache keeps growing.
#[derive(Debug, Clone, Default)]
pub struct ZipfCache {
    entries: HashMap<(usize, u64), Arc<ZipfWeights>>,
}

impl ZipfCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the weights for `(n, theta)`, building them on first use.
    ///
    /// `theta` is keyed by its bit pattern; callers validate it upstream
    /// (finite, non-negative) so equal parameters always share an entry.
    pub fn get(&mut self, n: usize, theta: f64) -> Arc<ZipfWeights> {
        self.entries
            .entry((n, theta.to_bits()))
            .or_insert_with(|| Arc::new(ZipfWeights::build(n, theta)))
            .clone()
    }

    /// Number of cached weight vectors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True iff nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all cached vectors.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
