use crate::model::{Pair, Population};
use anyhow::{Context, Result};
use rand::Rng;
use rand_distr::{Distribution, Uniform};

/// Draws (A, B) pairs from the current positions of both populations.
///
/// A is picked uniformly. B is picked with signed weights
/// `pos(B[j]) - pos(A)`: their prefix sums, tagged with the index that
/// produced them, are sorted ascending and scanned for the first value
/// reaching a threshold drawn between zero and the largest prefix sum.
/// When the largest prefix sum is zero, or no entry reaches the threshold,
/// a uniformly drawn B index is kept instead.
pub struct PairSampler {
    a_dist: Uniform<usize>,
    b_dist: Uniform<usize>,
}

impl PairSampler {
    pub fn new(n_as: usize, n_bs: usize) -> Result<Self> {
        let a_dist = Uniform::new(0, n_as).context("failed to construct A index distribution")?;
        let b_dist = Uniform::new(0, n_bs).context("failed to construct B index distribution")?;
        Ok(Self { a_dist, b_dist })
    }

    /// Draw one pair. Only `current_position` is read, so every draw in a
    /// tick sees the same positions regardless of pending updates.
    pub fn sample<R: Rng>(&self, pop_a: &Population, pop_b: &Population, rng: &mut R) -> Pair {
        let a_id = self.a_dist.sample(rng);
        let pos_a = pop_a.entities()[a_id].current_position();

        let weights: Vec<f64> = pop_b
            .entities()
            .iter()
            .map(|ent| ent.current_position() - pos_a)
            .collect();

        let fallback = self.b_dist.sample(rng);
        let b_id = select_index(&weights, fallback, rng);

        Pair { a_id, b_id }
    }
}

/// Pick an index from signed weights through sorted prefix sums.
///
/// Consumes one random draw only when the largest prefix sum is nonzero.
pub fn select_index<R: Rng>(weights: &[f64], fallback: usize, rng: &mut R) -> usize {
    let mut cum_weights: Vec<(f64, usize)> = weights
        .iter()
        .scan(0.0, |sum, &w| {
            *sum += w;
            Some(*sum)
        })
        .enumerate()
        .map(|(idx, val)| (val, idx))
        .collect();

    // Stable sort: equal prefix sums stay in index order.
    cum_weights.sort_by(|a, b| a.0.total_cmp(&b.0));

    let Some(&(max_val, _)) = cum_weights.last() else {
        return fallback;
    };
    if max_val == 0.0 {
        return fallback;
    }

    // For a negative maximum the threshold lies in (max_val, 0].
    let threshold = rng.random::<f64>() * max_val;
    cum_weights
        .iter()
        .find(|&&(val, _)| val >= threshold)
        .map_or(fallback, |&(_, idx)| idx)
}
