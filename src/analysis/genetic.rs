//! Genetic operators over variable-length routes.
//!
//! A chromosome is an ordered list of distinct genes (sensor ids). The
//! operators are generic so they can run over borrowed ids without cloning
//! strings, and take the random source explicitly.

use std::collections::HashSet;
use std::hash::Hash;

use rand::seq::SliceRandom;
use rand::Rng;

// ---

/// Uniformly random permutation of `pool`, truncated to `len` genes.
pub fn random_route<T, R>(pool: &[T], len: usize, rng: &mut R) -> Vec<T>
where
    T: Copy,
    R: Rng + ?Sized,
{
    let mut genes = pool.to_vec();
    genes.shuffle(rng);
    genes.truncate(len);
    genes
}

/// Index of the winner of a tournament of `size` draws, sampled with replacement.
///
/// Ties keep the earlier draw. `fitness` must be non-empty.
pub fn tournament_index<R>(fitness: &[f64], size: usize, rng: &mut R) -> usize
where
    R: Rng + ?Sized,
{
    // ---
    let mut best = rng.gen_range(0..fitness.len());

    for _ in 1..size {
        let challenger = rng.gen_range(0..fitness.len());
        if fitness[challenger] > fitness[best] {
            best = challenger;
        }
    }

    best
}

/// Order crossover producing a single child.
///
/// The child aims for the floored mean of the parent lengths. A random window
/// of `parent1` is copied in place, then free slots are filled with unused
/// genes in `parent2` order. Slots left empty once `parent2` runs out are
/// dropped, so the child can come out shorter than its target.
pub fn crossover<T, R>(parent1: &[T], parent2: &[T], rng: &mut R) -> Vec<T>
where
    T: Copy + Eq + Hash,
    R: Rng + ?Sized,
{
    // ---
    if parent1.is_empty() || parent2.is_empty() {
        return if parent1.is_empty() {
            parent2.to_vec()
        } else {
            parent1.to_vec()
        };
    }

    let target_len = (parent1.len() + parent2.len()) / 2;
    let shorter = parent1.len().min(parent2.len());

    let a = rng.gen_range(0..shorter);
    let b = rng.gen_range(0..shorter);
    let (start, end) = (a.min(b), a.max(b));

    let mut child: Vec<Option<T>> = vec![None; target_len];
    let mut used = HashSet::with_capacity(target_len);

    for i in start..=end {
        if i >= parent1.len() || i >= target_len {
            break;
        }
        child[i] = Some(parent1[i]);
        used.insert(parent1[i]);
    }

    let mut slot = 0;
    for &gene in parent2 {
        while slot < target_len && child[slot].is_some() {
            slot += 1;
        }
        if slot >= target_len {
            break;
        }
        if used.insert(gene) {
            child[slot] = Some(gene);
        }
    }

    child.into_iter().flatten().collect()
}

/// Which mutation was applied to a route, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    None,
    Swap,
    Insert,
}

/// Mutate `route` in place with probability `rate`.
///
/// Routes with fewer than two genes are left alone. Half the mutations swap
/// two positions (possibly the same one); the other half insert a gene from
/// `pool` that is not yet on the route, unless the route already holds
/// `max_len` genes or every gene is in use.
///
/// # Panics
///
/// Panics if `rate` is outside `[0, 1]`. [`OptimizerParams::validate`] rejects
/// such rates before a search starts.
///
/// [`OptimizerParams::validate`]: crate::analysis::OptimizerParams::validate
pub fn mutate<T, R>(
    route: &mut Vec<T>,
    pool: &[T],
    max_len: usize,
    rate: f64,
    rng: &mut R,
) -> Mutation
where
    T: Copy + PartialEq,
    R: Rng + ?Sized,
{
    // ---
    if route.len() < 2 || !rng.gen_bool(rate) {
        return Mutation::None;
    }

    if rng.gen_bool(0.5) {
        let i = rng.gen_range(0..route.len());
        let j = rng.gen_range(0..route.len());
        route.swap(i, j);
        return Mutation::Swap;
    }

    if route.len() >= max_len {
        return Mutation::None;
    }

    let available: Vec<T> = pool.iter().copied().filter(|g| !route.contains(g)).collect();
    match available.choose(rng) {
        Some(&gene) => {
            let at = rng.gen_range(0..=route.len());
            route.insert(at, gene);
            Mutation::Insert
        }
        None => Mutation::None,
    }
}
