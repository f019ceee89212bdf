//! Ranking and parent selection.
//!
//! All strategies assume **maximization** (higher fitness = better) and work
//! on fitness slices, returning indices into them.
//!
//! Parent selectors are resolved from their configuration identifier through
//! a fixed registry, so an unknown identifier is reported when the
//! configuration is validated rather than in the middle of a run.
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"
//! - Goldberg & Deb (1991), "A Comparative Analysis of Selection Schemes
//!   Used in Genetic Algorithms"

use super::config::TanConfig;
use crate::error::ConfigurationError;
use rand::Rng;
use std::cmp::Ordering;

/// Indices of `fitness` ordered best-first.
///
/// The sort is stable: equal fitness keeps population order. NaN compares
/// equal to everything.
pub fn best_indices(fitness: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..fitness.len()).collect();
    order.sort_by(|&a, &b| {
        fitness[b]
            .partial_cmp(&fitness[a])
            .unwrap_or(Ordering::Equal)
    });
    order
}

/// Parent selection strategy.
///
/// # Examples
///
/// ```
/// use u_ruleinduct::tan::Selection;
///
/// // Binary tournament
/// let sel = Selection::Tournament(2);
///
/// // Fitness-proportionate
/// let sel = Selection::Roulette;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Tournament selection: pick `k` individuals at random, keep the best.
    ///
    /// # Complexity
    /// O(k) per selection
    Tournament(usize),

    /// Fitness-proportionate (roulette wheel) selection.
    ///
    /// Fitness values are non-negative, so they are used directly as
    /// weights. An all-zero population degrades to uniform selection.
    ///
    /// # Complexity
    /// O(n) per selection
    Roulette,

    /// Linear rank selection: the best of `n` gets weight `n`, the worst 1.
    ///
    /// Reference: Baker (1985), "Adaptive Selection Methods for Genetic
    /// Algorithms"
    ///
    /// # Complexity
    /// O(n log n) per selection
    Rank,
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Tournament(2)
    }
}

type SelectorFactory = fn(&TanConfig) -> Selection;

fn tournament_factory(config: &TanConfig) -> Selection {
    Selection::Tournament(config.tournament_size)
}

fn roulette_factory(_: &TanConfig) -> Selection {
    Selection::Roulette
}

fn rank_factory(_: &TanConfig) -> Selection {
    Selection::Rank
}

const SELECTORS: &[(&str, SelectorFactory)] = &[
    ("tournament", tournament_factory),
    ("roulette", roulette_factory),
    ("rank", rank_factory),
];

impl Selection {
    /// Identifiers accepted by `parents-selector`.
    pub fn registered() -> impl Iterator<Item = &'static str> {
        SELECTORS.iter().map(|(id, _)| *id)
    }

    /// Resolves the configured parent selector.
    pub fn from_config(config: &TanConfig) -> Result<Self, ConfigurationError> {
        SELECTORS
            .iter()
            .find(|(id, _)| *id == config.parents_selector)
            .map(|(_, factory)| factory(config))
            .ok_or_else(|| ConfigurationError::UnknownOperator {
                key: "parents-selector",
                id: config.parents_selector.clone(),
            })
    }

    /// Selects one parent index.
    ///
    /// # Panics
    /// Panics if `fitness` is empty.
    pub fn select<R: Rng>(&self, fitness: &[f64], rng: &mut R) -> usize {
        assert!(!fitness.is_empty(), "cannot select from empty population");

        match self {
            Selection::Tournament(k) => tournament(fitness, *k, rng),
            Selection::Roulette => roulette(fitness, rng),
            Selection::Rank => rank(fitness, rng),
        }
    }

    /// Selects `n` parent indices with replacement.
    ///
    /// Returns an empty vector when `fitness` is empty.
    pub fn select_many<R: Rng>(&self, fitness: &[f64], n: usize, rng: &mut R) -> Vec<usize> {
        if fitness.is_empty() {
            return Vec::new();
        }
        (0..n).map(|_| self.select(fitness, rng)).collect()
    }
}

fn tournament<R: Rng>(fitness: &[f64], k: usize, rng: &mut R) -> usize {
    let k = k.max(1);
    let n = fitness.len();

    let mut best_idx = rng.random_range(0..n);
    for _ in 1..k {
        let idx = rng.random_range(0..n);
        if fitness[idx] > fitness[best_idx] {
            best_idx = idx;
        }
    }
    best_idx
}

fn roulette<R: Rng>(fitness: &[f64], rng: &mut R) -> usize {
    let n = fitness.len();
    if n == 1 {
        return 0;
    }

    let weights: Vec<f64> = fitness
        .iter()
        .map(|&f| if f.is_finite() && f > 0.0 { f } else { 0.0 })
        .collect();
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return rng.random_range(0..n);
    }

    let threshold = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        cumulative += w;
        if cumulative > threshold {
            return i;
        }
    }

    n - 1 // floating-point fallback
}

fn rank<R: Rng>(fitness: &[f64], rng: &mut R) -> usize {
    let n = fitness.len();
    if n == 1 {
        return 0;
    }

    let order = best_indices(fitness);
    let total = (n * (n + 1)) as f64 / 2.0;
    let threshold = rng.random_range(0.0..total);
    let mut cumulative = 0.0;

    for (rank, &idx) in order.iter().enumerate() {
        cumulative += (n - rank) as f64;
        if cumulative > threshold {
            return idx;
        }
    }

    order[n - 1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_best_indices_stable() {
        let order = best_indices(&[0.5, 0.9, 0.5, 0.1, 0.9]);
        assert_eq!(order, vec![1, 4, 0, 2, 3]);
    }

    #[test]
    fn test_best_indices_empty() {
        assert!(best_indices(&[]).is_empty());
    }

    #[test]
    fn test_tournament_favors_best() {
        let fitness = [0.1, 0.5, 0.9, 0.2];
        let mut rng = rng();

        let mut counts = [0u32; 4];
        let n = 10000;
        for _ in 0..n {
            counts[Selection::Tournament(4).select(&fitness, &mut rng)] += 1;
        }
        assert!(
            counts[2] > 6000,
            "expected best to be selected >60% of the time, got {}/{n}",
            counts[2]
        );
    }

    #[test]
    fn test_tournament_size_1_is_random() {
        let fitness = [0.1, 0.5, 0.9, 0.2];
        let mut rng = rng();

        let mut counts = [0u32; 4];
        for _ in 0..10000 {
            counts[Selection::Tournament(1).select(&fitness, &mut rng)] += 1;
        }
        for &c in &counts {
            assert!(c > 1500, "expected uniform, got counts: {counts:?}");
        }
    }

    #[test]
    fn test_roulette_favors_best() {
        let fitness = [0.01, 0.2, 0.9, 0.05];
        let mut rng = rng();

        let mut counts = [0u32; 4];
        for _ in 0..10000 {
            counts[Selection::Roulette.select(&fitness, &mut rng)] += 1;
        }
        assert!(counts[2] > counts[0], "best should be selected more: {counts:?}");
    }

    #[test]
    fn test_roulette_all_zero_is_uniform() {
        let fitness = [0.0; 4];
        let mut rng = rng();

        let mut counts = [0u32; 4];
        for _ in 0..10000 {
            counts[Selection::Roulette.select(&fitness, &mut rng)] += 1;
        }
        for &c in &counts {
            assert!(c > 1500, "expected uniform, got counts: {counts:?}");
        }
    }

    #[test]
    fn test_rank_favors_best() {
        let fitness = [0.01, 0.2, 0.9, 0.05];
        let mut rng = rng();

        let mut counts = [0u32; 4];
        for _ in 0..10000 {
            counts[Selection::Rank.select(&fitness, &mut rng)] += 1;
        }
        assert!(counts[2] > counts[0], "best should be selected more: {counts:?}");
    }

    #[test]
    fn test_single_individual() {
        let mut rng = rng();
        assert_eq!(Selection::Tournament(3).select(&[0.4], &mut rng), 0);
        assert_eq!(Selection::Roulette.select(&[0.4], &mut rng), 0);
        assert_eq!(Selection::Rank.select(&[0.4], &mut rng), 0);
    }

    #[test]
    fn test_select_many() {
        let mut rng = rng();
        let picks = Selection::default().select_many(&[0.3, 0.6, 0.1], 7, &mut rng);
        assert_eq!(picks.len(), 7);
        assert!(picks.iter().all(|&i| i < 3));
        assert!(Selection::Rank.select_many(&[], 5, &mut rng).is_empty());
    }

    #[test]
    #[should_panic(expected = "cannot select from empty population")]
    fn test_empty_population_panics() {
        let mut rng = rng();
        Selection::Tournament(3).select(&[], &mut rng);
    }

    // ---- Registry ----

    #[test]
    fn test_registry_resolves_known_ids() {
        let config = TanConfig::default().with_tournament_size(5);
        assert_eq!(Selection::from_config(&config), Ok(Selection::Tournament(5)));

        let config = TanConfig::default().with_parents_selector("rank");
        assert_eq!(Selection::from_config(&config), Ok(Selection::Rank));

        let ids: Vec<&str> = Selection::registered().collect();
        assert_eq!(ids, vec!["tournament", "roulette", "rank"]);
    }

    #[test]
    fn test_registry_rejects_unknown_id() {
        let config = TanConfig::default().with_parents_selector("lottery");
        let err = Selection::from_config(&config).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnknownOperator {
                key: "parents-selector",
                id: "lottery".into()
            }
        );
    }
}
