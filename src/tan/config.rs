//! Rule-induction configuration.
//!
//! [`TanConfig`] holds every parameter of the per-class evolutionary loop.
//! It can be built in code or loaded from TOML with kebab-case keys
//! (`population-size`, `copy-prob`, `support`, ...).

use super::selection::Selection;
use crate::dataset::{IntervalPolicy, Metadata};
use crate::error::ConfigurationError;
use crate::rule::{ConjunctionSpecies, TanEvaluator};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for token-competition rule induction.
///
/// # Defaults
///
/// ```
/// use u_ruleinduct::tan::TanConfig;
///
/// let config = TanConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert!((config.support - 0.1).abs() < 1e-12);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_ruleinduct::tan::TanConfig;
///
/// let config = TanConfig::default()
///     .with_population_size(50)
///     .with_max_generations(30)
///     .with_support(0.2)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
///
/// # TOML
///
/// ```
/// use u_ruleinduct::tan::TanConfig;
///
/// let config = TanConfig::from_toml_str("population-size = 40\nsupport = 0.05").unwrap();
/// assert_eq!(config.population_size, 40);
/// assert!((config.copy_prob - 0.1).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct TanConfig {
    /// Size of the working population (`bset`) and cap of the
    /// token-competition pool.
    pub population_size: usize,

    /// Generations evolved for each class.
    pub max_generations: usize,

    /// Probability that a current individual is copied unchanged into the
    /// candidate set (reproduction).
    pub copy_prob: f64,

    /// Fraction of the population carried over verbatim as elitists.
    pub elitist_prob: f64,

    /// Probability that an individual is mutated.
    pub mutation_prob: f64,

    /// Probability that a pair of parents is recombined.
    pub recombination_prob: f64,

    /// Minimum novel-coverage ratio for admission to the elite set.
    pub support: f64,

    /// Maximum derivation size of a rule genotype.
    ///
    /// For [`ConjunctionSpecies`] this is the maximum number of conditions.
    pub max_deriv_size: usize,

    /// Weight of false negatives in the fitness.
    pub w1: f64,

    /// Weight of false positives in the fitness.
    pub w2: f64,

    /// Parent selector identifier (see [`Selection::registered`]).
    pub parents_selector: String,

    /// Tournament size for the `tournament` selector.
    pub tournament_size: usize,

    /// Upper bound on rules admitted per token-competition pass.
    ///
    /// `None` leaves the elite bounded only by the support threshold and
    /// the pool size.
    pub max_elite_size: Option<usize>,

    /// Handling of dataset values outside their declared interval.
    pub interval_policy: IntervalPolicy,

    /// Whether to evaluate offspring and compute coverage in parallel.
    ///
    /// Has no effect without the `parallel` feature.
    pub parallel: bool,

    /// Random seed for reproducibility.
    ///
    /// `None` seeds from the operating system.
    pub seed: Option<u64>,
}

impl Default for TanConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_generations: 100,
            copy_prob: 0.1,
            elitist_prob: 0.1,
            mutation_prob: 0.1,
            recombination_prob: 0.8,
            support: 0.1,
            max_deriv_size: 5,
            w1: 0.7,
            w2: 0.8,
            parents_selector: "tournament".to_string(),
            tournament_size: 2,
            max_elite_size: None,
            interval_policy: IntervalPolicy::default(),
            parallel: true,
            seed: None,
        }
    }
}

impl TanConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the number of generations per class.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the reproduction probability.
    pub fn with_copy_prob(mut self, p: f64) -> Self {
        self.copy_prob = p.clamp(0.0, 1.0);
        self
    }

    /// Sets the elitist fraction.
    pub fn with_elitist_prob(mut self, p: f64) -> Self {
        self.elitist_prob = p.clamp(0.0, 1.0);
        self
    }

    /// Sets the mutation probability.
    pub fn with_mutation_prob(mut self, p: f64) -> Self {
        self.mutation_prob = p.clamp(0.0, 1.0);
        self
    }

    /// Sets the recombination probability.
    pub fn with_recombination_prob(mut self, p: f64) -> Self {
        self.recombination_prob = p.clamp(0.0, 1.0);
        self
    }

    /// Sets the support threshold.
    pub fn with_support(mut self, support: f64) -> Self {
        self.support = support.clamp(0.0, 1.0);
        self
    }

    /// Sets the maximum derivation size.
    pub fn with_max_deriv_size(mut self, n: usize) -> Self {
        self.max_deriv_size = n;
        self
    }

    /// Sets the fitness weights.
    pub fn with_weights(mut self, w1: f64, w2: f64) -> Self {
        self.w1 = w1;
        self.w2 = w2;
        self
    }

    /// Sets the parent selector identifier.
    pub fn with_parents_selector(mut self, id: impl Into<String>) -> Self {
        self.parents_selector = id.into();
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.tournament_size = k;
        self
    }

    /// Caps the number of rules admitted per token-competition pass.
    pub fn with_max_elite_size(mut self, n: usize) -> Self {
        self.max_elite_size = Some(n);
        self
    }

    /// Sets the out-of-interval policy used when loading datasets.
    pub fn with_interval_policy(mut self, policy: IntervalPolicy) -> Self {
        self.interval_policy = policy;
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of elitists: `round(population_size * elitist_prob)`.
    pub fn elitist_count(&self) -> usize {
        (self.population_size as f64 * self.elitist_prob).round() as usize
    }

    /// Fitness evaluator parameterized by `w1` and `w2`.
    pub fn evaluator(&self) -> TanEvaluator {
        TanEvaluator::new(self.w1, self.w2)
    }

    /// Conjunctive species bounded by `max_deriv_size`.
    pub fn species(&self, metadata: &Metadata) -> ConjunctionSpecies {
        ConjunctionSpecies::new(metadata, self.max_deriv_size)
    }

    /// Validates the configuration.
    ///
    /// Every error names the offending key.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.population_size == 0 {
            return Err(ConfigurationError::invalid("population-size", "must be at least 1"));
        }
        if self.max_generations == 0 {
            return Err(ConfigurationError::invalid("max-generations", "must be at least 1"));
        }
        for (key, value) in [
            ("copy-prob", self.copy_prob),
            ("elitist-prob", self.elitist_prob),
            ("mutation-prob", self.mutation_prob),
            ("recombination-prob", self.recombination_prob),
            ("support", self.support),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigurationError::invalid(key, format!("{value} is not in [0, 1]")));
            }
        }
        if self.population_size > 1 && self.elitist_count() >= self.population_size {
            return Err(ConfigurationError::invalid(
                "elitist-prob",
                "elitists fill the entire population",
            ));
        }
        for (key, value) in [("w1", self.w1), ("w2", self.w2)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigurationError::invalid(key, format!("{value} must be finite and non-negative")));
            }
        }
        if self.max_deriv_size == 0 {
            return Err(ConfigurationError::invalid("max-deriv-size", "must be at least 1"));
        }
        if self.tournament_size == 0 {
            return Err(ConfigurationError::invalid("tournament-size", "must be at least 1"));
        }
        if self.max_elite_size == Some(0) {
            return Err(ConfigurationError::invalid("max-elite-size", "must be positive or absent"));
        }
        Selection::from_config(self)?;
        Ok(())
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigurationError> {
        let config: TanConfig =
            toml::from_str(source).map_err(|e| ConfigurationError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigurationError> {
        let source = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigurationError::Io(format!("{}: {e}", path.as_ref().display()))
        })?;
        Self::from_toml_str(&source)
    }

    /// Serializes the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigurationError> {
        toml::to_string_pretty(self).map_err(|e| ConfigurationError::Parse(e.to_string()))
    }
}
