//! Token competition.
//!
//! Every instance of the target class is a token. Candidate rules are
//! visited best-first; each rule seizes the tokens it covers that no fitter
//! rule has already seized, and its fitness is scaled by the share of its
//! coverage that was still free:
//!
//! ```text
//! fitness' = fitness * newly_covered / cover_count      (cover_count > 0)
//! fitness' = 0                                          (cover_count = 0)
//! ```
//!
//! Rules whose free share reaches the support threshold are copied into the
//! new elite set. Redundant rules are thus pushed towards zero fitness and
//! the elite ends up covering mostly disjoint parts of the class.
//!
//! Raw coverage is independent per rule and may be computed in parallel;
//! tokens are always claimed sequentially in rank order.
//!
//! # References
//!
//! - Tan, Tay, Lee & Heng (2002), "Mining multiple comprehensible
//!   classification rules using genetic programming"
//! - Wong & Leung (2000), *Data Mining Using Grammar Based Genetic
//!   Programming and Applications*

use super::config::TanConfig;
use super::selection::best_indices;
use crate::dataset::Dataset;
use crate::rule::{Antecedent, RuleIndividual};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Token-competition engine.
///
/// Keeps its token buffer between calls so repeated passes over the same
/// class do not reallocate.
#[derive(Debug, Clone)]
pub struct TokenCompetition {
    support: f64,
    capacity: usize,
    max_elite: Option<usize>,
    parallel: bool,
    seized: Vec<bool>,
}

impl TokenCompetition {
    /// Creates an engine with the given support threshold and pool capacity.
    pub fn new(support: f64, capacity: usize) -> Self {
        Self {
            support,
            capacity,
            max_elite: None,
            parallel: false,
            seized: Vec::new(),
        }
    }

    /// Engine configured from `support`, `population-size`,
    /// `max-elite-size` and `parallel`.
    pub fn from_config(config: &TanConfig) -> Self {
        Self {
            max_elite: config.max_elite_size,
            parallel: config.parallel,
            ..Self::new(config.support, config.population_size)
        }
    }

    /// Caps the number of admitted rules per pass.
    pub fn with_max_elite(mut self, max_elite: Option<usize>) -> Self {
        self.max_elite = max_elite;
        self
    }

    /// Enables or disables parallel coverage computation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Runs one competition pass and returns the new elite set.
    ///
    /// The pool is `candidates` followed by `elite`, ranked best-first
    /// (stable) and cut to the configured capacity. Rescaled fitness is
    /// written back into `candidates`; pooled members of the old elite are
    /// rescaled too before being dropped. Candidates outside the cut keep
    /// their fitness.
    pub fn compete<G, A>(
        &mut self,
        candidates: &mut [RuleIndividual<G, A>],
        mut elite: Vec<RuleIndividual<G, A>>,
        class_label: usize,
        dataset: &Dataset,
    ) -> Vec<RuleIndividual<G, A>>
    where
        G: Clone + Send + Sync,
        A: Antecedent,
    {
        let n = candidates.len();
        let fitness: Vec<f64> = candidates
            .iter()
            .chain(elite.iter())
            .map(RuleIndividual::fitness)
            .collect();
        let mut pool = best_indices(&fitness);
        pool.truncate(self.capacity);

        let tokens = dataset.class_instances(class_label);
        self.seized.clear();
        self.seized.resize(tokens.len(), false);

        let coverage = self.coverage(&pool, candidates, &elite, tokens, dataset);

        let mut admitted = Vec::new();
        let mut zeroed = 0usize;
        for (&slot, covered) in pool.iter().zip(coverage) {
            let individual = if slot < n {
                &mut candidates[slot]
            } else {
                &mut elite[slot - n]
            };

            let cover_count = covered.len();
            if cover_count == 0 {
                individual.set_fitness(0.0);
                zeroed += 1;
                continue;
            }

            let mut newly_covered = 0usize;
            for token in covered {
                if !self.seized[token] {
                    self.seized[token] = true;
                    newly_covered += 1;
                }
            }

            let ratio = newly_covered as f64 / cover_count as f64;
            individual.set_fitness(individual.fitness() * ratio);

            let room = self.max_elite.map_or(true, |cap| admitted.len() < cap);
            if newly_covered > 0 && ratio >= self.support && room {
                admitted.push(individual.clone());
            }
        }

        log::trace!(
            "token competition class {class_label}: pool={} zero-coverage={zeroed} admitted={} seized={}/{}",
            pool.len(),
            admitted.len(),
            self.seized.iter().filter(|&&s| s).count(),
            tokens.len()
        );

        admitted
    }

    /// Positions in `tokens` covered by each pooled rule, in pool order.
    fn coverage<G, A>(
        &self,
        pool: &[usize],
        candidates: &[RuleIndividual<G, A>],
        elite: &[RuleIndividual<G, A>],
        tokens: &[usize],
        dataset: &Dataset,
    ) -> Vec<Vec<usize>>
    where
        G: Clone + Send + Sync,
        A: Antecedent,
    {
        let n = candidates.len();
        let covered_by = |&slot: &usize| -> Vec<usize> {
            let rule = if slot < n {
                candidates[slot].rule()
            } else {
                elite[slot - n].rule()
            };
            tokens
                .iter()
                .enumerate()
                .filter(|(_, &row)| rule.covers(dataset.instance(row)))
                .map(|(position, _)| position)
                .collect()
        };

        #[cfg(feature = "parallel")]
        if self.parallel {
            return pool.par_iter().map(covered_by).collect();
        }

        pool.iter().map(covered_by).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Attribute, Instance, Metadata};
    use proptest::prelude::*;

    /// Covers exactly the listed instance rows.
    #[derive(Debug, Clone, PartialEq)]
    struct Rows(Vec<usize>);

    impl Antecedent for Rows {
        fn covers(&self, instance: &Instance) -> bool {
            self.0.contains(&(instance.value(0) as usize))
        }
    }

    type Ind = RuleIndividual<usize, Rows>;

    /// Attribute 0 holds the row id, attribute 1 the class.
    fn dataset(classes: &[usize]) -> Dataset {
        let metadata = Metadata::new(
            vec![
                Attribute::integer("row", 0, 1000),
                Attribute::categorical("class", ["c0", "c1", "c2"]),
            ],
            1,
        )
        .unwrap();
        let instances = classes
            .iter()
            .enumerate()
            .map(|(row, &c)| Instance::new(vec![row as f64, c as f64]))
            .collect();
        Dataset::new(metadata, instances).unwrap()
    }

    fn ind(rows: &[usize], fitness: f64) -> Ind {
        tagged(0, rows, fitness)
    }

    fn tagged(id: usize, rows: &[usize], fitness: f64) -> Ind {
        let mut ind = RuleIndividual::new(id, Rows(rows.to_vec()));
        ind.set_fitness(fitness);
        ind
    }

    #[test]
    fn test_scenario_a_single_rule_keeps_fitness() {
        // classes {0,0,1,1}; rule covers rows 0 (class 0) and 2 (class 1)
        let ds = dataset(&[0, 0, 1, 1]);
        let mut candidates = vec![ind(&[0, 2], 0.6)];
        let elite = TokenCompetition::new(0.1, 10).compete(&mut candidates, vec![], 0, &ds);

        assert_eq!(elite.len(), 1);
        assert!((candidates[0].fitness() - 0.6).abs() < 1e-12);
        assert!((elite[0].fitness() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_scenario_b_second_rule_loses_token() {
        let ds = dataset(&[0, 1, 1]);
        let mut candidates = vec![ind(&[0], 0.4), ind(&[0], 0.9)];
        let elite = TokenCompetition::new(0.1, 10).compete(&mut candidates, vec![], 0, &ds);

        assert_eq!(elite.len(), 1);
        assert!((elite[0].fitness() - 0.9).abs() < 1e-12);
        assert!((candidates[1].fitness() - 0.9).abs() < 1e-12);
        assert_eq!(candidates[0].fitness(), 0.0);
    }

    #[test]
    fn test_zero_coverage_zeroes_fitness() {
        let ds = dataset(&[0, 1]);
        // covers only a class-1 instance
        let mut candidates = vec![ind(&[1], 0.8), ind(&[], 0.5)];
        let elite = TokenCompetition::new(0.0, 10).compete(&mut candidates, vec![], 0, &ds);
        assert!(elite.is_empty());
        assert_eq!(candidates[0].fitness(), 0.0);
        assert_eq!(candidates[1].fitness(), 0.0);
    }

    #[test]
    fn test_partial_overlap_scales() {
        let ds = dataset(&[0, 0, 0, 0]);
        let mut candidates = vec![ind(&[0, 1], 1.0), ind(&[1, 2, 3, 0], 0.8)];
        let elite = TokenCompetition::new(0.6, 10).compete(&mut candidates, vec![], 0, &ds);

        // second rule: 2 of 4 tokens free -> ratio 0.5 < 0.6
        assert!((candidates[1].fitness() - 0.4).abs() < 1e-12);
        assert_eq!(elite.len(), 1);
    }

    #[test]
    fn test_elite_competes_and_is_replaced() {
        let ds = dataset(&[0, 0, 0]);
        let old = ind(&[0, 1], 0.95);
        let mut candidates = vec![ind(&[0, 1], 0.5), ind(&[2], 0.3)];
        let elite = TokenCompetition::new(0.1, 10).compete(&mut candidates, vec![old], 0, &ds);

        // old elite rule ranks first and keeps its tokens
        let fits: Vec<f64> = elite.iter().map(Ind::fitness).collect();
        assert_eq!(fits, vec![0.95, 0.3]);
        assert_eq!(candidates[0].fitness(), 0.0);
    }

    #[test]
    fn test_pool_capacity_leaves_rest_untouched() {
        let ds = dataset(&[0, 0]);
        let mut candidates = vec![ind(&[0], 0.2), ind(&[0], 0.9), ind(&[0], 0.5)];
        let elite = TokenCompetition::new(0.1, 2).compete(&mut candidates, vec![], 0, &ds);
        assert_eq!(elite.len(), 1);
        assert_eq!(candidates[2].fitness(), 0.0);
        // outside the top-2 pool
        assert!((candidates[0].fitness() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_ties_keep_population_order() {
        let ds = dataset(&[0]);
        let mut candidates = vec![ind(&[0], 0.5), ind(&[0], 0.5)];
        TokenCompetition::new(0.1, 10).compete(&mut candidates, vec![], 0, &ds);
        assert!((candidates[0].fitness() - 0.5).abs() < 1e-12);
        assert_eq!(candidates[1].fitness(), 0.0);
    }

    #[test]
    fn test_max_elite_caps_admission() {
        let ds = dataset(&[0, 0, 0]);
        let mut candidates = vec![ind(&[0], 0.9), ind(&[1], 0.8), ind(&[2], 0.7)];
        let elite = TokenCompetition::new(0.1, 10)
            .with_max_elite(Some(2))
            .compete(&mut candidates, vec![], 0, &ds);
        assert_eq!(elite.len(), 2);
        // rescaling still applies to the rule that was not admitted
        assert!((candidates[2].fitness() - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_elite_is_decoupled_copy() {
        let ds = dataset(&[0]);
        let mut candidates = vec![ind(&[0], 0.7)];
        let elite = TokenCompetition::new(0.1, 10).compete(&mut candidates, vec![], 0, &ds);
        candidates[0].set_fitness(0.0);
        assert!((elite[0].fitness() - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let ds = dataset(&[0, 1, 0, 0, 1, 0, 2, 0]);
        let make = || {
            vec![
                ind(&[0, 2, 3], 0.9),
                ind(&[3, 5], 0.8),
                ind(&[1, 4], 0.7),
                ind(&[5, 7, 0], 0.6),
                ind(&[6], 0.5),
            ]
        };
        let mut seq = make();
        let mut par = make();
        let e1 = TokenCompetition::new(0.3, 10).compete(&mut seq, vec![], 0, &ds);
        let e2 = TokenCompetition::new(0.3, 10)
            .with_parallel(true)
            .compete(&mut par, vec![], 0, &ds);
        let f = |v: &[Ind]| v.iter().map(Ind::fitness).collect::<Vec<_>>();
        assert_eq!(f(&seq), f(&par));
        assert_eq!(f(&e1), f(&e2));
    }

    #[test]
    fn test_buffer_reused_across_classes() {
        let ds = dataset(&[0, 1, 1, 1]);
        let mut engine = TokenCompetition::new(0.1, 10);
        let mut a = vec![ind(&[0], 0.5)];
        assert_eq!(engine.compete(&mut a, vec![], 0, &ds).len(), 1);
        let mut b = vec![ind(&[1, 2, 3], 0.5)];
        assert_eq!(engine.compete(&mut b, vec![], 1, &ds).len(), 1);
        let mut c = vec![ind(&[0], 0.5)];
        assert_eq!(engine.compete(&mut c, vec![], 0, &ds).len(), 1);
    }

    // ---- Properties ----

    fn arb_case() -> impl Strategy<Value = (Vec<usize>, Vec<(Vec<usize>, f64)>, f64)> {
        (1usize..12).prop_flat_map(|rows| {
            (
                prop::collection::vec(0usize..3, rows),
                prop::collection::vec(
                    (prop::collection::vec(0..rows, 0..rows), 0.01f64..1.0),
                    1..10,
                ),
                0.0f64..1.0,
            )
        })
    }

    fn population(rules: &[(Vec<usize>, f64)]) -> Vec<Ind> {
        rules
            .iter()
            .enumerate()
            .map(|(id, (rows, f))| tagged(id, rows, *f))
            .collect()
    }

    proptest! {
        #[test]
        fn prop_rescaling_bounds((classes, rules, support) in arb_case()) {
            let ds = dataset(&classes);
            let tokens = ds.class_instances(0).to_vec();
            let mut candidates = population(&rules);

            TokenCompetition::new(support, 100).compete(&mut candidates, vec![], 0, &ds);

            for (after, (_, before)) in candidates.iter().zip(&rules) {
                let covers = tokens.iter().filter(|t| after.rule().antecedent().0.contains(t)).count();
                if covers == 0 {
                    prop_assert_eq!(after.fitness(), 0.0);
                }
                prop_assert!(after.fitness() >= 0.0);
                prop_assert!(after.fitness() <= *before + 1e-12);
            }
        }

        #[test]
        fn prop_admitted_meet_support((classes, rules, support) in arb_case()) {
            let ds = dataset(&classes);
            let mut candidates = population(&rules);

            let elite = TokenCompetition::new(support, 100).compete(&mut candidates, vec![], 0, &ds);

            prop_assert!(elite.len() <= candidates.len());
            for member in &elite {
                let original = rules[*member.genotype()].1;
                let ratio = member.fitness() / original;
                prop_assert!(ratio + 1e-9 >= support, "ratio {} below support {}", ratio, support);
            }
        }

        #[test]
        fn prop_admitted_tokens_disjoint_when_full_support((classes, rules, _s) in arb_case()) {
            let ds = dataset(&classes);
            let tokens = ds.class_instances(0).to_vec();
            let mut candidates = population(&rules);
            let elite = TokenCompetition::new(1.0, 100).compete(&mut candidates, vec![], 0, &ds);

            let mut seen = std::collections::HashSet::new();
            for member in &elite {
                for t in tokens.iter().filter(|t| member.rule().antecedent().0.contains(t)) {
                    prop_assert!(seen.insert(*t), "token {} claimed twice", t);
                }
            }
        }
    }
}
