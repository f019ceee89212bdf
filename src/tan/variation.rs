//! Offspring production.
//!
//! Recombination and mutation are *filtered*: each operator applies with
//! its configured probability and the individuals it skips are returned
//! unchanged (sterile) alongside the transformed ones. The whole offspring
//! set is then scored by the evaluator, sterile members included, so no
//! fitness rescaled by an earlier token competition survives into the next.

use super::config::TanConfig;
use crate::dataset::Dataset;
use crate::rule::{Evaluator, Individual, RuleSpecies};
use rand::Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Probabilities and evaluation mode of the variation step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Variation {
    /// Probability that a parent pair is recombined.
    pub recombination_prob: f64,
    /// Probability that an individual is mutated.
    pub mutation_prob: f64,
    /// Probability that a current individual is reproduced as-is.
    pub copy_prob: f64,
    /// Evaluate offspring in parallel.
    pub parallel: bool,
}

impl Variation {
    /// Takes the operator rates from `config`.
    pub fn new(config: &TanConfig) -> Self {
        Self {
            recombination_prob: config.recombination_prob,
            mutation_prob: config.mutation_prob,
            copy_prob: config.copy_prob,
            parallel: config.parallel,
        }
    }

    /// Recombines consecutive parent pairs.
    ///
    /// Returns the children of recombined pairs followed by the sterile
    /// parents (pairs that were skipped and an unpaired last parent).
    pub fn recombine<S: RuleSpecies, R: Rng>(
        &self,
        species: &S,
        parents: Vec<Individual<S>>,
        rng: &mut R,
    ) -> Vec<Individual<S>> {
        let mut transformed = Vec::with_capacity(parents.len());
        let mut sterile = Vec::new();
        let mut parents = parents.into_iter();

        while let Some(first) = parents.next() {
            let Some(second) = parents.next() else {
                sterile.push(first);
                break;
            };
            if rng.random_bool(self.recombination_prob) {
                let (a, b) = species.recombine(first.genotype(), second.genotype(), rng);
                transformed.push(species.individual(a));
                transformed.push(species.individual(b));
            } else {
                sterile.push(first);
                sterile.push(second);
            }
        }

        transformed.extend(sterile);
        transformed
    }

    /// Mutates each individual with `mutation_prob`.
    ///
    /// Returns the mutants followed by the sterile individuals.
    pub fn mutate<S: RuleSpecies, R: Rng>(
        &self,
        species: &S,
        population: Vec<Individual<S>>,
        rng: &mut R,
    ) -> Vec<Individual<S>> {
        let mut transformed = Vec::with_capacity(population.len());
        let mut sterile = Vec::new();

        for individual in population {
            if rng.random_bool(self.mutation_prob) {
                let mutant = species.mutate(individual.genotype(), rng);
                transformed.push(species.individual(mutant));
            } else {
                sterile.push(individual);
            }
        }

        transformed.extend(sterile);
        transformed
    }

    /// Copies each member of `population` with `copy_prob`.
    pub fn reproduce<S: RuleSpecies, R: Rng>(
        &self,
        population: &[Individual<S>],
        rng: &mut R,
    ) -> Vec<Individual<S>> {
        population
            .iter()
            .filter(|_| rng.random_bool(self.copy_prob))
            .cloned()
            .collect()
    }

    /// Scores every individual with `evaluator`, replacing any fitness it
    /// already carries.
    pub fn evaluate<S, E>(
        &self,
        evaluator: &E,
        population: &mut [Individual<S>],
        dataset: &Dataset,
        class_label: usize,
    ) where
        S: RuleSpecies,
        E: Evaluator<S::Antecedent>,
    {
        let score = |individual: &mut Individual<S>| {
            let fitness = evaluator.evaluate(individual.rule().antecedent(), dataset, class_label);
            individual.set_fitness(fitness);
        };

        #[cfg(feature = "parallel")]
        if self.parallel {
            population.par_iter_mut().for_each(score);
            return;
        }

        population.iter_mut().for_each(score);
    }

    /// Full variation step: recombination, mutation, evaluation.
    pub fn vary<S, E, R>(
        &self,
        species: &S,
        evaluator: &E,
        parents: Vec<Individual<S>>,
        dataset: &Dataset,
        class_label: usize,
        rng: &mut R,
    ) -> Vec<Individual<S>>
    where
        S: RuleSpecies,
        E: Evaluator<S::Antecedent>,
        R: Rng,
    {
        let rset = self.recombine(species, parents, rng);
        let mut mset = self.mutate(species, rset, rng);
        self.evaluate::<S, E>(evaluator, &mut mset, dataset, class_label);
        mset
    }
}
