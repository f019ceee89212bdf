//! Core trait definitions for rule induction.
//!
//! [`Antecedent`], [`RuleSpecies`] and [`Evaluator`] are the contract between
//! the induction engine and whatever produces and scores rule genotypes.

use crate::dataset::{Dataset, Instance};
use rand::Rng;

/// The predicate half of a rule.
pub trait Antecedent: Clone + Send + Sync + std::fmt::Debug {
    /// Whether the predicate accepts `instance`.
    fn covers(&self, instance: &Instance) -> bool;

    /// Structural size (e.g. number of conditions), used for reporting.
    fn size(&self) -> usize {
        1
    }
}

/// An antecedent plus the class it predicts.
///
/// The consequent stays unset while the rule is being evolved; the runner
/// assigns it when the rule's class finishes.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule<A> {
    antecedent: A,
    consequent: Option<usize>,
}

impl<A: Antecedent> Rule<A> {
    /// A rule without consequent.
    pub fn new(antecedent: A) -> Self {
        Self {
            antecedent,
            consequent: None,
        }
    }

    /// A rule predicting `consequent`.
    pub fn with_consequent(antecedent: A, consequent: usize) -> Self {
        Self {
            antecedent,
            consequent: Some(consequent),
        }
    }

    /// The predicate.
    pub fn antecedent(&self) -> &A {
        &self.antecedent
    }

    /// The predicted class, if assigned.
    pub fn consequent(&self) -> Option<usize> {
        self.consequent
    }

    pub(crate) fn set_consequent(&mut self, consequent: usize) {
        self.consequent = Some(consequent);
    }

    /// Whether the antecedent accepts `instance`.
    pub fn covers(&self, instance: &Instance) -> bool {
        self.antecedent.covers(instance)
    }

    /// Consumes the rule, returning its antecedent.
    pub fn into_antecedent(self) -> A {
        self.antecedent
    }
}

/// A candidate solution: genotype, decoded rule and fitness.
///
/// `Clone` is a deep copy, so a copy placed in the elite set is unaffected
/// by later fitness rescaling of the original.
#[derive(Debug, Clone)]
pub struct RuleIndividual<G, A> {
    genotype: G,
    rule: Rule<A>,
    fitness: Option<f64>,
}

impl<G, A: Antecedent> RuleIndividual<G, A> {
    /// An unevaluated individual.
    pub fn new(genotype: G, antecedent: A) -> Self {
        Self {
            genotype,
            rule: Rule::new(antecedent),
            fitness: None,
        }
    }

    /// The genotype.
    pub fn genotype(&self) -> &G {
        &self.genotype
    }

    /// The decoded rule.
    pub fn rule(&self) -> &Rule<A> {
        &self.rule
    }

    pub(crate) fn rule_mut(&mut self) -> &mut Rule<A> {
        &mut self.rule
    }

    /// Current fitness; unevaluated individuals report `0.0`.
    pub fn fitness(&self) -> f64 {
        self.fitness.unwrap_or(0.0)
    }

    /// Whether a fitness has been assigned.
    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    /// Sets the fitness.
    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = Some(fitness);
    }

    /// Consumes the individual, returning its rule.
    pub fn into_rule(self) -> Rule<A> {
        self.rule
    }
}

/// Genotype provider and variation operators.
///
/// Implementations define how rule genotypes are created, decoded into
/// antecedents, recombined and mutated. The engine decides *when* operators
/// apply; the species only knows *how*.
pub trait RuleSpecies: Send + Sync {
    /// Genotype representation.
    type Genotype: Clone + Send + Sync + std::fmt::Debug;

    /// Decoded predicate type.
    type Antecedent: Antecedent;

    /// Creates a random genotype.
    fn create<R: Rng>(&self, rng: &mut R) -> Self::Genotype;

    /// Decodes a genotype into its antecedent.
    fn decode(&self, genotype: &Self::Genotype) -> Self::Antecedent;

    /// Recombines two parents into two children.
    fn recombine<R: Rng>(
        &self,
        parent1: &Self::Genotype,
        parent2: &Self::Genotype,
        rng: &mut R,
    ) -> (Self::Genotype, Self::Genotype);

    /// Produces a mutated copy of `genotype`.
    fn mutate<R: Rng>(&self, genotype: &Self::Genotype, rng: &mut R) -> Self::Genotype;

    /// Wraps a genotype into an unevaluated individual.
    fn individual(&self, genotype: Self::Genotype) -> RuleIndividual<Self::Genotype, Self::Antecedent> {
        let antecedent = self.decode(&genotype);
        RuleIndividual::new(genotype, antecedent)
    }
}

/// The individual type produced by species `S`.
pub type Individual<S> =
    RuleIndividual<<S as RuleSpecies>::Genotype, <S as RuleSpecies>::Antecedent>;

/// Scores an antecedent as a predictor of one class.
///
/// Must be deterministic for a given antecedent, dataset and class, and
/// return a non-negative value (higher is better).
pub trait Evaluator<A: Antecedent>: Send + Sync {
    /// Fitness of `antecedent` as a rule for `class_label`.
    fn evaluate(&self, antecedent: &A, dataset: &Dataset, class_label: usize) -> f64;
}
