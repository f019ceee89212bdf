//! Rules, individuals and the collaborator traits.
//!
//! # Core Traits
//!
//! - [`Antecedent`]: the predicate of a rule (`covers`)
//! - [`RuleSpecies`]: genotype creation, decoding, recombination, mutation
//! - [`Evaluator`]: deterministic fitness of an antecedent for a class
//!
//! # Provided Implementations
//!
//! - [`ConjunctionSpecies`]: conjunctions of attribute tests
//! - [`TanEvaluator`]: sensitivity × specificity fitness weighted by `w1`, `w2`

mod conjunction;
mod evaluator;
mod types;

pub use conjunction::{Condition, Conjunction, ConjunctionSpecies, Test};
pub use evaluator::{Confusion, TanEvaluator};
pub use types::{Antecedent, Evaluator, Individual, Rule, RuleIndividual, RuleSpecies};
