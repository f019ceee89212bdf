//! Per-class generational control.
//!
//! [`Induction`] drives the loop as an explicit state machine. One
//! [`step`](Induction::step) runs a full generation for the class in
//! progress:
//!
//! select → generate → update → control
//!
//! `control` closes a class once its generation budget is spent: the elite
//! rules join the classifier with the class as consequent, the counters
//! advance, and either the next class starts from a fresh population or the
//! classifier is finalized and the run is [`Phase::Finished`].
//!
//! [`TanRunner`] wraps the state machine into a single call.

use super::classifier::Classifier;
use super::config::TanConfig;
use super::selection::{best_indices, Selection};
use super::token::TokenCompetition;
use super::variation::Variation;
use crate::dataset::{Dataset, Instance};
use crate::error::{Error, Result};
use crate::rule::{Antecedent, Conjunction, Evaluator, Individual, RuleSpecies};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Where the run stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Evolving rules for the given class label.
    RunningClass(usize),
    /// Every class has been processed; the classifier is final.
    Finished,
}

/// Counters and working populations threaded through the transitions.
#[derive(Debug, Clone)]
pub struct RunState<I> {
    /// Current phase.
    pub phase: Phase,
    /// Number of classes already completed.
    pub execution: usize,
    /// Generations completed for the class in progress.
    pub generation: usize,
    /// Current population.
    pub bset: Vec<I>,
    /// Elite rules of the class in progress.
    pub eset: Vec<I>,
}

/// Candidate set under construction and the selected parents.
#[derive(Debug)]
struct Generation<I> {
    cset: Vec<I>,
    pset: Vec<I>,
}

/// Statistics collected for one class.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassStats {
    /// The class label.
    pub class_label: usize,
    /// Generations evolved.
    pub generations: usize,
    /// Best fitness in the population at the end of each generation.
    pub best_fitness_history: Vec<f64>,
    /// Rules the class contributed to the classifier.
    pub rules_added: usize,
    /// Total size (e.g. number of conditions) of the contributed rules.
    pub rules_size: usize,
}

impl ClassStats {
    fn new(class_label: usize) -> Self {
        Self {
            class_label,
            generations: 0,
            best_fitness_history: Vec::new(),
            rules_added: 0,
            rules_size: 0,
        }
    }
}

/// Result of a rule-induction run.
#[derive(Debug, Clone)]
pub struct TanResult<A> {
    /// The finalized rule base.
    pub classifier: Classifier<A>,
    /// Per-class statistics, in class order.
    pub class_stats: Vec<ClassStats>,
    /// Number of classes processed.
    pub executions: usize,
    /// Majority class of the training data, used for instances no rule
    /// covers.
    pub default_class: Option<usize>,
}

impl<A: Antecedent> TanResult<A> {
    /// Class of `instance`: the first covering rule, else the default class.
    pub fn predict(&self, instance: &Instance) -> Option<usize> {
        self.classifier.classify(instance).or(self.default_class)
    }
}

/// Step-wise rule induction over one dataset.
///
/// # Usage
///
/// ```ignore
/// let mut induction = Induction::new(&species, &evaluator, &dataset, &config)?;
/// let mut state = induction.initialize(&mut rng);
/// while state.phase != Phase::Finished {
///     state = induction.step(state, &mut rng)?;
/// }
/// let result = induction.finish(state);
/// ```
pub struct Induction<'a, S: RuleSpecies, E> {
    species: &'a S,
    evaluator: &'a E,
    dataset: &'a Dataset,
    population_size: usize,
    max_generations: usize,
    elitist_count: usize,
    selection: Selection,
    variation: Variation,
    token: TokenCompetition,
    classifier: Classifier<S::Antecedent>,
    stats: Vec<ClassStats>,
}

impl<'a, S, E> Induction<'a, S, E>
where
    S: RuleSpecies,
    E: Evaluator<S::Antecedent>,
{
    /// Prepares a run.
    ///
    /// # Errors
    /// - [`Error::Configuration`] if `config` does not validate
    /// - [`Error::EmptyDataset`] if `dataset` has no instances
    pub fn new(species: &'a S, evaluator: &'a E, dataset: &'a Dataset, config: &TanConfig) -> Result<Self> {
        config.validate()?;
        if dataset.is_empty() {
            return Err(Error::EmptyDataset("dataset has no instances".into()));
        }

        Ok(Self {
            species,
            evaluator,
            dataset,
            population_size: config.population_size,
            max_generations: config.max_generations,
            elitist_count: config.elitist_count(),
            selection: Selection::from_config(config)?,
            variation: Variation::new(config),
            token: TokenCompetition::from_config(config),
            classifier: Classifier::new(),
            stats: Vec::with_capacity(dataset.number_of_classes()),
        })
    }

    /// Starting state: the first class with a fresh population.
    pub fn initialize<R: Rng>(&mut self, rng: &mut R) -> RunState<Individual<S>> {
        RunState {
            phase: Phase::RunningClass(0),
            execution: 0,
            generation: 0,
            bset: self.start_class(0, rng),
            eset: Vec::new(),
        }
    }

    /// Runs one generation. A finished state is returned unchanged.
    pub fn step<R: Rng>(
        &mut self,
        state: RunState<Individual<S>>,
        rng: &mut R,
    ) -> Result<RunState<Individual<S>>> {
        let Phase::RunningClass(class_label) = state.phase else {
            return Ok(state);
        };

        let generation = self.select(&state, rng);
        let cset = self.generate(&state, generation, class_label, rng);
        let state = self.update(state, cset, class_label);
        self.control(state, rng)
    }

    /// The rule base built so far.
    pub fn classifier(&self) -> &Classifier<S::Antecedent> {
        &self.classifier
    }

    /// Statistics of the classes started so far.
    pub fn class_stats(&self) -> &[ClassStats] {
        &self.stats
    }

    /// Consumes the engine into the run result.
    pub fn finish(self, state: RunState<Individual<S>>) -> TanResult<S::Antecedent> {
        TanResult {
            classifier: self.classifier,
            class_stats: self.stats,
            executions: state.execution,
            default_class: self.dataset.majority_class(),
        }
    }

    /// Fresh evaluated population for `class_label`.
    fn start_class<R: Rng>(&mut self, class_label: usize, rng: &mut R) -> Vec<Individual<S>> {
        log::info!(
            "inducing rules for class {class_label} ({}) from {} instances",
            self.dataset
                .metadata()
                .class_attribute()
                .category(class_label as f64)
                .unwrap_or("?"),
            self.dataset.class_instances(class_label).len()
        );
        self.stats.push(ClassStats::new(class_label));

        let mut bset: Vec<Individual<S>> = (0..self.population_size)
            .map(|_| self.species.individual(self.species.create(rng)))
            .collect();
        self.variation
            .evaluate::<S, E>(self.evaluator, &mut bset, self.dataset, class_label);
        bset
    }

    /// Elitists go straight into the candidate set; the rest of the
    /// population feeds the parent selector, which returns as many parents.
    fn select<R: Rng>(&self, state: &RunState<Individual<S>>, rng: &mut R) -> Generation<Individual<S>> {
        let fitness: Vec<f64> = state.bset.iter().map(|i| i.fitness()).collect();
        let order = best_indices(&fitness);
        let (elitists, rest) = order.split_at(self.elitist_count.min(order.len()));

        let cset = elitists.iter().map(|&i| state.bset[i].clone()).collect();

        let rest_fitness: Vec<f64> = rest.iter().map(|&i| fitness[i]).collect();
        let pset = self
            .selection
            .select_many(&rest_fitness, rest.len(), rng)
            .into_iter()
            .map(|j| state.bset[rest[j]].clone())
            .collect();

        Generation { cset, pset }
    }

    /// Offspring plus reproduced copies of the current population are added
    /// to the candidate set.
    fn generate<R: Rng>(
        &self,
        state: &RunState<Individual<S>>,
        generation: Generation<Individual<S>>,
        class_label: usize,
        rng: &mut R,
    ) -> Vec<Individual<S>> {
        let Generation { mut cset, pset } = generation;
        let mset = self.variation.vary(
            self.species,
            self.evaluator,
            pset,
            self.dataset,
            class_label,
            rng,
        );
        cset.extend(self.variation.reproduce::<S, _>(&state.bset, rng));
        cset.extend(mset);
        cset
    }

    /// Token competition refreshes the elite, then the best candidates
    /// replace the population.
    fn update(
        &mut self,
        mut state: RunState<Individual<S>>,
        mut cset: Vec<Individual<S>>,
        class_label: usize,
    ) -> RunState<Individual<S>> {
        let elite = std::mem::take(&mut state.eset);
        state.eset = self.token.compete(&mut cset, elite, class_label, self.dataset);

        if cset.len() < self.population_size {
            log::warn!(
                "class {class_label} generation {}: only {} candidates for a population of {}",
                state.generation,
                cset.len(),
                self.population_size
            );
        }

        let fitness: Vec<f64> = cset.iter().map(|i| i.fitness()).collect();
        let order = best_indices(&fitness);
        let best = order.first().map_or(0.0, |&i| fitness[i]);
        let mut slots: Vec<Option<Individual<S>>> = cset.into_iter().map(Some).collect();
        state.bset = order
            .into_iter()
            .take(self.population_size)
            .filter_map(|i| slots[i].take())
            .collect();
        state.generation += 1;

        if let Some(stats) = self.stats.last_mut() {
            stats.generations = state.generation;
            stats.best_fitness_history.push(best);
        }
        log::debug!(
            "class {class_label} generation {}: best={best:.4} elite={}",
            state.generation,
            state.eset.len()
        );

        state
    }

    /// Closes the class once its generation budget is spent.
    fn control<R: Rng>(
        &mut self,
        mut state: RunState<Individual<S>>,
        rng: &mut R,
    ) -> Result<RunState<Individual<S>>> {
        let Phase::RunningClass(class_label) = state.phase else {
            return Ok(state);
        };
        if state.generation < self.max_generations {
            return Ok(state);
        }

        for individual in &mut state.bset {
            individual.rule_mut().set_consequent(class_label);
        }
        let added = state.eset.len();
        let mut size = 0;
        for individual in state.eset.drain(..) {
            let antecedent = individual.into_rule().into_antecedent();
            size += antecedent.size();
            self.classifier.add_rule(antecedent, class_label)?;
        }
        if let Some(stats) = self.stats.last_mut() {
            stats.rules_added = added;
            stats.rules_size = size;
        }
        log::info!("class {class_label} finished with {added} rules of total size {size}");

        state.execution += 1;
        state.generation = 0;

        if state.execution >= self.dataset.number_of_classes() {
            self.classifier.finalize(self.dataset);
            state.phase = Phase::Finished;
            log::info!("induction finished: {} rules", self.classifier.len());
        } else {
            state.phase = Phase::RunningClass(state.execution);
            state.bset = self.start_class(state.execution, rng);
        }

        Ok(state)
    }
}

/// Runs token-competition rule induction to completion.
///
/// # Usage
///
/// ```ignore
/// let config = TanConfig::default().with_seed(42);
/// let species = config.species(dataset.metadata());
/// let result = TanRunner::run(&species, &config.evaluator(), &dataset, &config)?;
/// println!("{} rules", result.classifier.len());
/// ```
pub struct TanRunner;

impl TanRunner {
    /// Runs with an RNG built from `config.seed`, or from the operating
    /// system when no seed is set.
    pub fn run<S, E>(
        species: &S,
        evaluator: &E,
        dataset: &Dataset,
        config: &TanConfig,
    ) -> Result<TanResult<S::Antecedent>>
    where
        S: RuleSpecies,
        E: Evaluator<S::Antecedent>,
    {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::run_with_rng(species, evaluator, dataset, config, &mut rng)
    }

    /// Runs with a caller-supplied RNG.
    pub fn run_with_rng<S, E, R>(
        species: &S,
        evaluator: &E,
        dataset: &Dataset,
        config: &TanConfig,
        rng: &mut R,
    ) -> Result<TanResult<S::Antecedent>>
    where
        S: RuleSpecies,
        E: Evaluator<S::Antecedent>,
        R: Rng,
    {
        let mut induction = Induction::new(species, evaluator, dataset, config)?;
        let mut state = induction.initialize(rng);
        while state.phase != Phase::Finished {
            state = induction.step(state, rng)?;
        }
        Ok(induction.finish(state))
    }
}

/// Induces conjunctive rules with the Tan fitness, both derived from
/// `config`.
pub fn induce(dataset: &Dataset, config: &TanConfig) -> Result<TanResult<Conjunction>> {
    let species = config.species(dataset.metadata());
    TanRunner::run(&species, &config.evaluator(), dataset, config)
}
