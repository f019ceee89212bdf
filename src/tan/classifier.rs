//! Ordered rule base.
//!
//! Rules are appended class by class while induction runs. Once finalized
//! the rule base is ordered by training precision and frozen; prediction
//! returns the consequent of the first rule that covers an instance.

use crate::dataset::{Dataset, Instance};
use crate::error::{Error, Result};
use crate::rule::{Antecedent, Rule};

/// Ordered list of rules with fixed consequents.
#[derive(Debug, Clone)]
pub struct Classifier<A> {
    rules: Vec<Rule<A>>,
    finalized: bool,
}

impl<A: Antecedent> Default for Classifier<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Antecedent> Classifier<A> {
    /// An empty, open rule base.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            finalized: false,
        }
    }

    /// Appends a rule predicting `consequent`.
    ///
    /// # Errors
    /// [`Error::ClassifierFinalized`] once [`finalize`](Self::finalize) ran.
    pub fn add_rule(&mut self, antecedent: A, consequent: usize) -> Result<()> {
        if self.finalized {
            return Err(Error::ClassifierFinalized);
        }
        self.rules.push(Rule::with_consequent(antecedent, consequent));
        Ok(())
    }

    /// Orders the rules and freezes the rule base.
    ///
    /// Rules are sorted by training precision (correct / covered)
    /// descending, then by number of correctly covered instances
    /// descending. The sort is stable. Calling it again is a no-op.
    pub fn finalize(&mut self, dataset: &Dataset) {
        if self.finalized {
            return;
        }

        let mut keyed: Vec<((f64, usize), Rule<A>)> = self
            .rules
            .drain(..)
            .map(|rule| (precision(&rule, dataset), rule))
            .collect();
        keyed.sort_by(|((pa, ca), _), ((pb, cb), _)| pb.total_cmp(pa).then_with(|| cb.cmp(ca)));
        self.rules = keyed.into_iter().map(|(_, rule)| rule).collect();
        self.finalized = true;

        log::debug!("classifier finalized with {} rules", self.rules.len());
    }

    /// The rules in order.
    pub fn rules(&self) -> &[Rule<A>] {
        &self.rules
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the rule base is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether [`finalize`](Self::finalize) ran.
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Consequent of the first rule covering `instance`.
    pub fn classify(&self, instance: &Instance) -> Option<usize> {
        self.rules
            .iter()
            .find(|rule| rule.covers(instance))
            .and_then(Rule::consequent)
    }

    /// Like [`classify`](Self::classify), falling back to `default`.
    pub fn classify_or(&self, instance: &Instance, default: usize) -> usize {
        self.classify(instance).unwrap_or(default)
    }

    /// Fraction of `dataset` predicted correctly, uncovered instances being
    /// assigned `default`. An empty dataset scores 0.
    pub fn accuracy(&self, dataset: &Dataset, default: usize) -> f64 {
        if dataset.is_empty() {
            return 0.0;
        }
        let hits = dataset
            .instances()
            .iter()
            .filter(|instance| self.classify_or(instance, default) == dataset.class_of(instance))
            .count();
        hits as f64 / dataset.len() as f64
    }
}

/// (correct / covered, correct) of `rule` on `dataset`; a rule covering
/// nothing has precision 0.
fn precision<A: Antecedent>(rule: &Rule<A>, dataset: &Dataset) -> (f64, usize) {
    let mut covered = 0usize;
    let mut correct = 0usize;
    for instance in dataset.instances() {
        if rule.covers(instance) {
            covered += 1;
            if rule.consequent() == Some(dataset.class_of(instance)) {
                correct += 1;
            }
        }
    }
    if covered == 0 {
        (0.0, 0)
    } else {
        (correct as f64 / covered as f64, correct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::toy_dataset;

    /// Covers `x` in `[lo, hi]`.
    #[derive(Debug, Clone, PartialEq)]
    struct Band(f64, f64);

    impl Antecedent for Band {
        fn covers(&self, instance: &Instance) -> bool {
            (self.0..=self.1).contains(&instance.value(0))
        }
    }

    fn dataset() -> Dataset {
        // x:    1    2    3    4    5    6
        // cls:  neg  neg  neg  pos  pos  neg
        toy_dataset(&[
            (1.0, 0.0, 0.0),
            (2.0, 0.0, 0.0),
            (3.0, 0.0, 0.0),
            (4.0, 1.0, 1.0),
            (5.0, 1.0, 1.0),
            (6.0, 1.0, 0.0),
        ])
    }

    #[test]
    fn test_add_rule_keeps_order_until_finalized() {
        let mut clf = Classifier::new();
        clf.add_rule(Band(0.0, 10.0), 0).unwrap();
        clf.add_rule(Band(4.0, 5.0), 1).unwrap();
        assert_eq!(clf.len(), 2);
        assert!(!clf.is_finalized());
        assert_eq!(clf.rules()[0].antecedent(), &Band(0.0, 10.0));
        assert_eq!(clf.rules()[1].consequent(), Some(1));
    }

    #[test]
    fn test_finalize_sorts_by_precision() {
        let ds = dataset();
        let mut clf = Classifier::new();
        clf.add_rule(Band(0.0, 10.0), 0).unwrap(); // 4/6
        clf.add_rule(Band(4.0, 5.0), 1).unwrap(); // 2/2
        clf.add_rule(Band(1.0, 2.0), 0).unwrap(); // 2/2
        clf.add_rule(Band(1.0, 3.0), 0).unwrap(); // 3/3
        clf.finalize(&ds);

        let order: Vec<Band> = clf.rules().iter().map(|r| r.antecedent().clone()).collect();
        assert_eq!(
            order,
            vec![Band(1.0, 3.0), Band(4.0, 5.0), Band(1.0, 2.0), Band(0.0, 10.0)]
        );
        assert!(clf.is_finalized());
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let ds = dataset();
        let mut clf = Classifier::new();
        clf.add_rule(Band(5.0, 6.0), 1).unwrap();
        clf.add_rule(Band(1.0, 3.0), 0).unwrap();
        clf.add_rule(Band(9.0, 10.0), 1).unwrap();
        clf.finalize(&ds);
        let once: Vec<Rule<Band>> = clf.rules().to_vec();
        clf.finalize(&ds);
        assert_eq!(clf.rules(), once.as_slice());
    }

    #[test]
    fn test_add_after_finalize_fails() {
        let mut clf = Classifier::new();
        clf.finalize(&dataset());
        let err = clf.add_rule(Band(0.0, 1.0), 0).unwrap_err();
        assert!(matches!(err, Error::ClassifierFinalized));
        assert!(clf.is_empty());
    }

    #[test]
    fn test_classify_first_match() {
        let ds = dataset();
        let mut clf = Classifier::new();
        clf.add_rule(Band(4.0, 5.0), 1).unwrap();
        clf.add_rule(Band(0.0, 10.0), 0).unwrap();
        clf.finalize(&ds);

        assert_eq!(clf.classify(ds.instance(3)), Some(1));
        assert_eq!(clf.classify(ds.instance(0)), Some(0));
        assert_eq!(clf.classify(&Instance::new(vec![11.0, 0.0, 0.0])), None);
        assert_eq!(clf.classify_or(&Instance::new(vec![11.0, 0.0, 0.0]), 1), 1);
    }

    #[test]
    fn test_accuracy() {
        let ds = dataset();
        let mut clf = Classifier::new();
        clf.add_rule(Band(4.0, 5.0), 1).unwrap();
        clf.finalize(&ds);
        // rows 4 and 5 covered correctly, the rest default to neg; row 6 is neg
        assert!((clf.accuracy(&ds, 0) - 1.0).abs() < 1e-12);
        assert!((clf.accuracy(&ds, 1) - 2.0 / 6.0).abs() < 1e-12);
        assert_eq!(clf.accuracy(&toy_dataset(&[]), 0), 0.0);
    }
}
