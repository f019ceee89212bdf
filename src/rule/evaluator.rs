//! Sensitivity × specificity fitness.
//!
//! For a rule targeting class `c`, with `tp`/`fn` the covered/uncovered
//! instances of `c` and `fp`/`tn` the covered/uncovered instances of other
//! classes:
//!
//! ```text
//! se = tp / (tp + w1 * fn)
//! sp = tn / (tn + w2 * fp)
//! fitness = se * sp
//! ```
//!
//! `w1` scales the cost of missed positives and `w2` the cost of false
//! alarms. The result lies in `[0, 1]`.

use super::types::{Antecedent, Evaluator};
use crate::dataset::Dataset;

/// Coverage counts of a rule against one target class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Confusion {
    /// Covered instances of the target class.
    pub tp: usize,
    /// Covered instances of other classes.
    pub fp: usize,
    /// Uncovered instances of other classes.
    pub tn: usize,
    /// Uncovered instances of the target class.
    pub fn_: usize,
}

impl Confusion {
    /// Counts coverage of `antecedent` over the whole dataset.
    pub fn of<A: Antecedent>(antecedent: &A, dataset: &Dataset, class_label: usize) -> Self {
        let mut counts = Confusion::default();
        for instance in dataset.instances() {
            let positive = dataset.class_of(instance) == class_label;
            match (antecedent.covers(instance), positive) {
                (true, true) => counts.tp += 1,
                (true, false) => counts.fp += 1,
                (false, false) => counts.tn += 1,
                (false, true) => counts.fn_ += 1,
            }
        }
        counts
    }

    /// Number of covered instances.
    pub fn covered(&self) -> usize {
        self.tp + self.fp
    }
}

/// Tan et al. fitness with configurable weights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TanEvaluator {
    /// Weight of false negatives in the sensitivity term.
    pub w1: f64,
    /// Weight of false positives in the specificity term.
    pub w2: f64,
}

impl Default for TanEvaluator {
    fn default() -> Self {
        Self { w1: 0.7, w2: 0.8 }
    }
}

impl TanEvaluator {
    /// Creates an evaluator with the given weights.
    pub fn new(w1: f64, w2: f64) -> Self {
        Self { w1, w2 }
    }

    /// Fitness from precomputed counts.
    pub fn score(&self, counts: &Confusion) -> f64 {
        let ratio = |good: usize, bad: usize, weight: f64| {
            let denominator = good as f64 + weight * bad as f64;
            if denominator > 0.0 {
                good as f64 / denominator
            } else {
                1.0
            }
        };
        let sensitivity = ratio(counts.tp, counts.fn_, self.w1);
        let specificity = ratio(counts.tn, counts.fp, self.w2);
        sensitivity * specificity
    }
}

impl<A: Antecedent> Evaluator<A> for TanEvaluator {
    fn evaluate(&self, antecedent: &A, dataset: &Dataset, class_label: usize) -> f64 {
        self.score(&Confusion::of(antecedent, dataset, class_label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{toy_dataset, Instance};

    #[derive(Debug, Clone)]
    struct Below(f64);

    impl Antecedent for Below {
        fn covers(&self, instance: &Instance) -> bool {
            instance.value(0) < self.0
        }
    }

    fn dataset() -> Dataset {
        toy_dataset(&[(1.0, 0.0, 0.0), (2.0, 0.0, 0.0), (6.0, 0.0, 1.0), (7.0, 0.0, 1.0)])
    }

    #[test]
    fn test_confusion_counts() {
        let ds = dataset();
        let counts = Confusion::of(&Below(6.5), &ds, 0);
        assert_eq!(counts, Confusion { tp: 2, fp: 1, tn: 1, fn_: 0 });
        assert_eq!(counts.covered(), 3);
    }

    #[test]
    fn test_perfect_rule_scores_one() {
        let ds = dataset();
        let fitness = TanEvaluator::default().evaluate(&Below(4.0), &ds, 0);
        assert!((fitness - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_weights_apply() {
        let ds = dataset();
        let eval = TanEvaluator::new(0.5, 2.0);
        // tp=2 fp=1 tn=1 fn=0 -> se = 1, sp = 1 / (1 + 2) = 1/3
        let fitness = eval.evaluate(&Below(6.5), &ds, 0);
        assert!((fitness - 1.0 / 3.0).abs() < 1e-12);
        // tp=1 fn=1 tn=2 fp=0 -> se = 1 / 1.5, sp = 1
        let fitness = eval.evaluate(&Below(1.5), &ds, 0);
        assert!((fitness - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_rule_scores_zero() {
        let ds = dataset();
        let fitness = TanEvaluator::default().evaluate(&Below(0.0), &ds, 0);
        assert_eq!(fitness, 0.0);
    }
}
