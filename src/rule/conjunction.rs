//! Conjunctive attribute-test rules.
//!
//! A ready-made [`RuleSpecies`] whose genotype is a list of attribute tests
//! joined by AND:
//!
//! - categorical attributes: `attr = v` or `attr != v`
//! - integer/real attributes: `attr <= t` or `attr > t`
//!
//! The number of conditions is bounded by the configured maximum derivation
//! size. Recombination is one-point crossover on the condition lists;
//! mutation replaces, inserts or removes a single condition.

use super::types::{Antecedent, RuleSpecies};
use crate::dataset::{Attribute, Instance, Metadata};
use rand::Rng;

/// A single attribute test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Test {
    /// Value equals the encoded category.
    Equal(f64),
    /// Value differs from the encoded category.
    NotEqual(f64),
    /// Value is at most the threshold.
    LessOrEqual(f64),
    /// Value exceeds the threshold.
    Greater(f64),
}

/// A test applied to one attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Condition {
    /// Attribute index in the metadata.
    pub attribute: usize,
    /// Test on that attribute's encoded value.
    pub test: Test,
}

impl Condition {
    /// Whether `instance` satisfies the condition.
    pub fn holds(&self, instance: &Instance) -> bool {
        let value = instance.value(self.attribute);
        match self.test {
            Test::Equal(v) => value == v,
            Test::NotEqual(v) => value != v,
            Test::LessOrEqual(t) => value <= t,
            Test::Greater(t) => value > t,
        }
    }
}

/// Conjunction of conditions. The empty conjunction covers everything.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Conjunction {
    conditions: Vec<Condition>,
}

impl Conjunction {
    /// Builds a conjunction from its conditions.
    pub fn new(conditions: Vec<Condition>) -> Self {
        Self { conditions }
    }

    /// The conditions, in order.
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Human-readable form, e.g. `width <= 2.5 AND color = red`.
    pub fn describe(&self, metadata: &Metadata) -> String {
        if self.conditions.is_empty() {
            return "TRUE".to_string();
        }
        let mut out = String::new();
        for (i, condition) in self.conditions.iter().enumerate() {
            if i > 0 {
                out.push_str(" AND ");
            }
            let attribute = metadata.attribute(condition.attribute);
            let name = attribute.map_or("?", Attribute::name);
            let category = |v: f64| {
                attribute
                    .and_then(|a| a.category(v))
                    .map_or_else(|| v.to_string(), str::to_string)
            };
            let term = match condition.test {
                Test::Equal(v) => format!("{name} = {}", category(v)),
                Test::NotEqual(v) => format!("{name} != {}", category(v)),
                Test::LessOrEqual(t) => format!("{name} <= {t}"),
                Test::Greater(t) => format!("{name} > {t}"),
            };
            out.push_str(&term);
        }
        out
    }
}

impl Antecedent for Conjunction {
    fn covers(&self, instance: &Instance) -> bool {
        self.conditions.iter().all(|c| c.holds(instance))
    }

    fn size(&self) -> usize {
        self.conditions.len()
    }
}

/// Species producing [`Conjunction`] genotypes for a given schema.
#[derive(Debug, Clone)]
pub struct ConjunctionSpecies {
    metadata: Metadata,
    inputs: Vec<usize>,
    max_conditions: usize,
}

impl ConjunctionSpecies {
    /// Creates a species over the input attributes of `metadata`, with at
    /// most `max_deriv_size` conditions per rule (minimum 1).
    pub fn new(metadata: &Metadata, max_deriv_size: usize) -> Self {
        Self {
            metadata: metadata.clone(),
            inputs: metadata.input_indices().collect(),
            max_conditions: max_deriv_size.max(1),
        }
    }

    /// Maximum number of conditions per rule.
    pub fn max_conditions(&self) -> usize {
        self.max_conditions
    }

    fn random_condition<R: Rng>(&self, rng: &mut R) -> Option<Condition> {
        if self.inputs.is_empty() {
            return None;
        }
        let attribute = self.inputs[rng.random_range(0..self.inputs.len())];
        let test = match &self.metadata.attributes()[attribute] {
            Attribute::Categorical { categories, .. } => {
                let v = rng.random_range(0..categories.len().max(1)) as f64;
                if rng.random_bool(0.5) {
                    Test::Equal(v)
                } else {
                    Test::NotEqual(v)
                }
            }
            Attribute::Integer { lo, hi, .. } => {
                let t = rng.random_range(*lo..=(*hi).max(*lo)) as f64;
                threshold_test(t, rng)
            }
            Attribute::Numerical { lo, hi, .. } => {
                let t = if hi > lo { rng.random_range(*lo..*hi) } else { *lo };
                threshold_test(t, rng)
            }
        };
        Some(Condition { attribute, test })
    }
}

fn threshold_test<R: Rng>(t: f64, rng: &mut R) -> Test {
    if rng.random_bool(0.5) {
        Test::LessOrEqual(t)
    } else {
        Test::Greater(t)
    }
}

impl RuleSpecies for ConjunctionSpecies {
    type Genotype = Conjunction;
    type Antecedent = Conjunction;

    fn create<R: Rng>(&self, rng: &mut R) -> Conjunction {
        let n = rng.random_range(1..=self.max_conditions);
        Conjunction::new((0..n).filter_map(|_| self.random_condition(rng)).collect())
    }

    fn decode(&self, genotype: &Conjunction) -> Conjunction {
        genotype.clone()
    }

    fn recombine<R: Rng>(
        &self,
        parent1: &Conjunction,
        parent2: &Conjunction,
        rng: &mut R,
    ) -> (Conjunction, Conjunction) {
        let (a, b) = (&parent1.conditions, &parent2.conditions);
        let i = rng.random_range(0..=a.len());
        let j = rng.random_range(0..=b.len());

        let mut child1: Vec<Condition> = a[..i].iter().chain(&b[j..]).copied().collect();
        let mut child2: Vec<Condition> = b[..j].iter().chain(&a[i..]).copied().collect();
        child1.truncate(self.max_conditions);
        child2.truncate(self.max_conditions);
        (Conjunction::new(child1), Conjunction::new(child2))
    }

    fn mutate<R: Rng>(&self, genotype: &Conjunction, rng: &mut R) -> Conjunction {
        let mut conditions = genotype.conditions.clone();
        let Some(fresh) = self.random_condition(rng) else {
            return genotype.clone();
        };
        match rng.random_range(0..3) {
            1 if conditions.len() < self.max_conditions => {
                let at = rng.random_range(0..=conditions.len());
                conditions.insert(at, fresh);
            }
            2 if conditions.len() > 1 => {
                let at = rng.random_range(0..conditions.len());
                conditions.remove(at);
            }
            _ if conditions.is_empty() => conditions.push(fresh),
            _ => {
                let at = rng.random_range(0..conditions.len());
                conditions[at] = fresh;
            }
        }
        Conjunction::new(conditions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::toy_dataset;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn species(max: usize) -> ConjunctionSpecies {
        ConjunctionSpecies::new(toy_dataset(&[]).metadata(), max)
    }

    #[test]
    fn test_conditions_and_cover() {
        let rule = Conjunction::new(vec![
            Condition { attribute: 0, test: Test::LessOrEqual(3.0) },
            Condition { attribute: 1, test: Test::Equal(1.0) },
        ]);
        assert!(rule.covers(&Instance::new(vec![2.0, 1.0, 0.0])));
        assert!(!rule.covers(&Instance::new(vec![4.0, 1.0, 0.0])));
        assert!(!rule.covers(&Instance::new(vec![2.0, 0.0, 0.0])));
        assert!(Conjunction::default().covers(&Instance::new(vec![9.0, 0.0, 1.0])));
        assert_eq!(rule.size(), 2);
    }

    #[test]
    fn test_describe() {
        let meta = toy_dataset(&[]).metadata().clone();
        let rule = Conjunction::new(vec![
            Condition { attribute: 0, test: Test::Greater(2.5) },
            Condition { attribute: 1, test: Test::NotEqual(0.0) },
        ]);
        assert_eq!(rule.describe(&meta), "x > 2.5 AND kind != a");
        assert_eq!(Conjunction::default().describe(&meta), "TRUE");
    }

    #[test]
    fn test_create_respects_bounds() {
        let sp = species(3);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let g = sp.create(&mut rng);
            assert!((1..=3).contains(&g.size()));
            assert!(g.conditions().iter().all(|c| c.attribute != 2));
        }
    }

    #[test]
    fn test_recombine_and_mutate_respect_bounds() {
        let sp = species(4);
        let mut rng = StdRng::seed_from_u64(11);
        let mut a = sp.create(&mut rng);
        let mut b = sp.create(&mut rng);
        for _ in 0..300 {
            let (c1, c2) = sp.recombine(&a, &b, &mut rng);
            assert!(c1.size() <= 4 && c2.size() <= 4);
            a = sp.mutate(&c1, &mut rng);
            b = sp.mutate(&c2, &mut rng);
            assert!(a.size() <= 4 && b.size() <= 4);
        }
    }

    #[test]
    fn test_recombine_preserves_material() {
        let small = species(3);
        let roomy = species(10);
        let mut rng = StdRng::seed_from_u64(3);
        let a = small.create(&mut rng);
        let b = small.create(&mut rng);
        let (c1, c2) = roomy.recombine(&a, &b, &mut rng);
        assert_eq!(c1.size() + c2.size(), a.size() + b.size());
    }

    #[test]
    fn test_individual_is_unevaluated() {
        let sp = species(2);
        let mut rng = StdRng::seed_from_u64(1);
        let ind = sp.individual(sp.create(&mut rng));
        assert!(!ind.is_evaluated());
        assert_eq!(ind.rule().consequent(), None);
        assert_eq!(ind.genotype(), ind.rule().antecedent());
    }
}
