//! Evolutionary classification-rule induction with token competition.
//!
//! Learns an ordered, human-readable rule base from a labelled dataset.
//! Each class gets its own evolutionary run; token competition rescales
//! fitness by the share of class instances a rule covers that no better
//! rule already covers, so every class ends up with a few complementary
//! rules instead of many copies of the best one.
//!
//! - [`dataset`]: attributes, instances and the KEEL `.dat` loader
//! - [`rule`]: rules, individuals and the species / evaluator traits, with a
//!   conjunctive species and the Tan sensitivity × specificity fitness
//! - [`tan`]: configuration, selection, variation, token competition, the
//!   per-class runner and the classifier
//!
//! # Example
//!
//! ```
//! use u_ruleinduct::dataset::{keel, IntervalPolicy};
//! use u_ruleinduct::tan::{induce, TanConfig};
//!
//! let source = "\
//! @relation toy
//! @attribute x real [0.0, 10.0]
//! @attribute class {low, high}
//! @inputs x
//! @outputs class
//! @data
//! 1.0, low
//! 2.0, low
//! 8.0, high
//! 9.0, high
//! ";
//! let dataset = keel::parse_str(source, IntervalPolicy::Reject).unwrap();
//! let config = TanConfig::default()
//!     .with_population_size(20)
//!     .with_max_generations(5)
//!     .with_seed(1);
//! let result = induce(&dataset, &config).unwrap();
//! assert_eq!(result.executions, 2);
//! assert!(result.classifier.is_finalized());
//! ```

pub mod dataset;
pub mod error;
pub mod rule;
pub mod tan;

pub use error::{ConfigurationError, DatasetFormatError, Error, Result};
