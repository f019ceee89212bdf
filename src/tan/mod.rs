//! Token-competition rule induction.
//!
//! One evolutionary run per class: a population of rule individuals is
//! evolved against the class, token competition keeps a small elite of
//! rules covering complementary parts of it, and the elites of all classes
//! are assembled into one ordered rule base.
//!
//! # Key Types
//!
//! - [`TanConfig`]: Algorithm parameters, validation and TOML loading
//! - [`TanRunner`]: Runs induction to completion
//! - [`Induction`]: The per-class state machine, one generation per step
//! - [`TokenCompetition`]: Coverage-based fitness sharing and elite admission
//! - [`Classifier`]: The ordered rule base
//!
//! # References
//!
//! - Tan, Tay, Lee & Heng (2002), "Mining multiple comprehensible
//!   classification rules using genetic programming"
//! - Wong & Leung (2000), *Data Mining Using Grammar Based Genetic
//!   Programming and Applications*

mod classifier;
mod config;
mod runner;
mod selection;
mod token;
mod variation;

pub use classifier::Classifier;
pub use config::TanConfig;
pub use runner::{induce, ClassStats, Induction, Phase, RunState, TanResult, TanRunner};
pub use selection::{best_indices, Selection};
pub use token::TokenCompetition;
pub use variation::Variation;
