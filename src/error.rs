//! Error types.
//!
//! Dataset and configuration problems fail fast with their own error types;
//! [`Error`] is the crate-level union returned by the runner.

use thiserror::Error;

/// A structural problem in a dataset source.
///
/// `line` is 1-based; `0` means the problem is not tied to a line
/// (e.g. the input ended before the `@data` marker).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("dataset format error at line {line}: {message}")]
pub struct DatasetFormatError {
    /// 1-based source line.
    pub line: usize,
    /// What went wrong.
    pub message: String,
}

impl DatasetFormatError {
    pub(crate) fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// An invalid or unreadable algorithm configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// An operator identifier that is not registered.
    #[error("unknown operator `{id}` for `{key}`")]
    UnknownOperator {
        /// Configuration key holding the identifier.
        key: &'static str,
        /// The unregistered identifier.
        id: String,
    },

    /// A value outside its admissible range.
    #[error("invalid value for `{key}`: {reason}")]
    InvalidValue {
        /// Offending configuration key.
        key: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The configuration document could not be parsed.
    #[error("configuration parse error: {0}")]
    Parse(String),

    /// The configuration file could not be read.
    #[error("configuration io error: {0}")]
    Io(String),
}

impl ConfigurationError {
    pub(crate) fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key,
            reason: reason.into(),
        }
    }
}

/// Root error type for rule induction.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed dataset.
    #[error(transparent)]
    Dataset(#[from] DatasetFormatError),

    /// Invalid configuration.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The dataset has no instances or no classes to learn.
    #[error("dataset is empty: {0}")]
    EmptyDataset(String),

    /// Rules were added to a classifier after it was finalized.
    #[error("classifier is finalized; no more rules can be added")]
    ClassifierFinalized,

    /// Reading a dataset from disk failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
