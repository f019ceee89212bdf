//! Attribute declarations and token encoding.

use serde::{Deserialize, Serialize};

/// The three attribute kinds a dataset can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    /// Finite, ordered set of string categories.
    Categorical,
    /// Integer values inside a closed interval.
    Integer,
    /// Real values inside a closed interval.
    Numerical,
}

/// What to do with an integer/real value outside its declared interval.
///
/// KEEL files occasionally contain such values; the loader refuses
/// them unless told otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntervalPolicy {
    /// Fail with a format error.
    #[default]
    Reject,
    /// Clamp the value into the interval.
    Clamp,
    /// Keep the value as written.
    Accept,
}

/// A single attribute declaration.
///
/// Values of every kind are encoded as `f64`: categories by their index in
/// the declared domain, integers and reals by their numeric value.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    /// Categorical attribute with its declared domain.
    Categorical {
        /// Attribute name.
        name: String,
        /// Domain, in declaration order.
        categories: Vec<String>,
    },
    /// Integer attribute over `[lo, hi]`.
    Integer {
        /// Attribute name.
        name: String,
        /// Lower bound (inclusive).
        lo: i64,
        /// Upper bound (inclusive).
        hi: i64,
    },
    /// Real attribute over `[lo, hi]`.
    Numerical {
        /// Attribute name.
        name: String,
        /// Lower bound (inclusive).
        lo: f64,
        /// Upper bound (inclusive).
        hi: f64,
    },
}

impl Attribute {
    /// Creates a categorical attribute.
    pub fn categorical<S: Into<String>>(name: impl Into<String>, categories: impl IntoIterator<Item = S>) -> Self {
        Attribute::Categorical {
            name: name.into(),
            categories: categories.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates an integer attribute.
    pub fn integer(name: impl Into<String>, lo: i64, hi: i64) -> Self {
        Attribute::Integer {
            name: name.into(),
            lo,
            hi,
        }
    }

    /// Creates a real-valued attribute.
    pub fn numerical(name: impl Into<String>, lo: f64, hi: f64) -> Self {
        Attribute::Numerical {
            name: name.into(),
            lo,
            hi,
        }
    }

    /// Attribute name.
    pub fn name(&self) -> &str {
        match self {
            Attribute::Categorical { name, .. }
            | Attribute::Integer { name, .. }
            | Attribute::Numerical { name, .. } => name,
        }
    }

    /// Attribute kind.
    pub fn kind(&self) -> AttributeType {
        match self {
            Attribute::Categorical { .. } => AttributeType::Categorical,
            Attribute::Integer { .. } => AttributeType::Integer,
            Attribute::Numerical { .. } => AttributeType::Numerical,
        }
    }

    /// Number of categories for a categorical attribute.
    pub fn cardinality(&self) -> Option<usize> {
        match self {
            Attribute::Categorical { categories, .. } => Some(categories.len()),
            _ => None,
        }
    }

    /// Declared numeric bounds; categorical attributes span `[0, n - 1]`.
    pub fn bounds(&self) -> (f64, f64) {
        match self {
            Attribute::Categorical { categories, .. } => {
                (0.0, categories.len().saturating_sub(1) as f64)
            }
            Attribute::Integer { lo, hi, .. } => (*lo as f64, *hi as f64),
            Attribute::Numerical { lo, hi, .. } => (*lo, *hi),
        }
    }

    /// Category label for an encoded value.
    pub fn category(&self, value: f64) -> Option<&str> {
        match self {
            Attribute::Categorical { categories, .. } if value >= 0.0 => {
                categories.get(value as usize).map(String::as_str)
            }
            _ => None,
        }
    }

    /// Encodes a raw token.
    ///
    /// Returns a description of the problem when the token is not in the
    /// categorical domain, is not a number, or falls outside the declared
    /// interval under [`IntervalPolicy::Reject`].
    pub fn parse(&self, token: &str, policy: IntervalPolicy) -> Result<f64, String> {
        let token = token.trim();
        match self {
            Attribute::Categorical { name, categories } => categories
                .iter()
                .position(|c| c == token)
                .map(|i| i as f64)
                .ok_or_else(|| format!("`{token}` is not in the domain of `{name}`")),
            Attribute::Integer { name, lo, hi } => {
                let value: i64 = token
                    .parse()
                    .map_err(|_| format!("`{token}` is not an integer (attribute `{name}`)"))?;
                let value = match policy {
                    _ if (*lo..=*hi).contains(&value) => value,
                    IntervalPolicy::Reject => {
                        return Err(format!("{value} is outside [{lo}, {hi}] for `{name}`"))
                    }
                    IntervalPolicy::Clamp => value.clamp(*lo, *hi),
                    IntervalPolicy::Accept => value,
                };
                Ok(value as f64)
            }
            Attribute::Numerical { name, lo, hi } => {
                let value: f64 = token
                    .parse()
                    .map_err(|_| format!("`{token}` is not a number (attribute `{name}`)"))?;
                if !value.is_finite() {
                    return Err(format!("`{token}` is not finite (attribute `{name}`)"));
                }
                let value = match policy {
                    _ if value >= *lo && value <= *hi => value,
                    IntervalPolicy::Reject => {
                        return Err(format!("{value} is outside [{lo}, {hi}] for `{name}`"))
                    }
                    IntervalPolicy::Clamp => value.clamp(*lo, *hi),
                    IntervalPolicy::Accept => value,
                };
                Ok(value)
            }
        }
    }
}
