//! Read-only training data.
//!
//! A [`Dataset`] is an ordered list of encoded [`Instance`]s sharing one
//! [`Metadata`]. It is built once (usually by the [`keel`] loader) and only
//! read afterwards, so coverage scans can share it freely across threads.

mod attribute;
pub mod keel;
mod types;

pub use attribute::{Attribute, AttributeType, IntervalPolicy};
pub use types::{Dataset, Instance, Metadata};

#[cfg(test)]
pub(crate) use types::tests::toy_dataset;
