//! # Rusty-id3
//!
//! `rusty-id3` grows decision trees over categorical data with the ID3
//! algorithm: nodes are split on the attribute of highest information gain
//! until their records agree on a label or no attribute is informative
//! anymore. It also ships a categorical naive Bayes baseline, CSV loading and
//! classification metrics.
//!
//! ## Example Usage
//!
//! ```rust
//! use rusty_id3::data::dataset::Dataset;
//! use rusty_id3::trees::classifier::Id3Classifier;
//!
//! let rows = [
//!     ["A", "X", "yes"],
//!     ["A", "Y", "no"],
//!     ["B", "X", "no"],
//!     ["B", "Y", "no"],
//! ];
//! let records = rows
//!     .iter()
//!     .map(|row| row.iter().map(|value| value.to_string()).collect())
//!     .collect();
//! let dataset = Dataset::new(records, 2).unwrap();
//!
//! let mut tree = Id3Classifier::new();
//! tree.fit(&dataset).unwrap();
//!
//! assert_eq!(tree.classify(&["A", "X"]).unwrap(), "yes");
//! assert_eq!(tree.classify(&["B", "Y"]).unwrap(), "no");
//! ```

/// Naive Bayes Classifiers
pub mod bayes;
/// Dataset and data manipulation utilities
pub mod data;
/// Error type shared by the crate
pub mod error;
/// Functions for evaluating model performance
pub mod metrics;
/// Decision trees
pub mod trees;

pub use error::{Error, Result};
