//! Querying abstractions and the label data model for the routed read path.
//!
//! This module provides the traits the routing decorators wrap and compose:
//! a [`Queryable`] creates window-bound [`Querier`]s, a querier selects lazy
//! [`SeriesSet`]s, and a set yields [`Series`]. It also carries the label
//! and sample types shared by every layer.

pub mod filter;
pub mod noop;

// Re-export main implementations
pub use filter::SeriesSetFilter;
pub use noop::{ErrorSeriesSet, NoopQuerier, NoopSeriesSet};

use async_trait::async_trait;
use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::matchers::Matcher;

/// A handle to storage that can answer queries for a fixed time window.
///
/// This trait is the seam the routing decorators are built on: each
/// decorator wraps another `Queryable` and returns queriers that adjust
/// the window, the matchers, or the results of the wrapped one.
#[async_trait]
pub trait Queryable: Send + Sync {
    /// Create a querier answering for `[mint, maxt]`.
    ///
    /// # Parameters
    ///
    /// - `mint` - Window start in milliseconds since Unix epoch, inclusive
    /// - `maxt` - Window end in milliseconds since Unix epoch, inclusive
    ///
    /// # Errors
    ///
    /// Returns an error if the querier cannot be constructed, e.g. when a
    /// required backend lookup fails.
    async fn querier(&self, mint: i64, maxt: i64) -> Result<Box<dyn Querier>, Error>;
}

/// A single-window view into storage.
///
/// A querier always answers `select` for the window it was created with
/// and is intended for one request; distinct queriers are independent and
/// may run concurrently.
#[async_trait]
pub trait Querier: Send + Sync {
    /// Select the series matching all `matchers`.
    ///
    /// Failures are reported through the returned set's
    /// [`err`](SeriesSet::err), never as a panic: the first
    /// [`next`](SeriesSet::next) returns `false` and `err` carries the
    /// cause.
    async fn select(&self, matchers: &[Matcher]) -> Box<dyn SeriesSet>;

    /// Get all known values for the label `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot enumerate label
    /// values.
    async fn label_values(&self, name: &str) -> Result<Vec<String>, Error>;

    /// Release any resources held by the querier.
    ///
    /// # Errors
    ///
    /// Returns an error if cleanup fails.
    fn close(&mut self) -> Result<(), Error>;
}

/// A lazy, single-pass, forward-only iterator over matched series.
///
/// A set is bound to one `select` call and cannot be restarted; issue a
/// new `select` to iterate again. Usage follows the advance-then-read
/// shape:
///
/// ```text
/// while set.next() {
///     let series = set.at();
///     // ...
/// }
/// if let Some(err) = set.err() { /* the iteration failed */ }
/// ```
pub trait SeriesSet: Send {
    /// Advance to the next series. Returns `false` once the set is
    /// exhausted or has failed, and never yields again after that.
    fn next(&mut self) -> bool;

    /// Get the current series. Only valid after [`next`](Self::next)
    /// returned `true`; calling it outside that window is a contract
    /// violation and panics.
    fn at(&self) -> Box<dyn Series + '_>;

    /// The error that terminated iteration, if any. An exhausted set with
    /// no error completed normally; policy short-circuits yield empty sets
    /// with no error.
    fn err(&self) -> Option<&Error>;
}

/// One matched series: an ordered label sequence identifying it and a
/// lazy sequence of samples.
pub trait Series {
    /// The series' labels in stored order. Returns a fresh snapshot; the
    /// underlying series is never mutated through it.
    fn labels(&self) -> Vec<Label>;

    /// Iterator over the series' samples in time order.
    fn samples(&self) -> Box<dyn Iterator<Item = Sample> + '_>;
}

impl<S: Series + ?Sized> Series for &S {
    fn labels(&self) -> Vec<Label> {
        (**self).labels()
    }

    fn samples(&self) -> Box<dyn Iterator<Item = Sample> + '_> {
        (**self).samples()
    }
}

/// A metric label representing a name=value pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label {
    pub name: String,
    pub value: String,
}

impl Label {
    /// Create a new label with the given name and value.
    ///
    /// # Parameters
    ///
    /// - `name` - Label name
    /// - `value` - Label value
    ///
    /// # Returns
    ///
    /// Returns a new `Label` instance.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }

    /// Check whether `name` is a valid Prometheus label name, i.e. matches
    /// `[a-zA-Z_][a-zA-Z0-9_]*`.
    pub fn is_valid_name(name: &str) -> bool {
        !name.is_empty()
            && name
                .bytes()
                .enumerate()
                .all(|(i, b)| b.is_ascii_alphabetic() || b == b'_' || (i > 0 && b.is_ascii_digit()))
    }
}

/// A single metric sample with timestamp and value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp: i64,
    pub value: f64,
}

impl Sample {
    /// Create a new sample with the given timestamp (milliseconds) and value.
    ///
    /// # Parameters
    ///
    /// - `timestamp` - Timestamp in milliseconds since Unix epoch
    /// - `value` - Metric value
    ///
    /// # Returns
    ///
    /// Returns a new `Sample` instance.
    pub const fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// A set of labels with unique names, mapping each name to one value.
///
/// This is the configuration currency of the routing layer: external
/// labels to inject and required labels to demand are both label sets,
/// and both deserialize directly from a flat YAML/JSON mapping. Decorators
/// clone a working copy per call and never mutate a configured set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSet(FnvHashMap<String, String>);

impl LabelSet {
    /// Create an empty label set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a label set from name/value pairs. Later duplicates win.
    ///
    /// # Parameters
    ///
    /// - `pairs` - Name/value pairs to populate the set with
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// Insert a label, returning the previous value for the name if any.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(name.into(), value.into())
    }

    /// Get the value for `name`, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Remove `name`, returning its value if it was present.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0.remove(name)
    }

    /// Check whether the set contains `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Iterate over the name/value pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of labels in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Validate every name in the set against Prometheus label-name
    /// syntax.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] naming the first offending label.
    pub fn validate(&self) -> Result<(), Error> {
        for name in self.0.keys() {
            if !Label::is_valid_name(name) {
                return Err(Error::Configuration(format!("invalid label name: {name:?}")));
            }
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LabelSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test label name validation against Prometheus syntax.
    #[test]
    fn test_label_name_validation() {
        assert!(Label::is_valid_name("job"));
        assert!(Label::is_valid_name("__name__"));
        assert!(Label::is_valid_name("node_cpu_seconds_total"));
        assert!(Label::is_valid_name("_private2"));

        assert!(!Label::is_valid_name(""));
        assert!(!Label::is_valid_name("0job"));
        assert!(!Label::is_valid_name("job-name"));
        assert!(!Label::is_valid_name("job name"));
        assert!(!Label::is_valid_name("jöb"));
    }

    /// Test basic label set operations.
    #[test]
    fn test_label_set_operations() {
        let mut set = LabelSet::from_pairs([("region", "eu"), ("env", "prod")]);

        assert_eq!(set.len(), 2);
        assert_eq!(set.get("region"), Some("eu"));
        assert!(set.contains("env"));
        assert!(!set.contains("cluster"));

        assert_eq!(set.insert("region", "us"), Some("eu".to_string()));
        assert_eq!(set.get("region"), Some("us"));

        assert_eq!(set.remove("env"), Some("prod".to_string()));
        assert!(!set.contains("env"));
        assert_eq!(set.remove("env"), None);
    }

    /// Label sets validate the way they will be used in matchers.
    #[test]
    fn test_label_set_validation() {
        let set = LabelSet::from_pairs([("region", "eu"), ("env", "prod")]);
        assert!(set.validate().is_ok());

        let set = LabelSet::from_pairs([("region", "eu"), ("bad-name", "x")]);
        let error = set.validate().expect_err("invalid name must be rejected");
        assert!(matches!(error, Error::Configuration(_)));
        assert!(error.to_string().contains("bad-name"));
    }

    /// Label sets deserialize from the flat mapping used in configuration
    /// files.
    #[test]
    fn test_label_set_from_yaml() {
        let yaml = "region: eu\nenv: prod\n";

        let set: LabelSet = serde_yaml::from_str(yaml).expect("valid label set yaml");

        assert_eq!(set.len(), 2);
        assert_eq!(set.get("region"), Some("eu"));
        assert_eq!(set.get("env"), Some("prod"));
    }

    /// Collecting pairs builds the same set as `from_pairs`.
    #[test]
    fn test_label_set_from_iterator() {
        let collected: LabelSet = [("a", "1"), ("b", "2")].into_iter().collect();

        assert_eq!(collected, LabelSet::from_pairs([("a", "1"), ("b", "2")]));
    }
}
