//! Lazy label-filtering views over series sets.
//!
//! [`SeriesSetFilter`] removes a set of label names from every series a
//! wrapped set yields. Filtering happens at read time on a private
//! snapshot of the label sequence, so the wrapped series is never copied
//! eagerly or mutated in place.

use crate::error::Error;
use crate::storage::{Label, LabelSet, Sample, Series, SeriesSet};

/// A view over a series set that strips the labels named in a set from
/// each series it yields.
///
/// Iteration order, sample data, and error reporting all pass through the
/// wrapped set unchanged.
pub struct SeriesSetFilter {
    inner: Box<dyn SeriesSet>,
    to_filter: LabelSet,
}

impl SeriesSetFilter {
    /// Wrap `inner`, removing every label named in `to_filter` from the
    /// series it yields.
    ///
    /// # Parameters
    ///
    /// - `inner` - Series set to filter
    /// - `to_filter` - Names of the labels to strip; values are ignored
    pub fn new(inner: Box<dyn SeriesSet>, to_filter: LabelSet) -> Self {
        Self { inner, to_filter }
    }
}

impl SeriesSet for SeriesSetFilter {
    fn next(&mut self) -> bool {
        self.inner.next()
    }

    fn at(&self) -> Box<dyn Series + '_> {
        Box::new(SeriesFilter { inner: self.inner.at(), to_filter: &self.to_filter })
    }

    fn err(&self) -> Option<&Error> {
        self.inner.err()
    }
}

/// A single-series view with the filtered labels removed.
struct SeriesFilter<'a> {
    inner: Box<dyn Series + 'a>,
    to_filter: &'a LabelSet,
}

impl Series for SeriesFilter<'_> {
    fn labels(&self) -> Vec<Label> {
        let mut labels = self.inner.labels();
        labels.retain(|label| !self.to_filter.contains(&label.name));
        labels
    }

    fn samples(&self) -> Box<dyn Iterator<Item = Sample> + '_> {
        self.inner.samples()
    }
}
