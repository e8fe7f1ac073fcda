//! Empty and error-carrying query primitives.
//!
//! The routing layer answers some selections without consulting any
//! backend: policy short-circuits produce [`NoopSeriesSet`] and
//! [`NoopQuerier`], while failures that must not panic ride inside an
//! [`ErrorSeriesSet`] and surface through [`SeriesSet::err`].

use async_trait::async_trait;

use crate::error::Error;
use crate::matchers::Matcher;
use crate::storage::{Querier, Series, SeriesSet};

/// A series set that is exhausted from the start and carries no error.
#[derive(Debug, Default)]
pub struct NoopSeriesSet;

impl SeriesSet for NoopSeriesSet {
    fn next(&mut self) -> bool {
        false
    }

    fn at(&self) -> Box<dyn Series + '_> {
        panic!("at() called on an empty series set")
    }

    fn err(&self) -> Option<&Error> {
        None
    }
}

/// A series set that reports a failure instead of series.
///
/// `next` returns `false` immediately and forever, and `err` surfaces the
/// failure to the caller once iteration stops.
#[derive(Debug)]
pub struct ErrorSeriesSet {
    err: Error,
}

impl ErrorSeriesSet {
    /// Wrap `err` into an immediately exhausted series set.
    pub fn new(err: Error) -> Self {
        Self { err }
    }
}

impl SeriesSet for ErrorSeriesSet {
    fn next(&mut self) -> bool {
        false
    }

    fn at(&self) -> Box<dyn Series + '_> {
        panic!("at() called on a failed series set")
    }

    fn err(&self) -> Option<&Error> {
        Some(&self.err)
    }
}

/// A querier whose selections are always empty.
///
/// Returned when a whole window can be answered elsewhere and the wrapped
/// backend must not be contacted at all.
#[derive(Debug, Default)]
pub struct NoopQuerier;

#[async_trait]
impl Querier for NoopQuerier {
    async fn select(&self, _matchers: &[Matcher]) -> Box<dyn SeriesSet> {
        Box::new(NoopSeriesSet)
    }

    async fn label_values(&self, _name: &str) -> Result<Vec<String>, Error> {
        Ok(Vec::new())
    }

    fn close(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// An empty set is exhausted immediately and reports no error.
    #[test]
    fn test_noop_series_set_is_empty() {
        let mut set = NoopSeriesSet;

        assert!(!set.next());
        assert!(!set.next());
        assert!(set.err().is_none());
    }

    /// A failed set yields nothing and carries its error.
    #[test]
    fn test_error_series_set_surfaces_error() {
        let mut set = ErrorSeriesSet::new(Error::backend("read timed out"));

        assert!(!set.next());
        let error = set.err().expect("error must be present");
        assert!(matches!(error, Error::Backend(_)));
    }

    /// The noop querier answers every selection with an empty set.
    #[tokio::test]
    async fn test_noop_querier_selects_nothing() {
        let mut querier = NoopQuerier;

        let mut set = querier.select(&[Matcher::equal("job", "api")]).await;
        assert!(!set.next());
        assert!(set.err().is_none());

        let values = querier.label_values("job").await.expect("label values");
        assert!(values.is_empty());
        querier.close().expect("close");
    }
}
