//! Lowering between matcher selections and the wire protocol.
//!
//! [`to_query`] translates a time window and matcher sequence into the
//! [`proto::Query`] a read client accepts, and [`from_query_result`]
//! wraps a raw result back into the lazy [`SeriesSet`] abstraction
//! without copying or reordering the series it carries.

use crate::error::Error;
use crate::matchers::{MatchKind, Matcher};
use crate::remote::proto;
use crate::storage::{Label, Sample, Series, SeriesSet};

/// Lower a time window and matcher sequence into a wire-level query.
///
/// # Parameters
///
/// - `mint` - Window start in milliseconds, inclusive
/// - `maxt` - Window end in milliseconds, inclusive
/// - `matchers` - Selection to lower, kept in order
///
/// # Errors
///
/// Returns [`Error::Lowering`] if a matcher cannot be represented on the
/// wire; a matcher without a label name means nothing to a remote
/// endpoint.
pub fn to_query(mint: i64, maxt: i64, matchers: &[Matcher]) -> Result<proto::Query, Error> {
    Ok(proto::Query {
        start_timestamp_ms: mint,
        end_timestamp_ms: maxt,
        matchers: to_label_matchers(matchers)?,
    })
}

fn to_label_matchers(matchers: &[Matcher]) -> Result<Vec<proto::LabelMatcher>, Error> {
    matchers
        .iter()
        .map(|matcher| {
            if matcher.name().is_empty() {
                return Err(Error::Lowering(format!("matcher {matcher} has no label name")));
            }
            let kind = match matcher.kind() {
                MatchKind::Equal => proto::label_matcher::Type::Eq,
                MatchKind::NotEqual => proto::label_matcher::Type::Neq,
                MatchKind::RegexMatch => proto::label_matcher::Type::Re,
                MatchKind::RegexNoMatch => proto::label_matcher::Type::Nre,
            };
            Ok(proto::LabelMatcher {
                r#type: kind as i32,
                name: matcher.name().to_string(),
                value: matcher.value().to_string(),
            })
        })
        .collect()
}

/// Wrap a raw query result into a lazy series set.
///
/// Series come out in exactly the order the endpoint returned them, and
/// label and sample data is converted per access rather than up front.
pub fn from_query_result(result: proto::QueryResult) -> Box<dyn SeriesSet> {
    Box::new(RemoteSeriesSet { iter: result.timeseries.into_iter(), cur: None })
}

/// Single-pass cursor over the series of one raw query result.
struct RemoteSeriesSet {
    iter: std::vec::IntoIter<proto::TimeSeries>,
    cur: Option<proto::TimeSeries>,
}

impl SeriesSet for RemoteSeriesSet {
    fn next(&mut self) -> bool {
        self.cur = self.iter.next();
        self.cur.is_some()
    }

    fn at(&self) -> Box<dyn Series + '_> {
        let inner = self.cur.as_ref().expect("at() called without a successful next()");
        Box::new(RemoteSeries { inner })
    }

    fn err(&self) -> Option<&Error> {
        None
    }
}

/// A series view over one wire-level time series.
struct RemoteSeries<'a> {
    inner: &'a proto::TimeSeries,
}

impl Series for RemoteSeries<'_> {
    fn labels(&self) -> Vec<Label> {
        self.inner.labels.iter().map(|l| Label::new(l.name.clone(), l.value.clone())).collect()
    }

    fn samples(&self) -> Box<dyn Iterator<Item = Sample> + '_> {
        Box::new(self.inner.samples.iter().map(|s| Sample::new(s.timestamp, s.value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire_series(labels: &[(&str, &str)], samples: &[(i64, f64)]) -> proto::TimeSeries {
        proto::TimeSeries {
            labels: labels
                .iter()
                .map(|(n, v)| proto::Label { name: (*n).to_string(), value: (*v).to_string() })
                .collect(),
            samples: samples
                .iter()
                .map(|(t, v)| proto::Sample { value: *v, timestamp: *t })
                .collect(),
        }
    }

    /// Each matcher kind lowers to its wire counterpart, in order.
    #[test]
    fn test_to_query_lowers_all_matcher_kinds() {
        let matchers = vec![
            Matcher::equal("job", "api"),
            Matcher::new(MatchKind::NotEqual, "env", "dev").expect("valid matcher"),
            Matcher::new(MatchKind::RegexMatch, "instance", "node.*").expect("valid regex"),
            Matcher::new(MatchKind::RegexNoMatch, "region", "us.*").expect("valid regex"),
        ];

        let query = to_query(1_000, 2_000, &matchers).expect("lowerable selection");

        assert_eq!(query.start_timestamp_ms, 1_000);
        assert_eq!(query.end_timestamp_ms, 2_000);
        let kinds: Vec<i32> = query.matchers.iter().map(|m| m.r#type).collect();
        assert_eq!(
            kinds,
            vec![
                proto::label_matcher::Type::Eq as i32,
                proto::label_matcher::Type::Neq as i32,
                proto::label_matcher::Type::Re as i32,
                proto::label_matcher::Type::Nre as i32,
            ]
        );
        assert_eq!(query.matchers[2].name, "instance");
        assert_eq!(query.matchers[2].value, "node.*");
    }

    /// A matcher without a label name cannot be lowered.
    #[test]
    fn test_to_query_rejects_empty_matcher_name() {
        let matchers = vec![Matcher::equal("", "api")];

        let error = to_query(0, 1, &matchers).expect_err("empty name must be rejected");

        assert!(matches!(error, Error::Lowering(_)));
    }

    /// Series and their data come back in endpoint order.
    #[test]
    fn test_from_query_result_preserves_order() {
        let result = proto::QueryResult {
            timeseries: vec![
                wire_series(&[("job", "api"), ("instance", "a")], &[(1_000, 1.0)]),
                wire_series(&[("job", "api"), ("instance", "b")], &[(1_000, 2.0), (2_000, 3.0)]),
            ],
        };

        let mut set = from_query_result(result);

        assert!(set.next());
        assert_eq!(
            set.at().labels(),
            vec![Label::new("job", "api"), Label::new("instance", "a")]
        );
        assert_eq!(set.at().samples().collect::<Vec<_>>(), vec![Sample::new(1_000, 1.0)]);

        assert!(set.next());
        assert_eq!(
            set.at().labels(),
            vec![Label::new("job", "api"), Label::new("instance", "b")]
        );
        assert_eq!(
            set.at().samples().collect::<Vec<_>>(),
            vec![Sample::new(1_000, 2.0), Sample::new(2_000, 3.0)]
        );

        assert!(!set.next());
        assert!(set.err().is_none());
    }

    /// An empty result is exhausted immediately without error.
    #[test]
    fn test_from_query_result_empty() {
        let mut set = from_query_result(proto::QueryResult { timeseries: Vec::new() });

        assert!(!set.next());
        assert!(set.err().is_none());
    }
}
