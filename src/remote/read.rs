//! Decorators assembling the routed read path.
//!
//! Each type here wraps a [`Queryable`] (or adapts a [`ReadClient`] into
//! one) and preserves its interface while injecting labels, gating on
//! required labels, or routing by time range. Composition is explicit
//! construction, innermost adapter first:
//!
//! ```text
//! ReadClient
//!   -> QueryableClient
//!   -> ExternalLabelsHandler
//!   -> RequiredLabelsFilter
//!   -> PreferLocalStorageFilter
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::Error;
use crate::matchers::Matcher;
use crate::remote::client::ReadClient;
use crate::remote::codec::{from_query_result, to_query};
use crate::storage::{
    ErrorSeriesSet, LabelSet, NoopQuerier, NoopSeriesSet, Querier, Queryable, SeriesSet,
    SeriesSetFilter,
};

/// Adapter exposing a [`ReadClient`] as a [`Queryable`].
///
/// Every querier it creates lowers its selections into wire queries for
/// one fixed time window and reads them through the client.
pub struct QueryableClient {
    client: Arc<dyn ReadClient>,
}

impl QueryableClient {
    /// Wrap `client` as a queryable.
    ///
    /// # Parameters
    ///
    /// - `client` - Remote read client executing the lowered queries
    pub fn new(client: Arc<dyn ReadClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Queryable for QueryableClient {
    async fn querier(&self, mint: i64, maxt: i64) -> Result<Box<dyn Querier>, Error> {
        Ok(Box::new(ClientQuerier { client: Arc::clone(&self.client), mint, maxt }))
    }
}

/// A querier reading series from a remote client for one time window.
struct ClientQuerier {
    client: Arc<dyn ReadClient>,
    mint: i64,
    maxt: i64,
}

#[async_trait]
impl Querier for ClientQuerier {
    async fn select(&self, matchers: &[Matcher]) -> Box<dyn SeriesSet> {
        let query = match to_query(self.mint, self.maxt, matchers) {
            Ok(query) => query,
            Err(err) => {
                warn!("cannot lower selection for remote read: {}", err);
                return Box::new(ErrorSeriesSet::new(err));
            }
        };

        match self.client.read(&query).await {
            Ok(result) => from_query_result(result),
            Err(err) => {
                warn!("remote read failed: {}", err);
                Box::new(ErrorSeriesSet::new(err))
            }
        }
    }

    /// The remote read protocol carries no label enumeration, so this
    /// always answers with an empty list.
    async fn label_values(&self, _name: &str) -> Result<Vec<String>, Error> {
        Ok(Vec::new())
    }

    fn close(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

/// Decorator scoping queries to a set of externally attached labels.
///
/// Outgoing selections gain an equality matcher per external label unless
/// the caller already constrains that name, and the injected labels are
/// stripped back out of every returned series. Callers observe series as
/// if the external labels did not exist.
pub struct ExternalLabelsHandler {
    next: Arc<dyn Queryable>,
    external_labels: LabelSet,
}

impl ExternalLabelsHandler {
    /// Wrap `next` with external-label injection and filtering.
    ///
    /// # Parameters
    ///
    /// - `next` - Queryable whose queriers get decorated
    /// - `external_labels` - Labels identifying this replica's data
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `external_labels` contains a
    /// name that cannot form an equality matcher. A broken deployment
    /// configuration fails the wiring once instead of every query.
    pub fn new(next: Arc<dyn Queryable>, external_labels: LabelSet) -> Result<Self, Error> {
        external_labels.validate()?;
        Ok(Self { next, external_labels })
    }
}

#[async_trait]
impl Queryable for ExternalLabelsHandler {
    async fn querier(&self, mint: i64, maxt: i64) -> Result<Box<dyn Querier>, Error> {
        let inner = self.next.querier(mint, maxt).await?;
        Ok(Box::new(ExternalLabelsQuerier {
            inner,
            external_labels: self.external_labels.clone(),
        }))
    }
}

/// Querier ensuring `select` results match the configured external labels.
struct ExternalLabelsQuerier {
    inner: Box<dyn Querier>,
    external_labels: LabelSet,
}

#[async_trait]
impl Querier for ExternalLabelsQuerier {
    async fn select(&self, matchers: &[Matcher]) -> Box<dyn SeriesSet> {
        let (matchers, added) = add_external_labels(&self.external_labels, matchers);
        let inner = self.inner.select(&matchers).await;
        Box::new(SeriesSetFilter::new(inner, added))
    }

    async fn label_values(&self, name: &str) -> Result<Vec<String>, Error> {
        self.inner.label_values(name).await
    }

    fn close(&mut self) -> Result<(), Error> {
        self.inner.close()
    }
}

/// Extend `matchers` with an equality matcher per external label.
///
/// External labels the caller already matches on are skipped: an explicit
/// matcher means the caller deliberately selects across that name, so no
/// constraint is added and the label is not stripped from results later.
/// Returns the extended selection, with the caller's matchers first in
/// their original order and the additions appended sorted by name, along
/// with the labels actually added, which is exactly the set to strip from
/// the results.
fn add_external_labels(
    external_labels: &LabelSet,
    matchers: &[Matcher],
) -> (Vec<Matcher>, LabelSet) {
    let mut to_add = external_labels.clone();
    for matcher in matchers {
        to_add.remove(matcher.name());
    }

    let mut extended = matchers.to_vec();
    let mut additions: Vec<(&str, &str)> = to_add.iter().collect();
    // Sort so the lowered wire query does not depend on map iteration order.
    additions.sort_unstable_by_key(|(name, _)| *name);
    for (name, value) in additions {
        extended.push(Matcher::equal(name, value));
    }

    (extended, to_add)
}

/// Decorator refusing selections that do not pin a set of required
/// labels.
///
/// Keeps a backend from serving queries it cannot scope correctly, e.g.
/// demanding a tenant label before any remote read happens. An
/// unsatisfied selection answers empty; it is a policy decision, not an
/// error.
pub struct RequiredLabelsFilter {
    next: Arc<dyn Queryable>,
    required_labels: LabelSet,
}

impl RequiredLabelsFilter {
    /// Wrap `next`, demanding a satisfying matcher per required label.
    ///
    /// # Parameters
    ///
    /// - `next` - Queryable whose queriers get gated
    /// - `required_labels` - Labels every selection must pin
    pub fn new(next: Arc<dyn Queryable>, required_labels: LabelSet) -> Self {
        Self { next, required_labels }
    }
}

#[async_trait]
impl Queryable for RequiredLabelsFilter {
    async fn querier(&self, mint: i64, maxt: i64) -> Result<Box<dyn Querier>, Error> {
        let inner = self.next.querier(mint, maxt).await?;
        Ok(Box::new(RequiredLabelsQuerier {
            inner,
            required_labels: self.required_labels.clone(),
        }))
    }
}

/// Querier gating `select` on the required label set.
struct RequiredLabelsQuerier {
    inner: Box<dyn Querier>,
    required_labels: LabelSet,
}

#[async_trait]
impl Querier for RequiredLabelsQuerier {
    /// Delegates only when every required label has a matcher whose
    /// predicate accepts the configured value; the first satisfying
    /// matcher wins per label.
    async fn select(&self, matchers: &[Matcher]) -> Box<dyn SeriesSet> {
        // Working copy, consumed by this call only.
        let mut outstanding = self.required_labels.clone();
        for matcher in matchers {
            if outstanding.is_empty() {
                break;
            }
            let satisfied =
                outstanding.get(matcher.name()).is_some_and(|value| matcher.matches(value));
            if satisfied {
                outstanding.remove(matcher.name());
            }
        }

        if !outstanding.is_empty() {
            debug!(
                "selection lacks {} required label constraint(s), answering empty",
                outstanding.len()
            );
            return Box::new(NoopSeriesSet);
        }

        self.inner.select(matchers).await
    }

    async fn label_values(&self, name: &str) -> Result<Vec<String>, Error> {
        self.inner.label_values(name).await
    }

    fn close(&mut self) -> Result<(), Error> {
        self.inner.close()
    }
}

/// Provider of the local store's data horizon: the earliest sample
/// timestamp it currently retains, in milliseconds.
///
/// Implemented by storage engines, and by plain closures so a fixed or
/// computed horizon can be wired in without a dedicated type.
#[async_trait]
pub trait StartTimeProvider: Send + Sync {
    /// Get the earliest locally retained sample timestamp in
    /// milliseconds.
    ///
    /// # Errors
    ///
    /// Returns an error when the horizon cannot be determined; querier
    /// creation fails rather than guessing a window split.
    async fn start_time(&self) -> Result<i64, Error>;
}

#[async_trait]
impl<F> StartTimeProvider for F
where
    F: Fn() -> Result<i64, Error> + Send + Sync,
{
    async fn start_time(&self) -> Result<i64, Error> {
        (self)()
    }
}

/// Decorator that skips or narrows reads the local store can answer.
///
/// The decision is made once per querier creation from the local data
/// horizon; matchers are never inspected. Windows entirely at or past the
/// horizon answer empty without contacting the wrapped queryable, and
/// windows straddling it are clamped to end at the horizon.
pub struct PreferLocalStorageFilter {
    next: Arc<dyn Queryable>,
    start_time: Arc<dyn StartTimeProvider>,
}

impl PreferLocalStorageFilter {
    /// Wrap `next`, consulting `start_time` on every querier creation.
    ///
    /// # Parameters
    ///
    /// - `next` - Queryable answering for the pre-horizon part of windows
    /// - `start_time` - Source of the local data horizon
    pub fn new(next: Arc<dyn Queryable>, start_time: Arc<dyn StartTimeProvider>) -> Self {
        Self { next, start_time }
    }
}

#[async_trait]
impl Queryable for PreferLocalStorageFilter {
    async fn querier(&self, mint: i64, maxt: i64) -> Result<Box<dyn Querier>, Error> {
        let local_start_time = self.start_time.start_time().await?;

        // The whole window sits past the local horizon; nothing to ask
        // the next layer.
        if mint > local_start_time {
            debug!("window [{}, {}] is covered locally, skipping delegated read", mint, maxt);
            return Ok(Box::new(NoopQuerier));
        }

        // Read only what local retention does not cover.
        let mut cmaxt = maxt;
        if maxt > local_start_time {
            debug!("clamping window [{}, {}] to end at {}", mint, maxt, local_start_time);
            cmaxt = local_start_time;
        }

        self.next.querier(mint, cmaxt).await
    }
}
