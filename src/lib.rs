//! # Prometheus Read Routing Library
//!
//! A composable query-routing layer for the Prometheus remote read path.
//!
//! This library provides components for:
//! - **Query Lowering**: Translates time windows and label matchers into
//!   wire-level read queries and lifts raw results back into lazy series
//!   sets
//! - **Client Adapter**: Exposes any remote read client as a queryable
//!   storage handle
//! - **External Labels**: Scopes outgoing queries to a replica's external
//!   labels and strips the injected labels from results
//! - **Required Labels**: Refuses selections that do not pin a configured
//!   label set, answering them empty instead of forwarding
//! - **Local Storage Preference**: Skips or narrows remote reads for
//!   windows the local store already covers
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use prom_route_rs::{
//!     ExternalLabelsHandler, LabelSet, Matcher, PreferLocalStorageFilter, Queryable,
//!     QueryableClient, RequiredLabelsFilter,
//! };
//!
//! # async fn example(
//! #     client: Arc<dyn prom_route_rs::ReadClient>,
//! #     local_start_time: Arc<dyn prom_route_rs::StartTimeProvider>,
//! # ) -> Result<(), prom_route_rs::Error> {
//! // Adapt the client, then decorate it innermost-first
//! let base = Arc::new(QueryableClient::new(client));
//! let scoped = Arc::new(ExternalLabelsHandler::new(
//!     base,
//!     LabelSet::from_pairs([("region", "eu")]),
//! )?);
//! let gated = Arc::new(RequiredLabelsFilter::new(
//!     scoped,
//!     LabelSet::from_pairs([("tenant", "a")]),
//! ));
//! let routed = PreferLocalStorageFilter::new(gated, local_start_time);
//!
//! // Query one window and drain the lazy series set
//! let querier = routed.querier(0, 60_000).await?;
//! let mut series_set = querier.select(&[Matcher::equal("job", "api")]).await;
//! while series_set.next() {
//!     let series = series_set.at();
//!     println!("{:?}", series.labels());
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod matchers;
pub mod remote;
pub mod storage;

// Re-export commonly used types for convenience
pub use error::Error;
pub use matchers::{MatchKind, Matcher};
pub use remote::{
    ExternalLabelsHandler, PreferLocalStorageFilter, QueryableClient, ReadClient,
    RequiredLabelsFilter, StartTimeProvider,
};
pub use storage::{Label, LabelSet, Querier, Queryable, Sample, Series, SeriesSet};
