//! The remote read client boundary.

use async_trait::async_trait;

use crate::error::Error;
use crate::remote::proto;

/// A client able to execute one lowered query against a remote read
/// endpoint.
///
/// Transport, serialization, and retry policy are the implementer's
/// concern; the routing layer only lowers selections into queries and
/// interprets the raw results. Implementations must honor cancellation:
/// dropping the returned future aborts the read, and a deadline raced
/// against it has to surface as an error rather than a hang.
#[async_trait]
pub trait ReadClient: Send + Sync {
    /// Execute `query` and return the matching series as received from
    /// the endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`] when the read fails for transport,
    /// timeout, or cancellation reasons.
    async fn read(&self, query: &proto::Query) -> Result<proto::QueryResult, Error>;
}
