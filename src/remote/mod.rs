//! Remote read path: the wire protocol, the client boundary, and the
//! routing decorators composed on top of it.

pub mod client;
pub mod codec;
pub mod proto;
pub mod read;

// Re-export main implementations
pub use client::ReadClient;
pub use codec::{from_query_result, to_query};
pub use read::{
    ExternalLabelsHandler, PreferLocalStorageFilter, QueryableClient, RequiredLabelsFilter,
    StartTimeProvider,
};
