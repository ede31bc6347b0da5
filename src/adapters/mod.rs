//! Remote tabular store access

pub mod postgrest;
pub mod query;

pub use postgrest::PostgrestClient;
pub use query::{Filter, FilterOp, OrderBy, SelectQuery};

use async_trait::async_trait;

use crate::domain::Row;
use crate::error::Result;

/// Queryable table abstraction over the remote store.
///
/// Implementations return rows in the order requested, or fail with a
/// transport/auth error that callers decide how to surface.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Row>>;
}
