//! Remote data source
//!
//! The grid talks to its backend through [`RemoteSource`]: one paged read,
//! one batch write and one aggregate read. [`http::HttpRemote`] is the
//! production implementation; [`wire`] holds the JSON mapping it uses.

pub mod http;
pub mod wire;

use crate::core::{ChangeRecord, Record, RemoteResult, Totals};
use crate::criteria::{Criteria, Filters};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

pub use http::HttpRemote;
pub use wire::WireSchema;

/// One page of records as returned by the backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemotePage {
    pub records: Vec<Record>,
    /// Size of the whole filtered set, when the backend reports it.
    pub total: Option<u64>,
}

impl RemotePage {
    pub fn new(records: Vec<Record>, total: u64) -> Self {
        Self {
            records,
            total: Some(total),
        }
    }
}

/// Reply of the batch update endpoint. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SubmitReport {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub updated: Option<u64>,
    /// Rows the backend could not apply.
    #[serde(default)]
    pub errors: Vec<Value>,
}

impl SubmitReport {
    pub fn updated(count: u64) -> Self {
        Self {
            updated: Some(count),
            ..Self::default()
        }
    }
}

#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetch the page described by `criteria`.
    async fn fetch_page(&self, criteria: &Criteria) -> RemoteResult<RemotePage>;

    /// Send a batch of changed rows.
    async fn submit_changes(&self, changes: &[ChangeRecord]) -> RemoteResult<SubmitReport>;

    /// Aggregate figures over every row matching `filters`.
    async fn fetch_totals(&self, filters: &Filters) -> RemoteResult<Totals>;
}

#[async_trait]
impl<T: RemoteSource + ?Sized> RemoteSource for Arc<T> {
    async fn fetch_page(&self, criteria: &Criteria) -> RemoteResult<RemotePage> {
        (**self).fetch_page(criteria).await
    }

    async fn submit_changes(&self, changes: &[ChangeRecord]) -> RemoteResult<SubmitReport> {
        (**self).submit_changes(changes).await
    }

    async fn fetch_totals(&self, filters: &Filters) -> RemoteResult<Totals> {
        (**self).fetch_totals(filters).await
    }
}
