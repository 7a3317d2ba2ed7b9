use super::{RemotePage, RemoteSource, SubmitReport};
use crate::config::RemoteConfig;
use crate::core::{ChangeRecord, GridError, RemoteError, RemoteResult, Result, Totals};
use crate::criteria::{Criteria, Filters};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

/// [`RemoteSource`] backed by the dashboard's JSON HTTP API.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: reqwest::Client,
    config: RemoteConfig,
}

impl HttpRemote {
    pub fn new(config: RemoteConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| GridError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Turn a non-2xx reply into an error, keeping the server's message.
    async fn check(response: reqwest::Response) -> RemoteResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
            .unwrap_or(body);

        Err(RemoteError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl RemoteSource for HttpRemote {
    async fn fetch_page(&self, criteria: &Criteria) -> RemoteResult<RemotePage> {
        let params = self.config.schema.page_params(criteria);
        debug!(page = criteria.page, "GET {}", self.config.records_path);

        let response = self
            .client
            .get(self.config.records_url())
            .query(&params)
            .send()
            .await?;
        let body: Value = Self::check(response).await?.json().await?;

        self.config.schema.decode_page(&body)
    }

    async fn submit_changes(&self, changes: &[ChangeRecord]) -> RemoteResult<SubmitReport> {
        let payload = self.config.schema.encode_changes(changes);
        debug!(rows = changes.len(), "PUT {}", self.config.update_path);

        let response = self
            .client
            .put(self.config.update_url())
            .json(&payload)
            .send()
            .await?;
        let bytes = Self::check(response).await?.bytes().await?;

        match serde_json::from_slice::<SubmitReport>(&bytes) {
            Ok(report) => Ok(report),
            Err(err) => {
                warn!(error = %err, "unrecognised update reply, treating as success");
                Ok(SubmitReport::default())
            }
        }
    }

    async fn fetch_totals(&self, filters: &Filters) -> RemoteResult<Totals> {
        let params = self.config.schema.filter_params(filters);
        debug!("GET {}", self.config.totals_path);

        let response = self
            .client
            .get(self.config.totals_url())
            .query(&params)
            .send()
            .await?;
        let totals = Self::check(response).await?.json::<Totals>().await?;
        Ok(totals)
    }
}
