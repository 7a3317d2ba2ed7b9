use crate::core::{GridError, Result};
use crate::criteria::DEFAULT_PAGE_SIZE;
use crate::remote::wire::WireSchema;
use std::env;
use std::time::Duration;

/// What the dual-purpose lock button does to pending edits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LockBehavior {
    /// Locking keeps edits pending for the next save.
    #[default]
    Keep,
    /// Locking discards edits, like cancel.
    Revert,
}

/// Grid controller configuration
#[derive(Debug, Clone)]
pub struct GridConfig {
    /// Rows requested per page
    pub page_size: u32,

    /// How long user-facing notices stay visible
    pub notice_ttl: Duration,

    /// Effect of locking an edited row
    pub lock_behavior: LockBehavior,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            notice_ttl: Duration::from_secs(4),
            lock_behavior: LockBehavior::Keep,
        }
    }
}

impl GridConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = size;
        self
    }

    pub fn notice_ttl(mut self, ttl: Duration) -> Self {
        self.notice_ttl = ttl;
        self
    }

    pub fn lock_behavior(mut self, behavior: LockBehavior) -> Self {
        self.lock_behavior = behavior;
        self
    }

    /// Read `PAYGRID_PAGE_SIZE`, falling back to the defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(raw) = env_var("PAYGRID_PAGE_SIZE") {
            config.page_size = raw
                .parse()
                .map_err(|_| GridError::Config("PAYGRID_PAGE_SIZE must be a valid u32".into()))?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(GridError::Config("page_size must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Where and how to reach the dashboard backend
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Scheme, host and port, e.g. `http://localhost:5000`
    pub base_url: String,

    /// Paged record listing
    pub records_path: String,

    /// Batch update endpoint
    pub update_path: String,

    /// Aggregate totals endpoint
    pub totals_path: String,

    /// Per-request timeout handed to the HTTP client
    pub timeout: Option<Duration>,

    /// Wire names of the logical fields
    pub schema: WireSchema,
}

impl RemoteConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            records_path: "/api/services".to_string(),
            update_path: "/api/services/update".to_string(),
            totals_path: "/api/totais".to_string(),
            timeout: None,
            schema: WireSchema::current(),
        }
    }

    pub fn records_path(mut self, path: &str) -> Self {
        self.records_path = path.to_string();
        self
    }

    pub fn update_path(mut self, path: &str) -> Self {
        self.update_path = path.to_string();
        self
    }

    pub fn totals_path(mut self, path: &str) -> Self {
        self.totals_path = path.to_string();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn schema(mut self, schema: WireSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn records_url(&self) -> String {
        format!("{}{}", self.base_url, self.records_path)
    }

    pub fn update_url(&self) -> String {
        format!("{}{}", self.base_url, self.update_path)
    }

    pub fn totals_url(&self) -> String {
        format!("{}{}", self.base_url, self.totals_path)
    }

    /// Build from `PAYGRID_*` environment variables (a `.env` file is read first).
    ///
    /// - `PAYGRID_BASE_URL` (default `http://localhost:5000`)
    /// - `PAYGRID_SCHEMA`: `legacy` or `current` (default)
    /// - `PAYGRID_ID_FIELD`: override of the identifier field name
    /// - `PAYGRID_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let base_url =
            env_var("PAYGRID_BASE_URL").unwrap_or_else(|| "http://localhost:5000".to_string());

        let mut schema = match env_var("PAYGRID_SCHEMA").as_deref() {
            None | Some("current") => WireSchema::current(),
            Some("legacy") => WireSchema::legacy(),
            Some(other) => {
                return Err(GridError::Config(format!(
                    "PAYGRID_SCHEMA must be one of: legacy, current (got '{}')",
                    other
                )));
            }
        };
        if let Some(id_field) = env_var("PAYGRID_ID_FIELD") {
            schema = schema.id_field(&id_field);
        }

        let mut config = Self::new(&base_url).schema(schema);
        if let Some(raw) = env_var("PAYGRID_TIMEOUT_SECS") {
            let secs: u64 = raw.parse().map_err(|_| {
                GridError::Config("PAYGRID_TIMEOUT_SECS must be a whole number".to_string())
            })?;
            config = config.timeout(Duration::from_secs(secs));
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(GridError::Config(
                "base_url must start with http:// or https://".to_string(),
            ));
        }

        for path in [&self.records_path, &self.update_path, &self.totals_path] {
            if !path.starts_with('/') {
                return Err(GridError::Config(format!(
                    "endpoint path '{}' must start with '/'",
                    path
                )));
            }
        }

        self.schema.validate()
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_defaults() {
        let config = GridConfig::default();
        assert_eq!(config.page_size, 30);
        assert_eq!(config.notice_ttl, Duration::from_secs(4));
        assert_eq!(config.lock_behavior, LockBehavior::Keep);
        assert!(config.validate().is_ok());
        assert!(GridConfig::new().page_size(0).validate().is_err());
    }

    #[test]
    fn test_remote_urls() {
        let config = RemoteConfig::new("http://localhost:5000/");
        assert_eq!(config.records_url(), "http://localhost:5000/api/services");
        assert_eq!(config.update_url(), "http://localhost:5000/api/services/update");
        assert_eq!(config.totals_url(), "http://localhost:5000/api/totais");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_remote_validation() {
        assert!(RemoteConfig::new("localhost:5000").validate().is_err());
        assert!(
            RemoteConfig::new("http://localhost")
                .records_path("api/services")
                .validate()
                .is_err()
        );
    }
}
