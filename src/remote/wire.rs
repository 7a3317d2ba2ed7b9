//! JSON mapping between backend payloads and grid types.
//!
//! Backend versions disagree on field names (`order_id` vs `id_pk`, a
//! `customer` vs `service` filter, whether sorting is supported), so every
//! wire name lives in a [`WireSchema`] resolved once at startup.

use super::RemotePage;
use crate::core::{
    ChangeRecord, GridError, PaymentStatus, Record, RecordId, RemoteError, RemoteResult, Result,
    parse_payment_date,
};
use crate::criteria::{Criteria, Filters};
use crate::edit::Edit;
use serde_json::{Map, Value};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireSchema {
    pub id_field: String,
    pub status_field: String,
    pub date_field: String,
    /// Query parameter carrying the customer/service filter.
    pub customer_param: String,
    /// Whether the backend understands `order_by`/`order_dir`.
    pub supports_sort: bool,
}

impl WireSchema {
    /// Early dashboards: customer filter, no server-side sorting.
    pub fn legacy() -> Self {
        Self {
            id_field: "order_id".to_string(),
            status_field: "PGTO".to_string(),
            date_field: "DATPGTO".to_string(),
            customer_param: "customer".to_string(),
            supports_sort: false,
        }
    }

    /// Service filter and sortable columns.
    pub fn current() -> Self {
        Self {
            customer_param: "service".to_string(),
            supports_sort: true,
            ..Self::legacy()
        }
    }

    pub fn id_field(mut self, name: &str) -> Self {
        self.id_field = name.to_string();
        self
    }

    pub fn status_field(mut self, name: &str) -> Self {
        self.status_field = name.to_string();
        self
    }

    pub fn date_field(mut self, name: &str) -> Self {
        self.date_field = name.to_string();
        self
    }

    pub fn customer_param(mut self, name: &str) -> Self {
        self.customer_param = name.to_string();
        self
    }

    pub fn validate(&self) -> Result<()> {
        let names = [&self.id_field, &self.status_field, &self.date_field];
        if names.iter().any(|n| n.trim().is_empty()) || self.customer_param.trim().is_empty() {
            return Err(GridError::Config("wire field names cannot be empty".to_string()));
        }
        if names[0] == names[1] || names[0] == names[2] || names[1] == names[2] {
            return Err(GridError::Config(
                "id, status and date wire fields must be distinct".to_string(),
            ));
        }
        Ok(())
    }

    /// Query parameters for a page request.
    ///
    /// Empty filters are sent as empty strings.
    pub fn page_params(&self, criteria: &Criteria) -> Vec<(String, String)> {
        let mut params = vec![
            ("page".to_string(), criteria.page.to_string()),
            ("limit".to_string(), criteria.page_size.to_string()),
        ];
        params.extend(self.filter_params(&criteria.filters));

        if self.supports_sort {
            if let Some(sort) = &criteria.sort {
                params.push(("order_by".to_string(), sort.field.clone()));
                params.push(("order_dir".to_string(), sort.direction.to_string()));
            }
        }
        params
    }

    pub fn filter_params(&self, filters: &Filters) -> Vec<(String, String)> {
        let date = |d: Option<chrono::NaiveDate>| d.map(|d| d.to_string()).unwrap_or_default();
        let text = |s: &Option<String>| s.clone().unwrap_or_default();

        vec![
            ("start_date".to_string(), date(filters.start_date)),
            ("end_date".to_string(), date(filters.end_date)),
            ("status".to_string(), text(&filters.status)),
            ("employee".to_string(), text(&filters.employee)),
            (self.customer_param.clone(), text(&filters.customer)),
        ]
    }

    /// Decode a `{ data, total }` listing. Missing or null `data` is an empty page.
    ///
    /// Rows that cannot be decoded are logged and left out; the rest of the
    /// page still loads.
    pub fn decode_page(&self, body: &Value) -> RemoteResult<RemotePage> {
        let object = body
            .as_object()
            .ok_or_else(|| RemoteError::decode("listing is not a JSON object"))?;

        let records = match object.get("data") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(rows)) => rows
                .iter()
                .enumerate()
                .filter_map(|(position, row)| match self.decode_record(row) {
                    Ok(record) => Some(record),
                    Err(err) => {
                        warn!(position, error = %err, "skipping undecodable row");
                        None
                    }
                })
                .collect(),
            Some(_) => return Err(RemoteError::decode("'data' is not an array")),
        };

        let total = object.get("total").and_then(Value::as_u64);
        Ok(RemotePage { records, total })
    }

    pub fn decode_record(&self, row: &Value) -> RemoteResult<Record> {
        let object = row
            .as_object()
            .ok_or_else(|| RemoteError::decode("record is not a JSON object"))?;

        let id = object
            .get(&self.id_field)
            .and_then(RecordId::from_json)
            .ok_or_else(|| {
                RemoteError::Decode(format!("record without a valid '{}'", self.id_field))
            })?;

        let payment_status = match object.get(&self.status_field) {
            None | Some(Value::Null) => PaymentStatus::Unset,
            Some(Value::String(raw)) => raw.parse().map_err(RemoteError::Decode)?,
            Some(other) => {
                return Err(RemoteError::Decode(format!(
                    "'{}' of record {} is not a string: {}",
                    self.status_field, id, other
                )));
            }
        };

        let payment_date = match object.get(&self.date_field) {
            None | Some(Value::Null) => None,
            Some(Value::String(raw)) => parse_payment_date(raw).map_err(|e| {
                RemoteError::Decode(format!("'{}' of record {}: {}", self.date_field, id, e))
            })?,
            Some(other) => {
                return Err(RemoteError::Decode(format!(
                    "'{}' of record {} is not a string: {}",
                    self.date_field, id, other
                )));
            }
        };

        let mut fields: Map<String, Value> = object.clone();
        fields.remove(&self.status_field);
        fields.remove(&self.date_field);

        Ok(Record {
            id,
            payment_status,
            payment_date,
            fields,
        })
    }

    /// Encode one changed row for the batch update endpoint.
    pub fn encode_change(&self, change: &ChangeRecord) -> Value {
        let mut object = Map::new();
        object.insert(self.id_field.clone(), change.id.to_json());
        object.insert(
            self.status_field.clone(),
            change
                .payment_status
                .wire_label()
                .map(Value::from)
                .unwrap_or(Value::Null),
        );
        object.insert(
            self.date_field.clone(),
            change
                .payment_date
                .map(|d| Value::from(d.to_string()))
                .unwrap_or(Value::Null),
        );
        Value::Object(object)
    }

    pub fn encode_changes(&self, changes: &[ChangeRecord]) -> Value {
        Value::Array(changes.iter().map(|c| self.encode_change(c)).collect())
    }

    /// Like [`Edit::parse`], but also accepts the wire field names.
    pub fn parse_edit(&self, field: &str, raw: &str) -> Result<Edit> {
        if field == self.status_field {
            Edit::parse("paymentStatus", raw)
        } else if field == self.date_field {
            Edit::parse("paymentDate", raw)
        } else {
            Edit::parse(field, raw)
        }
    }
}

impl Default for WireSchema {
    fn default() -> Self {
        Self::current()
    }
}
