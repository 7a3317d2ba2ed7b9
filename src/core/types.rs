use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Stable identifier of a record.
///
/// Opaque to the grid: depending on the backend schema it is either a
/// number or a text key, and it is echoed back to the server unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl RecordId {
    /// Read an identifier out of a JSON scalar.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(RecordId::Number),
            Value::String(s) if !s.is_empty() => Some(RecordId::Text(s.clone())),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            RecordId::Number(n) => Value::from(*n),
            RecordId::Text(s) => Value::from(s.as_str()),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId::Text(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        RecordId::Text(value)
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        RecordId::Number(value)
    }
}

/// Payment state of a record, one of the two user-editable fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Option<String>", into = "Option<String>")]
pub enum PaymentStatus {
    #[default]
    Unset,
    Yes,
    No,
    Canceled,
    Pending,
}

impl PaymentStatus {
    /// Label used by the dashboard backend. `Unset` travels as `null`.
    pub fn wire_label(&self) -> Option<&'static str> {
        match self {
            PaymentStatus::Unset => None,
            PaymentStatus::Yes => Some("Sim"),
            PaymentStatus::No => Some("Não"),
            PaymentStatus::Canceled => Some("Cancelado"),
            PaymentStatus::Pending => Some("Pendente"),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentStatus::Unset => "Unset",
            PaymentStatus::Yes => "Yes",
            PaymentStatus::No => "No",
            PaymentStatus::Canceled => "Canceled",
            PaymentStatus::Pending => "Pending",
        };
        f.write_str(label)
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    /// Accepts backend labels as well as English names, case-insensitively.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "unset" => Ok(PaymentStatus::Unset),
            "sim" | "yes" => Ok(PaymentStatus::Yes),
            "não" | "nao" | "no" => Ok(PaymentStatus::No),
            "cancelado" | "canceled" | "cancelled" => Ok(PaymentStatus::Canceled),
            "pendente" | "pending" => Ok(PaymentStatus::Pending),
            other => Err(format!("unknown payment status '{}'", other)),
        }
    }
}

impl TryFrom<Option<String>> for PaymentStatus {
    type Error = String;

    fn try_from(value: Option<String>) -> std::result::Result<Self, Self::Error> {
        match value {
            None => Ok(PaymentStatus::Unset),
            Some(raw) => raw.parse(),
        }
    }
}

impl From<PaymentStatus> for Option<String> {
    fn from(status: PaymentStatus) -> Self {
        status.wire_label().map(str::to_string)
    }
}

/// Parse a payment date as typed by a user or stored by the backend.
///
/// Blank input means "no date". Timestamps are cut down to their date part.
pub fn parse_payment_date(raw: &str) -> std::result::Result<Option<NaiveDate>, chrono::ParseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map(Some)
}

/// One row of the grid.
///
/// `fields` holds every read-only display attribute exactly as the server
/// sent it; the two payment fields are lifted out and typed.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: RecordId,
    pub payment_status: PaymentStatus,
    pub payment_date: Option<NaiveDate>,
    pub fields: Map<String, Value>,
}

impl Record {
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            payment_status: PaymentStatus::Unset,
            payment_date: None,
            fields: Map::new(),
        }
    }

    pub fn with_status(mut self, status: PaymentStatus) -> Self {
        self.payment_status = status;
        self
    }

    pub fn with_date(mut self, date: Option<NaiveDate>) -> Self {
        self.payment_date = date;
        self
    }

    pub fn with_field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    /// Display attribute by wire name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// True when both editable fields match `other`.
    pub fn same_payment(&self, other: &Record) -> bool {
        self.payment_status == other.payment_status && self.payment_date == other.payment_date
    }
}

/// A pending change of the editable fields of one record.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRecord {
    pub id: RecordId,
    pub payment_status: PaymentStatus,
    pub payment_date: Option<NaiveDate>,
}

impl From<&Record> for ChangeRecord {
    fn from(record: &Record) -> Self {
        Self {
            id: record.id.clone(),
            payment_status: record.payment_status,
            payment_date: record.payment_date,
        }
    }
}

/// Aggregate figures for the current filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    #[serde(default, alias = "grossTotalSum")]
    pub gross_total_sum: f64,
    #[serde(default, alias = "servicesCount")]
    pub services_count: u64,
}
