pub mod error;
pub mod types;

pub use error::{GridError, RemoteError, RemoteResult, Result};
pub use types::{ChangeRecord, PaymentStatus, Record, RecordId, Totals, parse_payment_date};
