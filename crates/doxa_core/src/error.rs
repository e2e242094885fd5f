use chrono::{DateTime, Utc};
use thiserror::Error;

/// Ingestion-time validation failures. Local to the offending signal - the
/// agent pipeline itself keeps running.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("feeling content is empty")]
    EmptyContent,

    #[error("feeling source id is nil")]
    NilSource,

    #[error("feeling timestamp {0} is in the future")]
    FutureTimestamp(DateTime<Utc>),

    #[error("feeling field {field} is not finite")]
    NonFinite { field: &'static str },
}
