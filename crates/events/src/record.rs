//! Journal records

use chrono::{DateTime, Utc};
use hookgate_ledger::SignedOperation;
use serde::{Deserialize, Serialize};

use crate::error::EventResult;
use crate::hash::calculate_record_hash;

/// `prev_hash` of the first record
pub const GENESIS_HASH: &str = "GENESIS";

/// One committed operation, linked to its predecessor by hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalRecord {
    /// Starts at 1, strictly increasing
    pub sequence: u64,
    pub prev_hash: String,
    pub hash: String,
    pub recorded_at: DateTime<Utc>,
    pub correlation_id: String,
    pub operation: SignedOperation,
}

impl JournalRecord {
    /// Build and hash a record following `prev_hash`
    pub fn new(
        sequence: u64,
        prev_hash: String,
        operation: SignedOperation,
        recorded_at: DateTime<Utc>,
    ) -> EventResult<Self> {
        let mut record = Self {
            sequence,
            prev_hash,
            hash: String::new(),
            recorded_at,
            correlation_id: operation.correlation_id.clone(),
            operation,
        };
        record.hash = calculate_record_hash(&record)?;
        Ok(record)
    }

    /// Date of the file this record belongs to
    pub fn file_date(&self) -> String {
        self.recorded_at.format("%Y-%m-%d").to_string()
    }
}
