//! Hash chain utilities for journal integrity

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::error::EventResult;
use crate::record::{JournalRecord, GENESIS_HASH};

/// Calculate SHA256 hash of record content (excluding the hash field itself)
pub fn calculate_record_hash(record: &JournalRecord) -> EventResult<String> {
    let mut hasher = Sha256::new();

    hasher.update(record.sequence.to_le_bytes());
    hasher.update(record.prev_hash.as_bytes());
    hasher.update(record.recorded_at.to_rfc3339().as_bytes());
    hasher.update(record.correlation_id.as_bytes());
    hasher.update(serde_json::to_vec(&record.operation)?);

    Ok(hex::encode(hasher.finalize()))
}

/// Verify hash chain integrity
pub fn verify_chain(records: &[JournalRecord]) -> EventResult<()> {
    let mut prev_hash = GENESIS_HASH.to_string();
    let mut expected_sequence = 1;

    for record in records {
        if record.sequence != expected_sequence {
            return Err(ChainError::InvalidSequence {
                expected: expected_sequence,
                actual: record.sequence,
            }
            .into());
        }

        if record.prev_hash != prev_hash {
            return Err(ChainError::BrokenLink {
                sequence: record.sequence,
                expected: prev_hash,
                actual: record.prev_hash.clone(),
            }
            .into());
        }

        let calculated = calculate_record_hash(record)?;
        if record.hash != calculated {
            return Err(ChainError::InvalidHash {
                sequence: record.sequence,
                expected: calculated,
                actual: record.hash.clone(),
            }
            .into());
        }

        if record.correlation_id != record.operation.correlation_id {
            return Err(ChainError::CorrelationMismatch {
                sequence: record.sequence,
            }
            .into());
        }

        prev_hash = record.hash.clone();
        expected_sequence += 1;
    }

    Ok(())
}

/// Errors in hash chain verification
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("Broken link at seq {sequence}: expected prev_hash '{expected}', got '{actual}'")]
    BrokenLink {
        sequence: u64,
        expected: String,
        actual: String,
    },

    #[error("Invalid hash at seq {sequence}: expected '{expected}', got '{actual}'")]
    InvalidHash {
        sequence: u64,
        expected: String,
        actual: String,
    },

    #[error("Invalid sequence: expected {expected}, got {actual}")]
    InvalidSequence { expected: u64, actual: u64 },

    #[error("Correlation id at seq {sequence} does not match its operation")]
    CorrelationMismatch { sequence: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EventError;
    use chrono::Utc;
    use hookgate_core::{Address, Keypair, TokenAmount};
    use hookgate_ledger::{LedgerOperation, SignedOperation};

    fn create_record(sequence: u64, prev_hash: &str) -> JournalRecord {
        let key = Keypair::generate();
        let op = LedgerOperation::MintTo {
            mint: Address::new([1; 32]),
            destination: Address::new([2; 32]),
            amount: TokenAmount::new(100),
        };
        let signed = SignedOperation::sign(op, &key).unwrap();
        JournalRecord::new(sequence, prev_hash.to_string(), signed, Utc::now()).unwrap()
    }

    #[test]
    fn test_hash_deterministic() {
        let record = create_record(1, GENESIS_HASH);
        assert_eq!(
            calculate_record_hash(&record).unwrap(),
            calculate_record_hash(&record).unwrap()
        );
        assert_eq!(record.hash, calculate_record_hash(&record).unwrap());
    }

    #[test]
    fn test_verify_valid_chain() {
        let r1 = create_record(1, GENESIS_HASH);
        let r2 = create_record(2, &r1.hash);
        let r3 = create_record(3, &r2.hash);

        assert!(verify_chain(&[r1, r2, r3]).is_ok());
        assert!(verify_chain(&[]).is_ok());
    }

    #[test]
    fn test_verify_broken_chain() {
        let r1 = create_record(1, GENESIS_HASH);
        let r2 = create_record(2, "wrong_hash");

        assert!(matches!(
            verify_chain(&[r1, r2]),
            Err(EventError::Chain(ChainError::BrokenLink { sequence: 2, .. }))
        ));
    }

    #[test]
    fn test_verify_tampered_operation() {
        let r1 = create_record(1, GENESIS_HASH);
        let mut r2 = create_record(2, &r1.hash);
        if let LedgerOperation::MintTo { amount, .. } = &mut r2.operation.operation {
            *amount = TokenAmount::new(1_000_000);
        }

        assert!(matches!(
            verify_chain(&[r1, r2]),
            Err(EventError::Chain(ChainError::InvalidHash { sequence: 2, .. }))
        ));
    }

    #[test]
    fn test_verify_sequence_gap() {
        let r1 = create_record(1, GENESIS_HASH);
        let r3 = create_record(3, &r1.hash);

        assert!(matches!(
            verify_chain(&[r1, r3]),
            Err(EventError::Chain(ChainError::InvalidSequence {
                expected: 2,
                actual: 3
            }))
        ));
    }
}
