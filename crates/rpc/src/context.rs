//! Application context - wires everything together

use std::path::{Path, PathBuf};
use std::sync::Arc;

use hookgate_events::{JournalReader, JournalRecord, JournalStore};
use hookgate_hook::{HookSettings, WhitelistHook};
use hookgate_ledger::{LedgerError, SignedOperation, TokenLedger};

/// Application context - ledger, hook program and journal
///
/// State is never stored directly: on start the journal is replayed
/// through a fresh ledger.
pub struct AppContext {
    ledger: TokenLedger,
    hook: Arc<WhitelistHook>,
    journal: JournalStore,
    journal_path: PathBuf,
}

impl AppContext {
    /// Create a new application context
    pub fn new(data_path: impl AsRef<Path>, settings: HookSettings) -> Result<Self, anyhow::Error> {
        let journal_path = data_path.as_ref().join("journal");
        std::fs::create_dir_all(&journal_path)?;

        let hook = Arc::new(WhitelistHook::new(settings)?);
        let mut ledger = TokenLedger::new();
        ledger.register_hook(hook.clone());

        // Replay the journal to rebuild state
        let records = JournalReader::from_directory(&journal_path)?.read_verified()?;
        for record in &records {
            ledger
                .submit(&record.operation)
                .map_err(|source| CommitError::Replay {
                    sequence: record.sequence,
                    source,
                })?;
        }
        tracing::info!(records = records.len(), "Journal replayed");

        let journal = JournalStore::open(&journal_path)?;

        Ok(Self {
            ledger,
            hook,
            journal,
            journal_path,
        })
    }

    /// Apply a signed operation and journal it
    ///
    /// Flow: Verify → Stage (hooks run here) → Append → Commit
    /// A rejected operation is not journaled, and an operation the journal
    /// could not record is not applied.
    pub fn commit(&mut self, signed: SignedOperation) -> Result<JournalRecord, CommitError> {
        let journal = &mut self.journal;
        let record = self
            .ledger
            .submit_with(&signed, || journal.append(&signed).map_err(CommitError::from))?;

        tracing::info!(
            sequence = record.sequence,
            correlation_id = %record.correlation_id,
            kind = %signed.operation.kind(),
            "Operation committed"
        );
        Ok(record)
    }

    pub fn ledger(&self) -> &TokenLedger {
        &self.ledger
    }

    /// The whitelist hook program
    pub fn hook(&self) -> &WhitelistHook {
        &self.hook
    }

    /// Get journal path
    pub fn journal_path(&self) -> &Path {
        &self.journal_path
    }

    /// Get last sequence number
    pub fn last_sequence(&self) -> u64 {
        self.journal.next_sequence() - 1
    }
}

/// Errors during commit
#[derive(Debug, thiserror::Error)]
pub enum CommitError {
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Journal error: {0}")]
    Event(#[from] hookgate_events::EventError),

    #[error("Replay failed at seq {sequence}: {source}")]
    Replay { sequence: u64, source: LedgerError },
}

impl CommitError {
    /// The ledger error behind this failure, if any
    pub fn ledger_error(&self) -> Option<&LedgerError> {
        match self {
            CommitError::Ledger(e) | CommitError::Replay { source: e, .. } => Some(e),
            CommitError::Event(_) => None,
        }
    }
}
