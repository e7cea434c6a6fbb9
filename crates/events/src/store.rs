//! JSONL journal store - append-only writer
//!
//! One file per UTC day (`YYYY-MM-DD.jsonl`). Each line is a
//! [`JournalRecord`] chained to the previous one by hash. Opening an
//! existing directory continues the chain where it left off.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use hookgate_ledger::SignedOperation;

use crate::error::EventResult;
use crate::reader::{list_journal_files, JournalReader};
use crate::record::{JournalRecord, GENESIS_HASH};

/// Append-only JSONL journal
pub struct JournalStore {
    base_path: PathBuf,
    current_file: Option<BufWriter<File>>,
    current_date: Option<String>,
    next_sequence: u64,
    last_hash: String,
}

impl JournalStore {
    /// Open (or create) a journal at the given path
    pub fn open(base_path: impl AsRef<Path>) -> EventResult<Self> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)?;

        let last = JournalReader::from_directory(&base_path)?.last_record()?;
        let (next_sequence, last_hash) = match last {
            Some(last) => (last.sequence + 1, last.hash),
            None => (1, GENESIS_HASH.to_string()),
        };

        tracing::debug!(
            path = %base_path.display(),
            next_sequence,
            "Journal opened"
        );

        Ok(Self {
            base_path,
            current_file: None,
            current_date: None,
            next_sequence,
            last_hash,
        })
    }

    /// Append a committed operation
    pub fn append(&mut self, operation: &SignedOperation) -> EventResult<JournalRecord> {
        let record = JournalRecord::new(
            self.next_sequence,
            self.last_hash.clone(),
            operation.clone(),
            Utc::now(),
        )?;

        // Rotate file if date changed
        let date = record.file_date();
        if self.current_date.as_ref() != Some(&date) {
            self.rotate_file(&date)?;
        }

        if let Some(ref mut writer) = self.current_file {
            let json = serde_json::to_string(&record)?;
            writeln!(writer, "{}", json)?;
            writer.flush()?;
        }

        self.next_sequence += 1;
        self.last_hash = record.hash.clone();

        tracing::debug!(
            sequence = record.sequence,
            correlation_id = %record.correlation_id,
            "Journal record appended"
        );
        Ok(record)
    }

    /// Sequence number the next record will get
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Rotate to a new file for the given date
    fn rotate_file(&mut self, date: &str) -> EventResult<()> {
        if let Some(ref mut writer) = self.current_file {
            writer.flush()?;
        }

        let file_path = self.base_path.join(format!("{}.jsonl", date));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)?;

        self.current_file = Some(BufWriter::new(file));
        self.current_date = Some(date.to_string());

        Ok(())
    }

    /// List all JSONL files in the journal
    pub fn list_files(&self) -> EventResult<Vec<PathBuf>> {
        list_journal_files(&self.base_path)
    }

    /// Flush and close the current file
    pub fn close(&mut self) -> EventResult<()> {
        if let Some(ref mut writer) = self.current_file {
            writer.flush()?;
        }
        self.current_file = None;
        self.current_date = None;
        Ok(())
    }
}

impl Drop for JournalStore {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
