//! JSONL journal reader - sequential reader for replay and audit

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::{EventError, EventResult};
use crate::hash::verify_chain;
use crate::record::JournalRecord;

/// Sequential journal reader
pub struct JournalReader {
    files: Vec<PathBuf>,
}

impl JournalReader {
    /// Create a new reader from a directory
    pub fn from_directory(path: impl AsRef<Path>) -> EventResult<Self> {
        Ok(Self {
            files: list_journal_files(path.as_ref())?,
        })
    }

    /// Journal files in replay order
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Read all records from all files in order
    pub fn read_all(&self) -> EventResult<Vec<JournalRecord>> {
        let mut records = Vec::new();

        for file_path in &self.files {
            let reader = BufReader::new(File::open(file_path)?);

            for (index, line) in reader.lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let record: JournalRecord =
                    serde_json::from_str(&line).map_err(|e| EventError::InvalidFile {
                        file: file_path.display().to_string(),
                        line: index + 1,
                        reason: e.to_string(),
                    })?;
                records.push(record);
            }
        }

        Ok(records)
    }

    /// Read all records and check the hash chain
    pub fn read_verified(&self) -> EventResult<Vec<JournalRecord>> {
        let records = self.read_all()?;
        verify_chain(&records)?;
        Ok(records)
    }

    /// Get the last record (for prev_hash)
    pub fn last_record(&self) -> EventResult<Option<JournalRecord>> {
        Ok(self.read_all()?.pop())
    }

    /// Count total records across all files
    pub fn count(&self) -> EventResult<usize> {
        let mut count = 0;

        for file_path in &self.files {
            let reader = BufReader::new(File::open(file_path)?);
            for line in reader.lines() {
                if !line?.trim().is_empty() {
                    count += 1;
                }
            }
        }

        Ok(count)
    }
}

/// `*.jsonl` files under `path`, sorted by name (one file per day)
pub(crate) fn list_journal_files(path: &Path) -> EventResult<Vec<PathBuf>> {
    let mut files = Vec::new();

    if path.exists() {
        for entry in std::fs::read_dir(path)? {
            let file_path = entry?.path();
            if file_path.extension().is_some_and(|ext| ext == "jsonl") {
                files.push(file_path);
            }
        }
    }

    files.sort();
    Ok(files)
}
