//! Hook settings with configurable limits
//!
//! All limits are configurable via a JSON file, not hardcoded.
//! Missing fields fall back to their defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{HookError, HookResult};

/// Largest account the ledger will allocate (10 MiB)
pub const MAX_ACCOUNT_DATA_LEN: usize = 10 * 1024 * 1024;

/// Fixed part of an allow-list account: discriminator, mint, authority,
/// capacity, count and the entry vector's length prefix
pub const ALLOWLIST_HEADER_LEN: usize = 8 + 32 + 32 + 4 + 4 + 4;

/// Bytes per allow-list entry
pub const ALLOWLIST_ENTRY_LEN: usize = 32;

/// Most entries that fit in a maximum-size account
pub const MAX_ALLOWLIST_ENTRIES: usize =
    (MAX_ACCOUNT_DATA_LEN - ALLOWLIST_HEADER_LEN) / ALLOWLIST_ENTRY_LEN;

/// Configuration for the whitelist hook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookSettings {
    /// Entries reserved when the allow-list is created
    #[serde(default = "default_initial_capacity")]
    pub initial_capacity: usize,

    /// Hard upper bound on allow-list entries
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// What `add` does with an address that is already listed
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
}

/// Policy for adding an address that is already in the allow-list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Fail with `AlreadyPresent` (DEFAULT)
    #[default]
    Reject,

    /// Succeed without changing the list
    Ignore,
}

// Default value functions for serde
fn default_initial_capacity() -> usize {
    10
}

fn default_max_entries() -> usize {
    MAX_ALLOWLIST_ENTRIES
}

impl Default for HookSettings {
    fn default() -> Self {
        Self {
            initial_capacity: default_initial_capacity(),
            max_entries: default_max_entries(),
            duplicate_policy: DuplicatePolicy::default(),
        }
    }
}

impl HookSettings {
    /// Load settings from a JSON file
    pub fn from_file(path: &Path) -> HookResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| HookError::Config(format!("{}: {}", path.display(), e)))?;
        let settings: Self = serde_json::from_str(&content)
            .map_err(|e| HookError::Config(format!("{}: {}", path.display(), e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check that the limits are consistent
    pub fn validate(&self) -> HookResult<()> {
        if self.max_entries == 0 || self.max_entries > MAX_ALLOWLIST_ENTRIES {
            return Err(HookError::Config(format!(
                "max_entries must be between 1 and {}, got {}",
                MAX_ALLOWLIST_ENTRIES, self.max_entries
            )));
        }
        if self.initial_capacity > self.max_entries {
            return Err(HookError::Config(format!(
                "initial_capacity {} exceeds max_entries {}",
                self.initial_capacity, self.max_entries
            )));
        }
        Ok(())
    }

    /// Override the entry limit
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self.initial_capacity = self.initial_capacity.min(max_entries);
        self
    }

    /// Override the duplicate policy
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }
}
