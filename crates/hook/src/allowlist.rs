//! AllowList - the per-token set of approved destination accounts
//!
//! Entries are kept in a vector (the stored form) plus a hashed index from
//! address to position, rebuilt whenever a list is loaded. Membership and
//! removal are O(1) regardless of list size.
//!
//! Invariants checked on load:
//! - `count == entries.len()`
//! - `count <= capacity <= MAX_ALLOWLIST_ENTRIES`
//! - entries are distinct

use std::collections::HashMap;

use hookgate_core::{Address, Record};
use serde::{Deserialize, Serialize};

use crate::error::{HookError, HookResult};
use crate::settings::{
    DuplicatePolicy, ALLOWLIST_ENTRY_LEN, ALLOWLIST_HEADER_LEN, MAX_ALLOWLIST_ENTRIES,
};

/// Allow-list record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllowList {
    mint: Address,
    authority: Address,
    capacity: usize,
    count: usize,
    entries: Vec<Address>,
    #[serde(skip)]
    index: HashMap<Address, usize>,
}

impl Record for AllowList {
    const KIND: &'static str = "allow_list";
}

impl PartialEq for AllowList {
    fn eq(&self, other: &Self) -> bool {
        self.mint == other.mint
            && self.authority == other.authority
            && self.capacity == other.capacity
            && self.entries == other.entries
    }
}

impl Eq for AllowList {}

/// Outcome of [`AllowList::push`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Added,
    /// Already listed and the policy is `Ignore`
    Unchanged,
}

impl AllowList {
    /// Create an empty list
    pub fn new(mint: Address, authority: Address, capacity: usize) -> Self {
        Self {
            mint,
            authority,
            capacity,
            count: 0,
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Check the invariants of a freshly decoded list and rebuild its index
    pub fn validated(mut self, address: &Address) -> HookResult<Self> {
        if self.count != self.entries.len() {
            return Err(HookError::AccountSizeMismatch {
                address: *address,
                expected: self.count,
                actual: self.entries.len(),
            });
        }
        if self.count > self.capacity || self.capacity > MAX_ALLOWLIST_ENTRIES {
            return Err(HookError::AccountSizeMismatch {
                address: *address,
                expected: Self::space_for(self.capacity.min(MAX_ALLOWLIST_ENTRIES)),
                actual: Self::space_for(self.count.max(self.capacity)),
            });
        }

        self.index = HashMap::with_capacity(self.entries.len());
        for (position, entry) in self.entries.iter().enumerate() {
            if self.index.insert(*entry, position).is_some() {
                return Err(HookError::AccountSizeMismatch {
                    address: *address,
                    expected: self.count,
                    actual: position,
                });
            }
        }

        Ok(self)
    }

    /// Account size needed for `capacity` entries
    pub const fn space_for(capacity: usize) -> usize {
        ALLOWLIST_HEADER_LEN + capacity * ALLOWLIST_ENTRY_LEN
    }

    pub fn mint(&self) -> &Address {
        &self.mint
    }

    /// Administrator recorded at creation (mirrors the Config)
    pub fn authority(&self) -> &Address {
        &self.authority
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Entries in storage order
    pub fn entries(&self) -> &[Address] {
        &self.entries
    }

    /// Allocated account size
    pub fn data_len(&self) -> usize {
        Self::space_for(self.capacity)
    }

    /// Membership test
    pub fn contains(&self, address: &Address) -> bool {
        self.index.contains_key(address)
    }

    /// Append `address`, doubling capacity when full (capped at `max_entries`)
    pub fn push(
        &mut self,
        address: Address,
        max_entries: usize,
        policy: DuplicatePolicy,
    ) -> HookResult<PushOutcome> {
        if self.contains(&address) {
            return match policy {
                DuplicatePolicy::Reject => Err(HookError::AlreadyPresent(address)),
                DuplicatePolicy::Ignore => Ok(PushOutcome::Unchanged),
            };
        }

        if self.count >= max_entries {
            return Err(HookError::CapacityExceeded { max: max_entries });
        }

        if self.count == self.capacity {
            let grown = (self.capacity * 2).max(1).min(max_entries);
            tracing::debug!(
                mint = %self.mint,
                from = self.capacity,
                to = grown,
                "Growing allow-list"
            );
            self.capacity = grown;
            self.entries.reserve(grown - self.count);
        }

        self.index.insert(address, self.entries.len());
        self.entries.push(address);
        self.count += 1;
        Ok(PushOutcome::Added)
    }

    /// Swap-remove `address`. Capacity is kept.
    pub fn remove(&mut self, address: &Address) -> HookResult<()> {
        let position = self
            .index
            .remove(address)
            .ok_or(HookError::NotFound(*address))?;

        self.entries.swap_remove(position);
        if let Some(moved) = self.entries.get(position) {
            self.index.insert(*moved, position);
        }
        self.count -= 1;
        Ok(())
    }
}
