//! Account store - keyed, versioned records with staged transactions
//!
//! Every piece of state (mints, token accounts, hook records) is a
//! [`StoredAccount`] keyed by its [`Address`]. Records are typed through the
//! [`Record`] trait and encoded as JSON inside the account.
//!
//! Writes never touch the store directly. A [`StoreTransaction`] stages
//! creates and updates in an overlay; `commit()` applies them all at once and
//! dropping the transaction discards them:
//!
//! ```text
//! begin() ──► create/save (overlay) ──► commit()  → all writes visible
//!                                   └─► drop       → store unchanged
//! ```

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::address::Address;

/// Errors from the account store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Account already exists: {0}")]
    AlreadyExists(Address),

    #[error("Account not found: {0}")]
    NotFound(Address),

    #[error("Account {address} holds {actual}, expected {expected}")]
    KindMismatch {
        address: Address,
        expected: &'static str,
        actual: String,
    },

    #[error("Account {address} is owned by {actual}, expected {expected}")]
    OwnerMismatch {
        address: Address,
        expected: Address,
        actual: Address,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Typed state that can live in an account
pub trait Record: Serialize + DeserializeOwned {
    /// Type tag written next to the data
    const KIND: &'static str;
}

/// A single account: owner program, type tag, version and encoded data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAccount {
    /// Program allowed to write this account
    pub owner: Address,
    /// Record type tag
    pub kind: String,
    /// Starts at 1, incremented on every write
    pub version: u64,
    /// JSON-encoded record
    pub data: Vec<u8>,
}

impl StoredAccount {
    fn encode<T: Record>(owner: Address, version: u64, record: &T) -> Result<Self, StoreError> {
        Ok(Self {
            owner,
            kind: T::KIND.to_string(),
            version,
            data: serde_json::to_vec(record)?,
        })
    }

    /// Check whether this account holds a `T`
    pub fn is<T: Record>(&self) -> bool {
        self.kind == T::KIND
    }

    /// Decode the record, checking the type tag first
    pub fn decode<T: Record>(&self, address: &Address) -> Result<T, StoreError> {
        if !self.is::<T>() {
            return Err(StoreError::KindMismatch {
                address: *address,
                expected: T::KIND,
                actual: self.kind.clone(),
            });
        }
        Ok(serde_json::from_slice(&self.data)?)
    }

    /// Encoded size of the record
    pub fn data_len(&self) -> usize {
        self.data.len()
    }
}

/// Read-only access to accounts
pub trait AccountView {
    /// Look up an account
    fn account(&self, address: &Address) -> Option<&StoredAccount>;

    /// Whether an account exists
    fn exists(&self, address: &Address) -> bool {
        self.account(address).is_some()
    }

    /// Load a typed record, checking the owning program
    fn load<T: Record>(&self, address: &Address, owner: &Address) -> Result<T, StoreError>
    where
        Self: Sized,
    {
        let account = self
            .account(address)
            .ok_or(StoreError::NotFound(*address))?;

        if account.owner != *owner {
            return Err(StoreError::OwnerMismatch {
                address: *address,
                expected: *owner,
                actual: account.owner,
            });
        }

        account.decode(address)
    }
}

/// In-memory keyed account store
#[derive(Debug, Default, Clone)]
pub struct AccountStore {
    accounts: HashMap<Address, StoredAccount>,
}

impl AccountStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Iterate over all accounts
    pub fn iter(&self) -> impl Iterator<Item = (&Address, &StoredAccount)> {
        self.accounts.iter()
    }

    /// Start a staged transaction
    pub fn begin(&mut self) -> StoreTransaction<'_> {
        StoreTransaction {
            store: self,
            staged: HashMap::new(),
        }
    }
}

impl AccountView for AccountStore {
    fn account(&self, address: &Address) -> Option<&StoredAccount> {
        self.accounts.get(address)
    }
}

/// Staged writes over an [`AccountStore`]
///
/// Reads see staged writes first. Nothing reaches the store until
/// [`commit`](Self::commit).
pub struct StoreTransaction<'a> {
    store: &'a mut AccountStore,
    staged: HashMap<Address, StoredAccount>,
}

impl StoreTransaction<'_> {
    /// Create a new account. Fails if the address is taken.
    pub fn create<T: Record>(
        &mut self,
        address: Address,
        owner: Address,
        record: &T,
    ) -> Result<(), StoreError> {
        if self.exists(&address) {
            return Err(StoreError::AlreadyExists(address));
        }

        let account = StoredAccount::encode(owner, 1, record)?;
        self.staged.insert(address, account);
        Ok(())
    }

    /// Overwrite an existing account. Only the owning program may write,
    /// and the record type cannot change.
    pub fn save<T: Record>(
        &mut self,
        address: Address,
        owner: Address,
        record: &T,
    ) -> Result<(), StoreError> {
        let current = self
            .account(&address)
            .ok_or(StoreError::NotFound(address))?;

        if current.owner != owner {
            return Err(StoreError::OwnerMismatch {
                address,
                expected: current.owner,
                actual: owner,
            });
        }
        if !current.is::<T>() {
            return Err(StoreError::KindMismatch {
                address,
                expected: T::KIND,
                actual: current.kind.clone(),
            });
        }

        let version = current.version + 1;
        let account = StoredAccount::encode(owner, version, record)?;
        self.staged.insert(address, account);
        Ok(())
    }

    /// Number of accounts written so far
    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }

    /// Apply all staged writes. Returns the number of accounts written.
    pub fn commit(self) -> usize {
        let count = self.staged.len();
        self.store.accounts.extend(self.staged);
        count
    }
}

impl AccountView for StoreTransaction<'_> {
    fn account(&self, address: &Address) -> Option<&StoredAccount> {
        self.staged
            .get(address)
            .or_else(|| self.store.accounts.get(address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Counter {
        value: u32,
    }

    impl Record for Counter {
        const KIND: &'static str = "counter";
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Label {
        text: String,
    }

    impl Record for Label {
        const KIND: &'static str = "label";
    }

    fn program() -> Address {
        Address::hash_of(b"program")
    }

    #[test]
    fn test_create_and_commit() {
        let mut store = AccountStore::new();
        let addr = Address::new([1; 32]);

        let mut tx = store.begin();
        tx.create(addr, program(), &Counter { value: 1 }).unwrap();
        assert_eq!(tx.staged_len(), 1);
        assert_eq!(tx.commit(), 1);

        let loaded: Counter = store.load(&addr, &program()).unwrap();
        assert_eq!(loaded, Counter { value: 1 });
        assert_eq!(store.account(&addr).unwrap().version, 1);
    }

    #[test]
    fn test_drop_rolls_back() {
        let mut store = AccountStore::new();
        let addr = Address::new([1; 32]);

        {
            let mut tx = store.begin();
            tx.create(addr, program(), &Counter { value: 1 }).unwrap();
            assert!(tx.exists(&addr));
        }

        assert!(store.is_empty());
    }

    #[test]
    fn test_create_twice_fails() {
        let mut store = AccountStore::new();
        let addr = Address::new([1; 32]);

        let mut tx = store.begin();
        tx.create(addr, program(), &Counter { value: 1 }).unwrap();
        let err = tx.create(addr, program(), &Counter { value: 2 }).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(a) if a == addr));
    }

    #[test]
    fn test_save_increments_version() {
        let mut store = AccountStore::new();
        let addr = Address::new([1; 32]);

        let mut tx = store.begin();
        tx.create(addr, program(), &Counter { value: 1 }).unwrap();
        tx.commit();

        let mut tx = store.begin();
        tx.save(addr, program(), &Counter { value: 2 }).unwrap();
        tx.save(addr, program(), &Counter { value: 3 }).unwrap();
        tx.commit();

        let account = store.account(&addr).unwrap();
        assert_eq!(account.version, 3);
        assert_eq!(account.decode::<Counter>(&addr).unwrap().value, 3);
    }

    #[test]
    fn test_save_rejects_foreign_owner() {
        let mut store = AccountStore::new();
        let addr = Address::new([1; 32]);
        let intruder = Address::hash_of(b"intruder");

        let mut tx = store.begin();
        tx.create(addr, program(), &Counter { value: 1 }).unwrap();
        let err = tx.save(addr, intruder, &Counter { value: 9 }).unwrap_err();
        assert!(matches!(err, StoreError::OwnerMismatch { .. }));
    }

    #[test]
    fn test_kind_mismatch() {
        let mut store = AccountStore::new();
        let addr = Address::new([1; 32]);

        let mut tx = store.begin();
        tx.create(addr, program(), &Counter { value: 1 }).unwrap();
        tx.commit();

        let err = store.load::<Label>(&addr, &program()).unwrap_err();
        assert!(matches!(err, StoreError::KindMismatch { expected: "label", .. }));

        let mut tx = store.begin();
        let err = tx
            .save(addr, program(), &Label { text: "x".into() })
            .unwrap_err();
        assert!(matches!(err, StoreError::KindMismatch { .. }));
    }

    #[test]
    fn test_load_missing_and_wrong_owner() {
        let mut store = AccountStore::new();
        let addr = Address::new([1; 32]);

        assert!(matches!(
            store.load::<Counter>(&addr, &program()),
            Err(StoreError::NotFound(_))
        ));

        let mut tx = store.begin();
        tx.create(addr, program(), &Counter { value: 1 }).unwrap();
        tx.commit();

        assert!(matches!(
            store.load::<Counter>(&addr, &Address::hash_of(b"other")),
            Err(StoreError::OwnerMismatch { .. })
        ));
    }
}
