//! Journal persistence, reopen and audit

use anyhow::Result;
use hookgate_core::{Address, Keypair, TokenAmount};
use hookgate_events::{ChainError, EventError, JournalReader, JournalStore, GENESIS_HASH};
use hookgate_ledger::{LedgerOperation, SignedOperation};

fn mint_to(key: &Keypair, amount: u64) -> SignedOperation {
    SignedOperation::sign(
        LedgerOperation::MintTo {
            mint: Address::new([1; 32]),
            destination: Address::new([2; 32]),
            amount: TokenAmount::new(amount),
        },
        key,
    )
    .unwrap()
}

#[test]
fn test_append_and_read_back() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let key = Keypair::generate();

    let mut store = JournalStore::open(dir.path())?;
    let first = store.append(&mint_to(&key, 1))?;
    let second = store.append(&mint_to(&key, 2))?;

    assert_eq!(first.sequence, 1);
    assert_eq!(first.prev_hash, GENESIS_HASH);
    assert_eq!(second.prev_hash, first.hash);
    assert_eq!(store.list_files()?.len(), 1);

    let records = JournalReader::from_directory(dir.path())?.read_verified()?;
    assert_eq!(records, vec![first, second]);
    for record in &records {
        assert!(record.operation.verify().is_ok());
    }

    Ok(())
}

#[test]
fn test_reopen_continues_chain() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let key = Keypair::generate();

    let last_hash = {
        let mut store = JournalStore::open(dir.path())?;
        store.append(&mint_to(&key, 1))?.hash
    };

    let mut store = JournalStore::open(dir.path())?;
    assert_eq!(store.next_sequence(), 2);
    let record = store.append(&mint_to(&key, 2))?;
    assert_eq!(record.prev_hash, last_hash);

    let reader = JournalReader::from_directory(dir.path())?;
    assert_eq!(reader.count()?, 2);
    assert!(reader.read_verified().is_ok());

    Ok(())
}

#[test]
fn test_tampered_file_fails_audit() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let key = Keypair::generate();

    let mut store = JournalStore::open(dir.path())?;
    store.append(&mint_to(&key, 1))?;
    store.append(&mint_to(&key, 2))?;
    store.close()?;

    let path = store.list_files()?.remove(0);
    let content = std::fs::read_to_string(&path)?;
    std::fs::write(&path, content.replacen("\"amount\":2", "\"amount\":2000", 1))?;

    let result = JournalReader::from_directory(dir.path())?.read_verified();
    assert!(matches!(
        result,
        Err(EventError::Chain(ChainError::InvalidHash { sequence: 2, .. }))
    ));

    Ok(())
}

#[test]
fn test_garbage_line_reported() -> Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("2026-01-01.jsonl"), "not json\n")?;

    let result = JournalReader::from_directory(dir.path())?.read_all();
    assert!(matches!(result, Err(EventError::InvalidFile { line: 1, .. })));

    Ok(())
}

#[test]
fn test_empty_directory() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let reader = JournalReader::from_directory(dir.path().join("missing"))?;

    assert!(reader.read_verified()?.is_empty());
    assert_eq!(reader.count()?, 0);
    assert!(reader.last_record()?.is_none());

    Ok(())
}
