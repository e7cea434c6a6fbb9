//! Gate service - shared access to the application context
//!
//! Queries take the read lock and may run concurrently. Submissions take
//! the write lock, so operations are applied and journaled one at a time.

use std::sync::Arc;

use hookgate_core::{Address, Mint, TokenAmount};
use hookgate_events::{JournalReader, JournalRecord};
use hookgate_hook::{AllowList, HookResult};
use hookgate_ledger::{LedgerResult, SignedOperation};
use tokio::sync::RwLock;

use crate::context::{AppContext, CommitError};

/// Cloneable handle to the application context
#[derive(Clone)]
pub struct GateService {
    ctx: Arc<RwLock<AppContext>>,
}

impl GateService {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx: Arc::new(RwLock::new(ctx)),
        }
    }

    /// Apply and journal a signed operation
    pub async fn submit(&self, signed: SignedOperation) -> Result<JournalRecord, CommitError> {
        let mut ctx = self.ctx.write().await;
        ctx.commit(signed)
    }

    /// Load a mint
    pub async fn mint(&self, mint: &Address) -> LedgerResult<Mint> {
        self.ctx.read().await.ledger().mint(mint)
    }

    /// Balance of a token account
    pub async fn balance(&self, account: &Address) -> LedgerResult<TokenAmount> {
        self.ctx.read().await.ledger().balance(account)
    }

    /// Allow-list of `mint`
    pub async fn allowlist(&self, mint: &Address) -> HookResult<AllowList> {
        let ctx = self.ctx.read().await;
        ctx.hook().allowlist(ctx.ledger().store(), mint)
    }

    /// Whether `address` is allow-listed for `mint`
    pub async fn is_allowed(&self, mint: &Address, address: &Address) -> HookResult<bool> {
        let ctx = self.ctx.read().await;
        ctx.hook().contains(ctx.ledger().store(), mint, address)
    }

    /// Verify the journal's hash chain; returns the number of records
    pub async fn audit(&self) -> Result<usize, hookgate_events::EventError> {
        let ctx = self.ctx.read().await;
        let records = JournalReader::from_directory(ctx.journal_path())?.read_verified()?;
        Ok(records.len())
    }

    pub async fn last_sequence(&self) -> u64 {
        self.ctx.read().await.last_sequence()
    }
}
