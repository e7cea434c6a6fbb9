//! Hook traits - the interface between the ledger and a transfer hook

use hookgate_core::{Address, StoreTransaction, TokenAmount, VerifiedSigner};

use crate::context::ExecuteAccounts;
use crate::error::HookResult;

/// A transfer-hook program
///
/// The ledger calls `execute` on every transfer of a mint that names this
/// program. Execute runs synchronously inside the transfer and any error
/// aborts the whole transfer.
///
/// Administrative instructions arrive through `process_instruction` with a
/// signer already verified by the ledger.
pub trait HookProgram: Send + Sync {
    /// Program id; owns every record the hook creates
    fn program_id(&self) -> Address;

    /// Hook name for logging
    fn name(&self) -> &str;

    /// Handle a client instruction
    fn process_instruction(
        &self,
        tx: &mut StoreTransaction<'_>,
        data: &[u8],
        signer: &VerifiedSigner,
    ) -> HookResult<()>;

    /// Validate a transfer. Must not mutate state.
    fn execute(&self, accounts: &ExecuteAccounts<'_>, amount: TokenAmount) -> HookResult<()>;
}

/// A hook that approves every transfer and has no instructions (for testing)
pub struct NoOpHook {
    program_id: Address,
}

impl NoOpHook {
    pub fn new(program_id: Address) -> Self {
        Self { program_id }
    }
}

impl HookProgram for NoOpHook {
    fn program_id(&self) -> Address {
        self.program_id
    }

    fn name(&self) -> &str {
        "NoOp"
    }

    fn process_instruction(
        &self,
        _tx: &mut StoreTransaction<'_>,
        _data: &[u8],
        _signer: &VerifiedSigner,
    ) -> HookResult<()> {
        Ok(())
    }

    fn execute(&self, _accounts: &ExecuteAccounts<'_>, _amount: TokenAmount) -> HookResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AccountRef;

    #[test]
    fn test_noop_hook() {
        let hook = NoOpHook::new(Address::hash_of(b"noop"));
        assert_eq!(hook.name(), "NoOp");

        let account = |n| AccountRef::readonly(Address::new([n; 32]), None);
        let accounts = ExecuteAccounts {
            source: account(1),
            mint: account(2),
            destination: account(3),
            owner: account(4),
            extra_account_meta_list: account(5),
            extra: vec![],
        };

        assert!(hook.execute(&accounts, TokenAmount::new(1)).is_ok());
        assert_eq!(accounts.keys()[1], Address::new([2; 32]));
    }
}
