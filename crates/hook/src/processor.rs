//! Whitelist hook - Config, Capability Descriptor and Admin Mutation API
//!
//! Lifecycle for one token:
//!
//! ```text
//! initialize_config(mint, authority)
//!        │
//!        ▼
//! initialize_extra_account_meta_list(mint)   ← authority signs
//!        │  writes descriptor + empty allow-list
//!        ▼
//! add_to_allowlist / remove_from_allowlist   ← authority signs
//!        │
//!        ▼
//! execute (every transfer, ledger only)
//! ```
//!
//! All writes go through the caller's [`StoreTransaction`]; on error the
//! caller drops it and nothing is applied.

use hookgate_core::{
    token_program_id, AccountView, Address, Mint, StoreError, StoreTransaction, TokenAmount,
    VerifiedSigner,
};

use crate::allowlist::{AllowList, PushOutcome};
use crate::config::HookConfig;
use crate::context::ExecuteAccounts;
use crate::descriptor::{ExtraAccountMeta, ExtraAccountMetaList, Seed};
use crate::error::{HookError, HookResult};
use crate::executor;
use crate::instruction::HookInstruction;
use crate::seeds::{self, ALLOWLIST_SEED};
use crate::settings::HookSettings;
use crate::traits::HookProgram;

/// Transfer hook that only lets tokens reach allow-listed accounts
#[derive(Debug, Clone)]
pub struct WhitelistHook {
    program_id: Address,
    settings: HookSettings,
}

impl Default for WhitelistHook {
    fn default() -> Self {
        Self {
            program_id: seeds::id(),
            settings: HookSettings::default(),
        }
    }
}

impl WhitelistHook {
    /// Create the hook under its well-known program id
    pub fn new(settings: HookSettings) -> HookResult<Self> {
        Self::with_program_id(seeds::id(), settings)
    }

    /// Create the hook under a custom program id
    ///
    /// Fails with `Config` if the settings are inconsistent.
    pub fn with_program_id(program_id: Address, settings: HookSettings) -> HookResult<Self> {
        settings.validate()?;
        Ok(Self {
            program_id,
            settings,
        })
    }

    pub fn settings(&self) -> &HookSettings {
        &self.settings
    }

    /// The extra accounts Execute needs: the allow-list, read-only
    pub fn extra_account_metas() -> HookResult<Vec<ExtraAccountMeta>> {
        Ok(vec![ExtraAccountMeta::new_with_seeds(
            &[Seed::literal(ALLOWLIST_SEED), Seed::AccountKey { index: 1 }],
            false,
            false,
        )?])
    }

    pub fn config_address(&self, mint: &Address) -> HookResult<Address> {
        seeds::config_address(mint, &self.program_id)
    }

    pub fn extra_account_meta_list_address(&self, mint: &Address) -> HookResult<Address> {
        seeds::extra_account_meta_list_address(mint, &self.program_id)
    }

    pub fn allowlist_address(&self, mint: &Address) -> HookResult<Address> {
        seeds::allowlist_address(mint, &self.program_id)
    }

    /// Create the Config naming `authority` as administrator of `mint`
    pub fn initialize_config(
        &self,
        tx: &mut StoreTransaction<'_>,
        mint: Address,
        authority: Address,
        payer: &VerifiedSigner,
    ) -> HookResult<()> {
        tx.load::<Mint>(&mint, &token_program_id())
            .map_err(|e| match e {
                StoreError::NotFound(_) => HookError::invalid_account(mint, "mint does not exist"),
                _ => HookError::invalid_account(mint, "not a token mint"),
            })?;

        let address = self.config_address(&mint)?;
        if tx.exists(&address) {
            return Err(HookError::AlreadyInitialized(address));
        }

        tx.create(address, self.program_id, &HookConfig::new(mint, authority))?;

        tracing::info!(
            mint = %mint,
            authority = %authority,
            payer = %payer.address(),
            "Hook config initialized"
        );
        Ok(())
    }

    /// Write the Capability Descriptor and create the empty allow-list
    pub fn initialize_extra_account_meta_list(
        &self,
        tx: &mut StoreTransaction<'_>,
        mint: Address,
        signer: &VerifiedSigner,
    ) -> HookResult<()> {
        let config = self.config(&*tx, &mint)?;
        config.authorize(signer)?;

        let descriptor_address = self.extra_account_meta_list_address(&mint)?;
        if tx.exists(&descriptor_address) {
            return Err(HookError::AlreadyInitialized(descriptor_address));
        }
        let allowlist_address = self.allowlist_address(&mint)?;
        if tx.exists(&allowlist_address) {
            return Err(HookError::AlreadyInitialized(allowlist_address));
        }

        let descriptor = ExtraAccountMetaList::init(Self::extra_account_metas()?);
        let list = AllowList::new(mint, config.authority, self.settings.initial_capacity);

        tx.create(descriptor_address, self.program_id, &descriptor)?;
        tx.create(allowlist_address, self.program_id, &list)?;

        tracing::info!(
            mint = %mint,
            descriptor = %descriptor_address,
            allowlist = %allowlist_address,
            size = descriptor.declared_size,
            "Capability descriptor initialized"
        );
        Ok(())
    }

    /// Add `address` to the allow-list of `mint`
    pub fn add_to_allowlist(
        &self,
        tx: &mut StoreTransaction<'_>,
        mint: Address,
        address: Address,
        signer: &VerifiedSigner,
    ) -> HookResult<PushOutcome> {
        let (list_address, mut list) = self.authorized_list(tx, &mint, signer)?;

        let outcome = list.push(
            address,
            self.settings.max_entries,
            self.settings.duplicate_policy,
        )?;

        if outcome == PushOutcome::Added {
            tx.save(list_address, self.program_id, &list)?;
            tracing::info!(
                mint = %mint,
                address = %address,
                count = list.len(),
                capacity = list.capacity(),
                "Address added to allow-list"
            );
        } else {
            tracing::debug!(mint = %mint, address = %address, "Address already listed");
        }

        Ok(outcome)
    }

    /// Remove `address` from the allow-list of `mint`
    pub fn remove_from_allowlist(
        &self,
        tx: &mut StoreTransaction<'_>,
        mint: Address,
        address: Address,
        signer: &VerifiedSigner,
    ) -> HookResult<()> {
        let (list_address, mut list) = self.authorized_list(tx, &mint, signer)?;

        list.remove(&address)?;
        tx.save(list_address, self.program_id, &list)?;

        tracing::info!(
            mint = %mint,
            address = %address,
            count = list.len(),
            "Address removed from allow-list"
        );
        Ok(())
    }

    /// Load the Config of `mint`
    pub fn config<V: AccountView>(&self, view: &V, mint: &Address) -> HookResult<HookConfig> {
        let address = self.config_address(mint)?;
        view.load(&address, &self.program_id)
            .map_err(HookError::from_load)
    }

    /// Load and validate the allow-list of `mint`
    pub fn allowlist<V: AccountView>(&self, view: &V, mint: &Address) -> HookResult<AllowList> {
        let address = self.allowlist_address(mint)?;
        let list: AllowList = view
            .load(&address, &self.program_id)
            .map_err(HookError::from_load)?;
        list.validated(&address)
    }

    /// Load and check the Capability Descriptor of `mint`
    pub fn extra_account_meta_list<V: AccountView>(
        &self,
        view: &V,
        mint: &Address,
    ) -> HookResult<ExtraAccountMetaList> {
        let address = self.extra_account_meta_list_address(mint)?;
        let descriptor: ExtraAccountMetaList = view
            .load(&address, &self.program_id)
            .map_err(HookError::from_load)?;
        descriptor.check_layout(&address)?;
        Ok(descriptor)
    }

    /// Whether `address` is allow-listed for `mint`
    pub fn contains<V: AccountView>(
        &self,
        view: &V,
        mint: &Address,
        address: &Address,
    ) -> HookResult<bool> {
        Ok(self.allowlist(view, mint)?.contains(address))
    }

    /// Load the list for mutation after checking the administrator
    fn authorized_list(
        &self,
        tx: &StoreTransaction<'_>,
        mint: &Address,
        signer: &VerifiedSigner,
    ) -> HookResult<(Address, AllowList)> {
        let config = self.config(tx, mint)?;
        let address = self.allowlist_address(mint)?;
        let list = self.allowlist(tx, mint)?;

        config.authorize(signer)?;
        if list.authority() != signer.address() {
            return Err(HookError::Unauthorized {
                signer: *signer.address(),
                authority: *list.authority(),
            });
        }

        Ok((address, list))
    }
}

impl HookProgram for WhitelistHook {
    fn program_id(&self) -> Address {
        self.program_id
    }

    fn name(&self) -> &str {
        "Whitelist"
    }

    fn process_instruction(
        &self,
        tx: &mut StoreTransaction<'_>,
        data: &[u8],
        signer: &VerifiedSigner,
    ) -> HookResult<()> {
        let instruction = HookInstruction::unpack(data)?;
        tracing::debug!(
            hook = self.name(),
            instruction = %instruction.kind(),
            mint = ?instruction.mint().map(|mint| mint.to_string()),
            signer = %signer.address(),
            "Processing instruction"
        );

        match instruction {
            HookInstruction::InitializeConfig { mint, authority } => {
                self.initialize_config(tx, mint, authority, signer)
            }
            HookInstruction::InitializeExtraAccountMetaList { mint } => {
                self.initialize_extra_account_meta_list(tx, mint, signer)
            }
            HookInstruction::AddToAllowList { mint, address } => self
                .add_to_allowlist(tx, mint, address, signer)
                .map(|_| ()),
            HookInstruction::RemoveFromAllowList { mint, address } => {
                self.remove_from_allowlist(tx, mint, address, signer)
            }
            HookInstruction::Execute { .. } => Err(HookError::InvalidInstruction(
                "execute is invoked by the ledger only".to_string(),
            )),
        }
    }

    fn execute(&self, accounts: &ExecuteAccounts<'_>, amount: TokenAmount) -> HookResult<()> {
        executor::execute(&self.program_id, accounts, amount)
    }
}
