//! Derivation seeds for hook-owned records
//!
//! These seeds are part of the external contract: the ledger and clients
//! compute the same addresses from (tag, mint, program id) with no registry.

use hookgate_core::{derive_address, Address};

use crate::error::HookResult;

/// Namespace tag of the per-token Config record
pub const CONFIG_SEED: &[u8] = b"hook-config";

/// Namespace tag of the Capability Descriptor (shared by every transfer hook)
pub const EXTRA_ACCOUNT_METAS_SEED: &[u8] = b"extra-account-metas";

/// Namespace tag of the per-token allow-list
pub const ALLOWLIST_SEED: &[u8] = b"white_list";

/// Program id of the whitelist transfer hook
pub fn id() -> Address {
    Address::hash_of(b"hookgate:transfer-hook:whitelist")
}

/// Address of the Config record for `mint`
pub fn config_address(mint: &Address, program_id: &Address) -> HookResult<Address> {
    Ok(derive_address(&[CONFIG_SEED, mint.as_ref()], program_id)?)
}

/// Address of the Capability Descriptor for `mint`
///
/// Any ledger can compute this for any hook program.
pub fn extra_account_meta_list_address(mint: &Address, program_id: &Address) -> HookResult<Address> {
    Ok(derive_address(
        &[EXTRA_ACCOUNT_METAS_SEED, mint.as_ref()],
        program_id,
    )?)
}

/// Address of the allow-list for `mint`
pub fn allowlist_address(mint: &Address, program_id: &Address) -> HookResult<Address> {
    Ok(derive_address(&[ALLOWLIST_SEED, mint.as_ref()], program_id)?)
}
