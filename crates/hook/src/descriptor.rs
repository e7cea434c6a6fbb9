//! Capability Descriptor - the extra accounts a hook needs on Execute
//!
//! The descriptor lives at a derived address every ledger can compute from
//! (hook id, mint). Each entry describes one extra account by the seeds that
//! derive its address, so the ledger can locate it without asking the hook:
//!
//! ```text
//! execute keys: [source, mint, destination, owner, descriptor]
//!                          │
//! Seed::AccountKey(1) ─────┘
//! Seed::Literal("white_list")
//!        │
//!        ▼
//! derive(["white_list", mint], hook_id) → AllowList address
//! ```

use hookgate_core::{derive_address, Address, Record};
use serde::{Deserialize, Serialize};

use crate::error::{HookError, HookResult};
use crate::instruction::{InstructionKind, DISCRIMINATOR_LEN};

/// Packed size of one meta: tag, 32-byte address config, signer and writable flags
pub const EXTRA_ACCOUNT_META_LEN: usize = 35;

/// Room for packed seeds inside the address config
const SEED_CONFIG_LEN: usize = 32;

/// One component of an extra account's derivation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Seed {
    /// Fixed bytes
    Literal { bytes: Vec<u8> },

    /// The key of the execute account at `index`
    AccountKey { index: u8 },
}

impl Seed {
    /// Literal seed from a byte string
    pub fn literal(bytes: &[u8]) -> Self {
        Seed::Literal {
            bytes: bytes.to_vec(),
        }
    }

    /// Bytes this seed occupies when packed (tag, length or index, payload)
    fn packed_len(&self) -> usize {
        match self {
            Seed::Literal { bytes } => 2 + bytes.len(),
            Seed::AccountKey { .. } => 2,
        }
    }
}

/// An extra account required by Execute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraAccountMeta {
    pub seeds: Vec<Seed>,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl ExtraAccountMeta {
    /// Create a meta whose address is derived from `seeds` under the hook id
    pub fn new_with_seeds(seeds: &[Seed], is_signer: bool, is_writable: bool) -> HookResult<Self> {
        if seeds.is_empty() {
            return Err(HookError::InvalidSeeds("no seeds".to_string()));
        }

        let packed: usize = seeds.iter().map(Seed::packed_len).sum();
        if packed > SEED_CONFIG_LEN {
            return Err(HookError::InvalidSeeds(format!(
                "seeds pack to {} bytes (max {})",
                packed, SEED_CONFIG_LEN
            )));
        }

        Ok(Self {
            seeds: seeds.to_vec(),
            is_signer,
            is_writable,
        })
    }

    /// Derive this meta's address from the execute account keys
    pub fn resolve(&self, keys: &[Address], program_id: &Address) -> HookResult<Address> {
        let mut seeds: Vec<&[u8]> = Vec::with_capacity(self.seeds.len());
        for seed in &self.seeds {
            match seed {
                Seed::Literal { bytes } => seeds.push(bytes),
                Seed::AccountKey { index } => {
                    let key = keys.get(*index as usize).ok_or_else(|| {
                        HookError::InvalidSeeds(format!(
                            "account index {} out of range ({} keys)",
                            index,
                            keys.len()
                        ))
                    })?;
                    seeds.push(key.as_ref());
                }
            }
        }

        Ok(derive_address(&seeds, program_id)?)
    }
}

/// An extra account located by the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedMeta {
    pub address: Address,
    pub is_signer: bool,
    pub is_writable: bool,
}

/// The Capability Descriptor record
///
/// Bound to one instruction (Execute) and written once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraAccountMetaList {
    /// Discriminator of the instruction these metas apply to
    pub discriminator: [u8; DISCRIMINATOR_LEN],
    /// Size computed at creation time
    pub declared_size: usize,
    pub metas: Vec<ExtraAccountMeta>,
}

impl Record for ExtraAccountMetaList {
    const KIND: &'static str = "extra_account_meta_list";
}

impl ExtraAccountMetaList {
    /// Account size for `num_metas` entries: discriminator, length, count, metas
    pub const fn size_of(num_metas: usize) -> usize {
        DISCRIMINATOR_LEN + 4 + 4 + num_metas * EXTRA_ACCOUNT_META_LEN
    }

    /// Build a descriptor for the Execute instruction
    pub fn init(metas: Vec<ExtraAccountMeta>) -> Self {
        Self {
            discriminator: InstructionKind::Execute.discriminator(),
            declared_size: Self::size_of(metas.len()),
            metas,
        }
    }

    /// Check the stored layout against the metas it holds
    pub fn check_layout(&self, address: &Address) -> HookResult<()> {
        let expected = Self::size_of(self.metas.len());
        if self.declared_size != expected {
            return Err(HookError::AccountSizeMismatch {
                address: *address,
                expected,
                actual: self.declared_size,
            });
        }

        if self.discriminator != InstructionKind::Execute.discriminator() {
            return Err(HookError::invalid_account(
                *address,
                "descriptor is not bound to Execute",
            ));
        }

        Ok(())
    }

    /// Resolve every meta against the execute account keys
    pub fn resolve(&self, keys: &[Address], program_id: &Address) -> HookResult<Vec<ResolvedMeta>> {
        self.metas
            .iter()
            .map(|meta| {
                Ok(ResolvedMeta {
                    address: meta.resolve(keys, program_id)?,
                    is_signer: meta.is_signer,
                    is_writable: meta.is_writable,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeds::{allowlist_address, id, ALLOWLIST_SEED};

    fn allowlist_meta() -> ExtraAccountMeta {
        ExtraAccountMeta::new_with_seeds(
            &[Seed::literal(ALLOWLIST_SEED), Seed::AccountKey { index: 1 }],
            false,
            false,
        )
        .unwrap()
    }

    #[test]
    fn test_size_of() {
        assert_eq!(ExtraAccountMetaList::size_of(0), 16);
        assert_eq!(ExtraAccountMetaList::size_of(1), 51);
    }

    #[test]
    fn test_resolves_to_allowlist_address() {
        let mint = Address::new([5; 32]);
        let keys = [
            Address::new([1; 32]),
            mint,
            Address::new([2; 32]),
            Address::new([3; 32]),
            Address::new([4; 32]),
        ];

        let list = ExtraAccountMetaList::init(vec![allowlist_meta()]);
        let resolved = list.resolve(&keys, &id()).unwrap();

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].address, allowlist_address(&mint, &id()).unwrap());
        assert!(!resolved[0].is_signer);
        assert!(!resolved[0].is_writable);
    }

    #[test]
    fn test_index_out_of_range() {
        let meta = ExtraAccountMeta::new_with_seeds(&[Seed::AccountKey { index: 9 }], false, false)
            .unwrap();
        let err = meta.resolve(&[Address::new([1; 32])], &id()).unwrap_err();
        assert!(matches!(err, HookError::InvalidSeeds(_)));
    }

    #[test]
    fn test_seed_config_limit() {
        assert!(ExtraAccountMeta::new_with_seeds(&[], false, false).is_err());

        let long = Seed::literal(&[0u8; 31]);
        assert!(matches!(
            ExtraAccountMeta::new_with_seeds(&[long], false, false),
            Err(HookError::InvalidSeeds(_))
        ));
    }

    #[test]
    fn test_check_layout() {
        let addr = Address::new([8; 32]);
        let mut list = ExtraAccountMetaList::init(vec![allowlist_meta()]);
        assert!(list.check_layout(&addr).is_ok());

        list.declared_size = 16;
        assert!(matches!(
            list.check_layout(&addr),
            Err(HookError::AccountSizeMismatch {
                expected: 51,
                actual: 16,
                ..
            })
        ));

        let mut list = ExtraAccountMetaList::init(vec![allowlist_meta()]);
        list.discriminator = InstructionKind::AddToAllowList.discriminator();
        assert!(matches!(
            list.check_layout(&addr),
            Err(HookError::InvalidAccount { .. })
        ));
    }

    #[test]
    fn test_seed_json_shape() {
        let json = serde_json::to_value(Seed::AccountKey { index: 1 }).unwrap();
        assert_eq!(json["type"], "account_key");
        assert_eq!(json["index"], 1);
    }
}
