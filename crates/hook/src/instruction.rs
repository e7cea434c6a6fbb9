//! Instruction codec
//!
//! Wire layout: an 8-byte discriminator followed by fixed-width arguments
//! (32-byte addresses, little-endian `u64`).
//!
//! ```text
//! admin:   sha256("global:<name>")[..8]                   || args
//! execute: sha256("spl-transfer-hook-interface:execute")[..8] || amount
//! ```
//!
//! Discriminators are part of the external contract and must never change.
//! The allow-list instructions keep their deployed `*_whitelist` names.

use hookgate_core::{Address, ADDRESS_LEN};
use sha2::{Digest, Sha256};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use crate::error::{HookError, HookResult};

/// Preimage of the transfer-hook interface's Execute discriminator
pub const EXECUTE_PREIMAGE: &str = "spl-transfer-hook-interface:execute";

/// Length of every discriminator
pub const DISCRIMINATOR_LEN: usize = 8;

/// Instruction names as they appear on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum InstructionKind {
    InitializeConfig,
    InitializeExtraAccountMetaList,
    #[strum(serialize = "add_to_whitelist")]
    AddToAllowList,
    #[strum(serialize = "remove_from_whitelist")]
    RemoveFromAllowList,
    Execute,
}

impl InstructionKind {
    /// The 8-byte discriminator for this instruction
    pub fn discriminator(&self) -> [u8; DISCRIMINATOR_LEN] {
        let preimage = match self {
            InstructionKind::Execute => EXECUTE_PREIMAGE.to_string(),
            other => format!("global:{}", other),
        };

        let hash = Sha256::digest(preimage.as_bytes());
        let mut discriminator = [0u8; DISCRIMINATOR_LEN];
        discriminator.copy_from_slice(&hash[..DISCRIMINATOR_LEN]);
        discriminator
    }

    /// Look up an instruction by discriminator
    pub fn from_discriminator(bytes: &[u8]) -> Option<Self> {
        Self::iter().find(|kind| kind.discriminator() == bytes)
    }

    /// Length of the arguments following the discriminator
    fn args_len(&self) -> usize {
        match self {
            InstructionKind::InitializeConfig
            | InstructionKind::AddToAllowList
            | InstructionKind::RemoveFromAllowList => 2 * ADDRESS_LEN,
            InstructionKind::InitializeExtraAccountMetaList => ADDRESS_LEN,
            InstructionKind::Execute => 8,
        }
    }
}

/// Instructions understood by the whitelist hook
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookInstruction {
    /// Create the per-token Config naming the administrator
    InitializeConfig { mint: Address, authority: Address },

    /// Write the Capability Descriptor and create the empty allow-list
    InitializeExtraAccountMetaList { mint: Address },

    /// Add a destination account to the allow-list
    AddToAllowList { mint: Address, address: Address },

    /// Remove a destination account from the allow-list
    RemoveFromAllowList { mint: Address, address: Address },

    /// Validate a transfer (ledger only)
    Execute { amount: u64 },
}

impl HookInstruction {
    /// Instruction kind
    pub fn kind(&self) -> InstructionKind {
        match self {
            HookInstruction::InitializeConfig { .. } => InstructionKind::InitializeConfig,
            HookInstruction::InitializeExtraAccountMetaList { .. } => {
                InstructionKind::InitializeExtraAccountMetaList
            }
            HookInstruction::AddToAllowList { .. } => InstructionKind::AddToAllowList,
            HookInstruction::RemoveFromAllowList { .. } => InstructionKind::RemoveFromAllowList,
            HookInstruction::Execute { .. } => InstructionKind::Execute,
        }
    }

    /// Token this instruction applies to (Execute carries it in its accounts)
    pub fn mint(&self) -> Option<&Address> {
        match self {
            HookInstruction::InitializeConfig { mint, .. }
            | HookInstruction::InitializeExtraAccountMetaList { mint }
            | HookInstruction::AddToAllowList { mint, .. }
            | HookInstruction::RemoveFromAllowList { mint, .. } => Some(mint),
            HookInstruction::Execute { .. } => None,
        }
    }

    /// Encode to wire bytes
    pub fn pack(&self) -> Vec<u8> {
        let kind = self.kind();
        let mut data = Vec::with_capacity(DISCRIMINATOR_LEN + kind.args_len());
        data.extend_from_slice(&kind.discriminator());

        match self {
            HookInstruction::InitializeConfig { mint, authority } => {
                data.extend_from_slice(mint.as_ref());
                data.extend_from_slice(authority.as_ref());
            }
            HookInstruction::InitializeExtraAccountMetaList { mint } => {
                data.extend_from_slice(mint.as_ref());
            }
            HookInstruction::AddToAllowList { mint, address }
            | HookInstruction::RemoveFromAllowList { mint, address } => {
                data.extend_from_slice(mint.as_ref());
                data.extend_from_slice(address.as_ref());
            }
            HookInstruction::Execute { amount } => {
                data.extend_from_slice(&amount.to_le_bytes());
            }
        }

        data
    }

    /// Decode from wire bytes
    pub fn unpack(data: &[u8]) -> HookResult<Self> {
        if data.len() < DISCRIMINATOR_LEN {
            return Err(HookError::InvalidInstruction(format!(
                "data too short: {} bytes",
                data.len()
            )));
        }

        let (discriminator, args) = data.split_at(DISCRIMINATOR_LEN);
        let kind = InstructionKind::from_discriminator(discriminator).ok_or_else(|| {
            HookError::InvalidInstruction(format!(
                "unknown discriminator {}",
                hex::encode(discriminator)
            ))
        })?;

        if args.len() != kind.args_len() {
            return Err(HookError::InvalidInstruction(format!(
                "{} expects {} argument bytes, got {}",
                kind,
                kind.args_len(),
                args.len()
            )));
        }

        let instruction = match kind {
            InstructionKind::InitializeConfig => HookInstruction::InitializeConfig {
                mint: read_address(args, 0)?,
                authority: read_address(args, 1)?,
            },
            InstructionKind::InitializeExtraAccountMetaList => {
                HookInstruction::InitializeExtraAccountMetaList {
                    mint: read_address(args, 0)?,
                }
            }
            InstructionKind::AddToAllowList => HookInstruction::AddToAllowList {
                mint: read_address(args, 0)?,
                address: read_address(args, 1)?,
            },
            InstructionKind::RemoveFromAllowList => HookInstruction::RemoveFromAllowList {
                mint: read_address(args, 0)?,
                address: read_address(args, 1)?,
            },
            InstructionKind::Execute => {
                let mut amount = [0u8; 8];
                amount.copy_from_slice(args);
                HookInstruction::Execute {
                    amount: u64::from_le_bytes(amount),
                }
            }
        };

        Ok(instruction)
    }
}

fn read_address(args: &[u8], slot: usize) -> HookResult<Address> {
    let start = slot * ADDRESS_LEN;
    let bytes = args
        .get(start..start + ADDRESS_LEN)
        .ok_or_else(|| HookError::InvalidInstruction(format!("missing address #{}", slot)))?;
    Address::from_slice(bytes).map_err(|e| HookError::InvalidInstruction(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_wire_names() {
        assert_eq!(InstructionKind::InitializeConfig.to_string(), "initialize_config");
        assert_eq!(
            InstructionKind::InitializeExtraAccountMetaList.to_string(),
            "initialize_extra_account_meta_list"
        );
        assert_eq!(InstructionKind::AddToAllowList.to_string(), "add_to_whitelist");
        assert_eq!(
            InstructionKind::RemoveFromAllowList.to_string(),
            "remove_from_whitelist"
        );
    }

    #[test]
    fn test_discriminators_are_distinct() {
        let all: HashSet<_> = InstructionKind::iter().map(|k| k.discriminator()).collect();
        assert_eq!(all.len(), 5);
    }

    #[test]
    fn test_execute_discriminator_matches_interface() {
        let hash = Sha256::digest(EXECUTE_PREIMAGE.as_bytes());
        assert_eq!(InstructionKind::Execute.discriminator(), hash[..8]);
    }

    #[test]
    fn test_add_pack_layout() {
        let mint = Address::new([1; 32]);
        let address = Address::new([2; 32]);
        let data = HookInstruction::AddToAllowList { mint, address }.pack();

        assert_eq!(data.len(), 8 + 64);
        assert_eq!(&data[..8], &InstructionKind::AddToAllowList.discriminator());
        assert_eq!(&data[8..40], mint.as_ref());
        assert_eq!(&data[40..], address.as_ref());

        assert_eq!(
            HookInstruction::unpack(&data).unwrap(),
            HookInstruction::AddToAllowList { mint, address }
        );
    }

    #[test]
    fn test_execute_amount_little_endian() {
        let data = HookInstruction::Execute { amount: 1 }.pack();
        assert_eq!(&data[8..], &[1, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_unpack_rejects_garbage() {
        assert!(matches!(
            HookInstruction::unpack(&[1, 2, 3]),
            Err(HookError::InvalidInstruction(_))
        ));
        assert!(matches!(
            HookInstruction::unpack(&[0u8; 40]),
            Err(HookError::InvalidInstruction(_))
        ));

        let mut data = HookInstruction::InitializeExtraAccountMetaList {
            mint: Address::new([1; 32]),
        }
        .pack();
        data.push(0);
        assert!(matches!(
            HookInstruction::unpack(&data),
            Err(HookError::InvalidInstruction(_))
        ));
    }

    #[test]
    fn test_target_mint() {
        let mint = Address::new([1; 32]);
        let address = Address::new([2; 32]);

        assert_eq!(
            HookInstruction::RemoveFromAllowList { mint, address }.mint(),
            Some(&mint)
        );
        assert_eq!(
            HookInstruction::InitializeConfig {
                mint,
                authority: address
            }
            .mint(),
            Some(&mint)
        );
        assert_eq!(HookInstruction::Execute { amount: 0 }.mint(), None);
    }
}
