//! Per-token hook configuration

use hookgate_core::{Address, Record, VerifiedSigner};
use serde::{Deserialize, Serialize};

use crate::error::{HookError, HookResult};

/// Names the administrator of one token's allow-list
///
/// Created once by `initialize_config`. There is no rotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookConfig {
    pub mint: Address,
    pub authority: Address,
    pub version: u8,
}

impl Record for HookConfig {
    const KIND: &'static str = "hook_config";
}

impl HookConfig {
    /// Current record version
    pub const VERSION: u8 = 1;

    pub fn new(mint: Address, authority: Address) -> Self {
        Self {
            mint,
            authority,
            version: Self::VERSION,
        }
    }

    /// Require `signer` to be the administrator
    pub fn authorize(&self, signer: &VerifiedSigner) -> HookResult<()> {
        if signer.address() != &self.authority {
            return Err(HookError::Unauthorized {
                signer: *signer.address(),
                authority: self.authority,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookgate_core::{Keypair, Signer};

    #[test]
    fn test_authorize() {
        let admin = Keypair::generate();
        let other = Keypair::generate();
        let config = HookConfig::new(Address::new([1; 32]), admin.address());

        assert!(config.authorize(&admin.verified()).is_ok());
        assert!(matches!(
            config.authorize(&other.verified()),
            Err(HookError::Unauthorized { .. })
        ));
    }
}
