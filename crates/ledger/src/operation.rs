//! Signed ledger operations
//!
//! Every state change enters the ledger as a [`SignedOperation`]: the
//! operation, the signer's address, a correlation id and an Ed25519
//! signature over the canonical JSON of those three fields. Verifying the
//! signature is the only way to obtain the [`VerifiedSigner`] the ledger
//! and hooks check authority against.

use hookgate_core::{Address, Signature, Signer, TokenAmount, VerifiedSigner};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::error::LedgerResult;

/// A state change requested by a signer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerOperation {
    /// Create the mint at `mint_address(signer, name)`; the signer becomes
    /// the mint authority
    CreateMint {
        name: String,
        decimals: u8,
        transfer_hook_program_id: Option<Address>,
    },

    /// Create the associated token account of (owner, mint)
    CreateAccount { owner: Address, mint: Address },

    /// Issue new supply (mint authority only)
    MintTo {
        mint: Address,
        destination: Address,
        amount: TokenAmount,
    },

    /// Checked transfer; the signer must own `source`
    Transfer {
        source: Address,
        mint: Address,
        destination: Address,
        amount: TokenAmount,
        decimals: u8,
    },

    /// Client instruction for a hook program
    Invoke {
        program_id: Address,
        #[serde(with = "hex_data")]
        data: Vec<u8>,
    },
}

/// Operation kinds for logging and the journal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum OperationKind {
    CreateMint,
    CreateAccount,
    MintTo,
    Transfer,
    Invoke,
}

impl LedgerOperation {
    pub fn kind(&self) -> OperationKind {
        match self {
            LedgerOperation::CreateMint { .. } => OperationKind::CreateMint,
            LedgerOperation::CreateAccount { .. } => OperationKind::CreateAccount,
            LedgerOperation::MintTo { .. } => OperationKind::MintTo,
            LedgerOperation::Transfer { .. } => OperationKind::Transfer,
            LedgerOperation::Invoke { .. } => OperationKind::Invoke,
        }
    }
}

/// The signed fields, in signing order
#[derive(Serialize)]
struct SignablePayload<'a> {
    operation: &'a LedgerOperation,
    signer: &'a Address,
    correlation_id: &'a str,
}

impl SignablePayload<'_> {
    /// Serialize to canonical JSON bytes for signing
    fn to_bytes(&self) -> LedgerResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// An operation with its signer's signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedOperation {
    pub operation: LedgerOperation,
    pub signer: Address,
    pub correlation_id: String,
    pub signature: Signature,
}

impl SignedOperation {
    /// Sign `operation` under a fresh correlation id
    pub fn sign<S: Signer + ?Sized>(operation: LedgerOperation, signer: &S) -> LedgerResult<Self> {
        Self::sign_with_id(operation, signer, uuid::Uuid::new_v4().to_string())
    }

    /// Sign `operation` under the given correlation id
    pub fn sign_with_id<S: Signer + ?Sized>(
        operation: LedgerOperation,
        signer: &S,
        correlation_id: String,
    ) -> LedgerResult<Self> {
        let address = signer.address();
        let payload = SignablePayload {
            operation: &operation,
            signer: &address,
            correlation_id: &correlation_id,
        }
        .to_bytes()?;

        Ok(Self {
            signature: signer.sign(&payload),
            operation,
            signer: address,
            correlation_id,
        })
    }

    /// Check the signature and return the signer capability
    pub fn verify(&self) -> LedgerResult<VerifiedSigner> {
        let payload = SignablePayload {
            operation: &self.operation,
            signer: &self.signer,
            correlation_id: &self.correlation_id,
        }
        .to_bytes()?;

        Ok(VerifiedSigner::verify(
            &self.signer,
            &payload,
            &self.signature,
        )?)
    }
}

/// Hex encoding for instruction bytes
mod hex_data {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;
    use hookgate_core::Keypair;

    fn transfer() -> LedgerOperation {
        LedgerOperation::Transfer {
            source: Address::new([1; 32]),
            mint: Address::new([2; 32]),
            destination: Address::new([3; 32]),
            amount: TokenAmount::new(5),
            decimals: 9,
        }
    }

    #[test]
    fn test_sign_and_verify() {
        let key = Keypair::generate();
        let signed = SignedOperation::sign(transfer(), &key).unwrap();

        let verified = signed.verify().unwrap();
        assert_eq!(verified.address(), &key.address());
        assert!(!signed.correlation_id.is_empty());
    }

    #[test]
    fn test_tampered_operation_fails() {
        let key = Keypair::generate();
        let mut signed = SignedOperation::sign(transfer(), &key).unwrap();

        if let LedgerOperation::Transfer { amount, .. } = &mut signed.operation {
            *amount = TokenAmount::new(500);
        }

        assert!(matches!(signed.verify(), Err(LedgerError::Signature(_))));
    }

    #[test]
    fn test_claimed_signer_must_match() {
        let key = Keypair::generate();
        let mut signed = SignedOperation::sign(transfer(), &key).unwrap();
        signed.signer = Keypair::generate().address();

        assert!(signed.verify().is_err());
    }

    #[test]
    fn test_json_shape() {
        let key = Keypair::generate();
        let op = LedgerOperation::Invoke {
            program_id: Address::new([9; 32]),
            data: vec![0xde, 0xad],
        };
        let signed = SignedOperation::sign_with_id(op, &key, "CORR-1".to_string()).unwrap();

        let json = serde_json::to_value(&signed).unwrap();
        assert_eq!(json["operation"]["type"], "invoke");
        assert_eq!(json["operation"]["data"], "dead");
        assert_eq!(json["correlation_id"], "CORR-1");

        let back: SignedOperation = serde_json::from_value(json).unwrap();
        assert_eq!(back, signed);
        assert!(back.verify().is_ok());
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(transfer().kind().to_string(), "transfer");
        assert_eq!(OperationKind::MintTo.to_string(), "mint_to");
    }
}
