//! Ed25519 signers and the verified-signer capability
//!
//! Mutating operations never take a bare address as "the caller". They take a
//! [`VerifiedSigner`], which can only be obtained by checking an Ed25519
//! signature over the operation's message, or from a [`Keypair`] held in
//! process.

use ed25519_dalek::{
    Signature as DalekSignature, Signer as DalekSigner, SigningKey, Verifier, VerifyingKey,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::address::Address;

/// Signature errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Invalid key hex: {0}")]
    InvalidKeyHex(String),

    #[error("Key must be 32 bytes")]
    InvalidKeyLength,

    #[error("Invalid signature hex: {0}")]
    InvalidSignatureHex(String),

    #[error("Signature must be 64 bytes")]
    InvalidSignatureLength,

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(Address),

    #[error("Signature verification failed for {0}")]
    VerificationFailed(Address),
}

/// Ed25519 signature, serialized as hex
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Signature([u8; 64]);

impl Signature {
    /// Raw signature bytes
    pub fn to_bytes(&self) -> [u8; 64] {
        self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", hex::encode(self.0))
    }
}

impl TryFrom<String> for Signature {
    type Error = SignatureError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let bytes =
            hex::decode(&value).map_err(|e| SignatureError::InvalidSignatureHex(e.to_string()))?;
        let array: [u8; 64] = bytes
            .try_into()
            .map_err(|_| SignatureError::InvalidSignatureLength)?;
        Ok(Self(array))
    }
}

impl From<Signature> for String {
    fn from(signature: Signature) -> Self {
        signature.to_string()
    }
}

/// Trait for signers
pub trait Signer: Send + Sync {
    /// Address (public key) of this signer
    fn address(&self) -> Address;

    /// Sign a message
    fn sign(&self, message: &[u8]) -> Signature;
}

/// Ed25519 keypair
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Create from a 32-byte seed (hex-encoded)
    pub fn from_hex(hex_seed: &str) -> Result<Self, SignatureError> {
        let bytes = hex::decode(hex_seed.trim())
            .map_err(|e| SignatureError::InvalidKeyHex(e.to_string()))?;

        let seed: [u8; 32] = bytes
            .try_into()
            .map_err(|_| SignatureError::InvalidKeyLength)?;

        Ok(Self {
            signing_key: SigningKey::from_bytes(&seed),
        })
    }

    /// Generate a new random keypair
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            signing_key: SigningKey::generate(&mut rng),
        }
    }

    /// Export the seed as hex (for storage)
    pub fn seed_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }

    /// Capability for a key held in this process
    pub fn verified(&self) -> VerifiedSigner {
        VerifiedSigner {
            address: self.address(),
        }
    }
}

impl Signer for Keypair {
    fn address(&self) -> Address {
        Address::new(self.signing_key.verifying_key().to_bytes())
    }

    fn sign(&self, message: &[u8]) -> Signature {
        Signature(self.signing_key.sign(message).to_bytes())
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// Proof that `address` authorized the current operation
///
/// There is no public constructor from a bare address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedSigner {
    address: Address,
}

impl VerifiedSigner {
    /// Verify `signature` over `message` by `address`
    pub fn verify(
        address: &Address,
        message: &[u8],
        signature: &Signature,
    ) -> Result<Self, SignatureError> {
        let verifying_key = VerifyingKey::from_bytes(address.as_bytes())
            .map_err(|_| SignatureError::InvalidPublicKey(*address))?;

        let signature = DalekSignature::from_bytes(&signature.0);

        verifying_key
            .verify(message, &signature)
            .map_err(|_| SignatureError::VerificationFailed(*address))?;

        Ok(Self { address: *address })
    }

    /// The verified address
    pub fn address(&self) -> &Address {
        &self.address
    }
}
