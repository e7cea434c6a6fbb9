//! Address - 32-byte account identity and deterministic derivation
//!
//! Every stored account, program and signer is identified by an [`Address`].
//! Ed25519 public keys are addresses, so a signer's verifying key is its identity.
//!
//! Program-owned records live at addresses derived from a namespace tag, the
//! token identity and the owning program:
//!
//! ```text
//! address = sha256(seed_0 || .. || seed_n || program_id || "ProgramDerivedAddress")
//! ```
//!
//! Anyone who knows the seeds can locate a record without a lookup service.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length of an address in bytes
pub const ADDRESS_LEN: usize = 32;

/// Maximum number of seeds accepted by [`derive_address`]
pub const MAX_SEEDS: usize = 16;

/// Maximum length of a single seed
pub const MAX_SEED_LEN: usize = 32;

const DERIVATION_MARKER: &[u8] = b"ProgramDerivedAddress";

/// Errors that can occur when parsing or deriving addresses
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Invalid address hex: {0}")]
    InvalidHex(String),

    #[error("Address must be 32 bytes, got {0}")]
    InvalidLength(usize),

    #[error("Too many seeds: {0} (max 16)")]
    TooManySeeds(usize),

    #[error("Seed {index} is {len} bytes (max 32)")]
    SeedTooLong { index: usize, len: usize },
}

/// A 32-byte account identity
///
/// Serialized as lowercase hex.
///
/// # Example
/// ```
/// use hookgate_core::Address;
///
/// let addr = Address::new([7u8; 32]);
/// let parsed: Address = addr.to_string().parse().unwrap();
/// assert_eq!(addr, parsed);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// Create an address from raw bytes
    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Create an address from a byte slice of exactly 32 bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AddressError> {
        let array: [u8; ADDRESS_LEN] = bytes
            .try_into()
            .map_err(|_| AddressError::InvalidLength(bytes.len()))?;
        Ok(Self(array))
    }

    /// Fixed identity computed from a label (used for program ids)
    pub fn hash_of(label: &[u8]) -> Self {
        Self(Sha256::digest(label).into())
    }

    /// Borrow the raw bytes
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Copy out the raw bytes
    #[inline]
    pub const fn to_bytes(self) -> [u8; ADDRESS_LEN] {
        self.0
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

/// Derive a program-owned address from seeds
///
/// Deterministic: the same seeds and program always give the same address.
pub fn derive_address(seeds: &[&[u8]], program_id: &Address) -> Result<Address, AddressError> {
    if seeds.len() > MAX_SEEDS {
        return Err(AddressError::TooManySeeds(seeds.len()));
    }

    let mut hasher = Sha256::new();
    for (index, seed) in seeds.iter().enumerate() {
        if seed.len() > MAX_SEED_LEN {
            return Err(AddressError::SeedTooLong {
                index,
                len: seed.len(),
            });
        }
        hasher.update(seed);
    }
    hasher.update(program_id.as_bytes());
    hasher.update(DERIVATION_MARKER);

    Ok(Address(hasher.finalize().into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_parse_roundtrip() {
        let addr = Address::hash_of(b"some-label");
        let text = addr.to_string();
        assert_eq!(text.len(), 64);
        assert_eq!(text.parse::<Address>().unwrap(), addr);
        assert_eq!(format!("0x{}", text).parse::<Address>().unwrap(), addr);
    }

    #[test]
    fn test_invalid_hex_rejected() {
        assert!(matches!(
            "not-hex".parse::<Address>(),
            Err(AddressError::InvalidHex(_))
        ));
        assert!(matches!(
            "abcd".parse::<Address>(),
            Err(AddressError::InvalidLength(2))
        ));
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let program = Address::hash_of(b"program");
        let mint = Address::new([1u8; 32]);

        let a = derive_address(&[b"white_list", mint.as_ref()], &program).unwrap();
        let b = derive_address(&[b"white_list", mint.as_ref()], &program).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_derivation_separates_namespaces() {
        let program = Address::hash_of(b"program");
        let other_program = Address::hash_of(b"other");
        let mint = Address::new([1u8; 32]);
        let other_mint = Address::new([2u8; 32]);

        let base = derive_address(&[b"white_list", mint.as_ref()], &program).unwrap();
        let by_tag = derive_address(&[b"extra-account-metas", mint.as_ref()], &program).unwrap();
        let by_mint = derive_address(&[b"white_list", other_mint.as_ref()], &program).unwrap();
        let by_program = derive_address(&[b"white_list", mint.as_ref()], &other_program).unwrap();

        assert_ne!(base, by_tag);
        assert_ne!(base, by_mint);
        assert_ne!(base, by_program);
    }

    #[test]
    fn test_seed_limits() {
        let program = Address::hash_of(b"program");
        let long = [0u8; 33];
        assert_eq!(
            derive_address(&[&long], &program),
            Err(AddressError::SeedTooLong { index: 0, len: 33 })
        );

        let seed: &[u8] = b"x";
        let seeds = vec![seed; 17];
        assert_eq!(
            derive_address(&seeds, &program),
            Err(AddressError::TooManySeeds(17))
        );
    }

    #[test]
    fn test_serde_as_hex_string() {
        let addr = Address::new([0xab; 32]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", "ab".repeat(32)));
        let parsed: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, addr);
    }
}
