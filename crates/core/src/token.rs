//! Token state shared by the ledger and transfer hooks

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::amount::TokenAmount;
use crate::store::Record;

/// Program that owns every `Mint` and `TokenAccount`
pub fn token_program_id() -> Address {
    Address::hash_of(b"hookgate:token-program")
}

/// A token definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mint {
    /// Only this key may mint new supply
    pub mint_authority: Address,
    /// Number of fractional digits in UI amounts
    pub decimals: u8,
    /// Total supply in base units
    pub supply: TokenAmount,
    /// Program invoked on every transfer of this token
    pub transfer_hook_program_id: Option<Address>,
}

impl Record for Mint {
    const KIND: &'static str = "mint";
}

/// A balance of one token held by one owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAccount {
    pub mint: Address,
    pub owner: Address,
    pub amount: TokenAmount,
    /// Set by the ledger only while a transfer's hook is running
    #[serde(default)]
    pub transferring: bool,
}

impl TokenAccount {
    /// Create an empty account
    pub fn new(mint: Address, owner: Address) -> Self {
        Self {
            mint,
            owner,
            amount: TokenAmount::ZERO,
            transferring: false,
        }
    }
}

impl Record for TokenAccount {
    const KIND: &'static str = "token_account";
}
