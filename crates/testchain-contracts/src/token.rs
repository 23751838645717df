//! ERC-20 style token with a fixed supply and configurable decimals.

use alloy_primitives::{keccak256, uint, Address, Bytes, U256};

use crate::assembly::{self, Flavour};

/// Supply minted to the owner at construction: 10^8 whole tokens of 18 decimals.
pub const TOTAL_SUPPLY: U256 = uint!(100_000_000_000_000_000_000_000_000_U256);

/// Storage slot holding the total supply.
pub const TOTAL_SUPPLY_SLOT: u8 = 0;

/// Storage slot holding `decimals` (or `granularity` for the advanced token).
pub const PARAMETER_SLOT: u8 = 1;

/// Base slot of the balances mapping.
pub const BALANCES_SLOT: u8 = 2;

/// Storage slot holding the balance of `owner`.
pub fn balance_slot(owner: Address) -> U256 {
    let mut preimage = [0u8; 64];
    preimage[..32].copy_from_slice(owner.into_word().as_slice());
    preimage[32..].copy_from_slice(&U256::from(BALANCES_SLOT).to_be_bytes::<32>());
    U256::from_be_bytes(keccak256(preimage).0)
}

/// Init code deploying a token with `decimals` that mints [`TOTAL_SUPPLY`] to `owner`.
///
/// The constructor emits `Transfer(0, owner, supply)` and rejects value transfers.
pub fn init_code(decimals: u8, owner: Address) -> Bytes {
    assembly::init_code(Flavour::Fixed, U256::from(decimals), owner)
}

/// Init code carrying a raw `decimals` word, for exercising constructor validation.
///
/// Values above 255 make the constructor revert.
pub fn init_code_unchecked(decimals: U256, owner: Address) -> Bytes {
    assembly::init_code(Flavour::Fixed, decimals, owner)
}

/// Code of a deployed token.
pub fn runtime_code() -> Bytes {
    assembly::runtime_code(Flavour::Fixed)
}
