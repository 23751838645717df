//! ERC-777 style token with a granularity, registered in the ERC-1820 registry.
//!
//! The constructor calls `setInterfaceImplementer(this, keccak256("ERC777Token"), this)` on
//! the registry and reverts when the registry is missing. Transfers must be a multiple of the
//! granularity.

use alloy_primitives::{b256, Address, Bytes, B256, U256};

use crate::assembly::{self, Flavour};

pub use crate::token::{balance_slot, TOTAL_SUPPLY};

/// Interface name the token registers itself under.
pub const ERC777_TOKEN_INTERFACE: &str = "ERC777Token";

/// `keccak256("ERC777Token")`.
pub const ERC777_TOKEN_INTERFACE_HASH: B256 =
    b256!("0xac7fbab5f54a3ca8194167523c6753bfeb96a445279294b6125b68cce2177054");

/// Init code deploying a token with `granularity` that mints [`TOTAL_SUPPLY`] to `owner`.
///
/// A zero granularity makes the constructor revert.
pub fn init_code(granularity: U256, owner: Address) -> Bytes {
    assembly::init_code(Flavour::Granular, granularity, owner)
}

/// Code of a deployed advanced token.
pub fn runtime_code() -> Bytes {
    assembly::runtime_code(Flavour::Granular)
}
