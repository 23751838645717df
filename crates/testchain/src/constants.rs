//! Fixed parameters of the test chain.

use alloy_primitives::{uint, U256};

/// Number of accounts generated at genesis.
pub const DEFAULT_ACCOUNT_COUNT: usize = 128;

/// Starting balance of every generated account: 10^26 wei.
pub const DEFAULT_INITIAL_BALANCE: U256 = uint!(100_000_000_000_000_000_000_000_000_U256);

/// Chain id every transaction is signed for.
pub const DEFAULT_CHAIN_ID: u64 = 1337;

/// Gas limit of every block.
pub const DEFAULT_GAS_LIMIT: u64 = 8_000_000;

/// Gas price of every transaction built by the chain, in wei.
pub const DEFAULT_GAS_PRICE: u128 = 1;

/// Seconds between consecutive blocks.
pub const BLOCK_TIME: u64 = 10;

/// Index of the account that deploys contracts.
pub const DEPLOYER_INDEX: usize = 0;

/// Index of the account used as funder and token owner in scenarios.
pub const OWNER_INDEX: usize = 127;

/// Gas of a plain value transfer.
pub const TRANSFER_GAS: u64 = 21_000;
