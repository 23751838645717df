use alloy_primitives::{B256, U256};
use serde::{Deserialize, Serialize};

use crate::{
    constants::{
        DEFAULT_ACCOUNT_COUNT, DEFAULT_CHAIN_ID, DEFAULT_GAS_LIMIT, DEFAULT_GAS_PRICE,
        DEFAULT_INITIAL_BALANCE, OWNER_INDEX, TRANSFER_GAS,
    },
    Result, TestChainError,
};

/// Parameters a [`TestChain`](crate::TestChain) is built from.
///
/// The defaults reproduce the classic simulated backend: 128 accounts holding 10^26 wei each,
/// chain id 1337, an 8M block gas limit and a gas price of 1 wei.
///
/// # Builder Pattern
///
/// ```rust,ignore
/// let config = ChainConfig::default()
///     .with_chain_id(31337)
///     .with_key_seed(B256::repeat_byte(0x42));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChainConfig {
    /// Number of funded accounts created at genesis.
    ///
    /// Must cover [`OWNER_INDEX`], the highest account index scenarios rely on.
    pub account_count: usize,

    /// Genesis balance of every account, in wei.
    pub initial_balance: U256,

    /// Chain id transactions are signed for. Fixed for the lifetime of the chain.
    pub chain_id: u64,

    /// Gas limit of every block.
    pub gas_limit: u64,

    /// Gas price of every transaction built by the chain, in wei.
    pub gas_price: u128,

    /// Timestamp of the genesis block.
    pub genesis_timestamp: u64,

    /// Derive account keys from this seed instead of the OS random number generator.
    ///
    /// Two chains built with the same seed share account addresses.
    pub key_seed: Option<B256>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            account_count: DEFAULT_ACCOUNT_COUNT,
            initial_balance: DEFAULT_INITIAL_BALANCE,
            chain_id: DEFAULT_CHAIN_ID,
            gas_limit: DEFAULT_GAS_LIMIT,
            gas_price: DEFAULT_GAS_PRICE,
            genesis_timestamp: 0,
            key_seed: None,
        }
    }
}

impl ChainConfig {
    /// Parse a configuration from JSON. Missing fields take their default value.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| TestChainError::InvalidConfig(err.to_string()))
    }

    /// Check the configuration can back a chain.
    pub fn validate(&self) -> Result<()> {
        if self.account_count <= OWNER_INDEX {
            return Err(TestChainError::InvalidConfig(format!(
                "account count {} does not reach the owner account index {OWNER_INDEX}",
                self.account_count
            )));
        }
        if self.chain_id == 0 {
            return Err(TestChainError::InvalidConfig("chain id must not be zero".into()));
        }
        if self.gas_limit < TRANSFER_GAS {
            return Err(TestChainError::InvalidConfig(format!(
                "block gas limit {} cannot fit a transfer",
                self.gas_limit
            )));
        }
        Ok(())
    }

    /// Set the number of accounts.
    pub fn with_account_count(mut self, count: usize) -> Self {
        self.account_count = count;
        self
    }

    /// Set the genesis balance of every account.
    pub fn with_initial_balance(mut self, balance: U256) -> Self {
        self.initial_balance = balance;
        self
    }

    /// Set the chain id.
    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    /// Set the block gas limit.
    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    /// Set the gas price.
    pub fn with_gas_price(mut self, gas_price: u128) -> Self {
        self.gas_price = gas_price;
        self
    }

    /// Set the genesis timestamp.
    pub fn with_genesis_timestamp(mut self, timestamp: u64) -> Self {
        self.genesis_timestamp = timestamp;
        self
    }

    /// Derive keys deterministically from `seed`.
    pub fn with_key_seed(mut self, seed: B256) -> Self {
        self.key_seed = Some(seed);
        self
    }
}
