use std::collections::BTreeMap;

use alloy_primitives::{keccak256, map::AddressHashMap, Address, B256, U256};
use alloy_signer_local::PrivateKeySigner;
use tracing::debug;

use crate::{ledger::GenesisAccount, ChainConfig, Result, TestChainError};

/// A funded account of the test chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Account {
    /// Address derived from the account key.
    pub address: Address,
    /// Balance at genesis.
    pub initial_balance: U256,
}

/// The accounts of a test chain and their keys.
#[derive(Debug, Clone, Default)]
pub struct AccountRegistry {
    accounts: Vec<Account>,
    keys: AddressHashMap<PrivateKeySigner>,
}

impl AccountRegistry {
    /// Generate the accounts described by `config`.
    pub fn from_config(config: &ChainConfig) -> Result<Self> {
        Self::generate(config.account_count, config.initial_balance, config.key_seed)
    }

    /// Generate `count` accounts holding `balance` each.
    ///
    /// Keys come from the OS random number generator unless `seed` is given, in which case
    /// key `i` is `keccak256(seed || i)` with `i` as a big-endian `u64`.
    pub fn generate(count: usize, balance: U256, seed: Option<B256>) -> Result<Self> {
        let mut registry = Self::default();
        for index in 0..count {
            let key = match seed {
                Some(seed) => derive_key(seed, index)?,
                None => PrivateKeySigner::random(),
            };
            registry.insert(key, balance);
        }
        debug!(count, seeded = seed.is_some(), "Accounts generated");
        Ok(registry)
    }

    /// Add an account controlled by `key`. An existing account with the same key is replaced.
    pub fn insert(&mut self, key: PrivateKeySigner, balance: U256) -> Address {
        let address = key.address();
        let account = Account { address, initial_balance: balance };
        if self.keys.insert(address, key).is_some() {
            self.accounts.retain(|existing| existing.address != address);
        }
        self.accounts.push(account);
        address
    }

    /// Accounts in generation order.
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    /// Address of the account at `index`.
    pub fn address(&self, index: usize) -> Option<Address> {
        self.accounts.get(index).map(|account| account.address)
    }

    /// Key of `address`, if it belongs to the registry.
    pub fn key(&self, address: &Address) -> Option<&PrivateKeySigner> {
        self.keys.get(address)
    }

    /// Number of accounts.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether the registry holds no account.
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Genesis allocation funding every account.
    pub fn genesis_alloc(&self) -> BTreeMap<Address, GenesisAccount> {
        self.accounts
            .iter()
            .map(|account| {
                (account.address, GenesisAccount::with_balance(account.initial_balance))
            })
            .collect()
    }
}

fn derive_key(seed: B256, index: usize) -> Result<PrivateKeySigner> {
    let mut preimage = [0u8; 40];
    preimage[..32].copy_from_slice(seed.as_slice());
    preimage[32..].copy_from_slice(&(index as u64).to_be_bytes());
    PrivateKeySigner::from_bytes(&keccak256(preimage))
        .map_err(|err| TestChainError::KeyGeneration { index, reason: err.to_string() })
}
