use core::convert::Infallible;
use std::collections::BTreeMap;

use alloy_primitives::{Address, Bytes, B256, U256};
use delegate::delegate;
use revm::{
    database::{CacheDB, EmptyDB},
    primitives::{StorageKey, StorageValue},
    state::{Account, AccountInfo, Bytecode},
    DatabaseCommit, DatabaseRef,
};

use super::GenesisAccount;

/// World state of one block of a [`SimulatedLedger`](super::SimulatedLedger).
///
/// Read through [`DatabaseRef`], so executions borrow it without mutating it; changes are
/// applied with [`DatabaseCommit`].
#[derive(Debug, Default, Clone, derive_more::Deref, derive_more::DerefMut)]
pub struct LedgerState {
    #[deref]
    #[deref_mut]
    db: CacheDB<EmptyDB>,
}

impl LedgerState {
    /// Build the state of block 0.
    pub fn from_genesis(alloc: &BTreeMap<Address, GenesisAccount>) -> Self {
        let mut state = Self::default();
        for (address, account) in alloc {
            state.set_account(*address, account);
        }
        state
    }

    /// Install `account` at `address`, replacing whatever was there.
    pub fn set_account(&mut self, address: Address, account: &GenesisAccount) {
        let mut info =
            AccountInfo { balance: account.balance, nonce: account.nonce, ..Default::default() };
        if let Some(code) = &account.code {
            let bytecode = Bytecode::new_legacy(code.clone());
            info.code_hash = bytecode.hash_slow();
            info.code = Some(bytecode);
        }
        self.db.insert_account_info(address, info);
        for (slot, value) in &account.storage {
            let Ok(()) = self.db.insert_account_storage(address, *slot, *value);
        }
    }

    /// Account info of `address`, empty if it does not exist.
    pub fn account_info(&self, address: Address) -> AccountInfo {
        let Ok(info) = self.db.basic_ref(address);
        info.unwrap_or_default()
    }

    /// Nonce of `address`.
    pub fn nonce(&self, address: Address) -> u64 {
        self.account_info(address).nonce
    }

    /// Balance of `address`.
    pub fn balance(&self, address: Address) -> U256 {
        self.account_info(address).balance
    }

    /// Code deployed at `address`, empty for externally owned accounts.
    pub fn code(&self, address: Address) -> Bytes {
        let info = self.account_info(address);
        let code = match info.code {
            Some(code) => code,
            None => {
                let Ok(code) = self.db.code_by_hash_ref(info.code_hash);
                code
            }
        };
        code.original_bytes()
    }

    /// Value of a storage slot of `address`.
    pub fn storage(&self, address: Address, slot: U256) -> U256 {
        let Ok(value) = self.db.storage_ref(address, slot);
        value
    }
}

impl DatabaseRef for LedgerState {
    type Error = Infallible;

    delegate! {
        to self.db {
            fn basic_ref(&self, address: Address) -> Result<Option<AccountInfo>, Self::Error>;
            fn code_by_hash_ref(&self, code_hash: B256) -> Result<Bytecode, Self::Error>;
            fn storage_ref(&self, address: Address, index: StorageKey) -> Result<StorageValue, Self::Error>;
            fn block_hash_ref(&self, number: u64) -> Result<B256, Self::Error>;
        }
    }
}

impl DatabaseCommit for LedgerState {
    delegate! {
        to self.db {
            fn commit(&mut self, changes: revm::primitives::HashMap<Address, Account>);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, bytes};

    #[test]
    fn test_genesis_accounts_are_readable() {
        let eoa = address!("0x0000000000000000000000000000000000000001");
        let contract = address!("0x0000000000000000000000000000000000000002");
        let alloc = BTreeMap::from([
            (eoa, GenesisAccount::with_balance(U256::from(100))),
            (
                contract,
                GenesisAccount::default()
                    .with_code(bytes!("5f5ff3"))
                    .with_storage(U256::from(1), U256::from(42)),
            ),
        ]);

        let state = LedgerState::from_genesis(&alloc);
        assert_eq!(state.balance(eoa), U256::from(100));
        assert_eq!(state.nonce(eoa), 0);
        assert!(state.code(eoa).is_empty());
        assert_eq!(state.code(contract), bytes!("5f5ff3"));
        assert_eq!(state.storage(contract, U256::from(1)), U256::from(42));
        assert_eq!(state.storage(contract, U256::from(2)), U256::ZERO);
    }

    #[test]
    fn test_missing_account_is_empty() {
        let state = LedgerState::default();
        let nobody = address!("0x00000000000000000000000000000000000000ff");
        assert_eq!(state.account_info(nobody), AccountInfo::default());
        assert!(state.code(nobody).is_empty());
    }
}
