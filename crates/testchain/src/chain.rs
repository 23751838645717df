use alloy_primitives::{map::AddressHashMap, Address, Bytes, TxHash, U256};
use alloy_sol_types::SolCall;
use tracing::{debug, info, warn};

use crate::{
    constants::{DEPLOYER_INDEX, OWNER_INDEX},
    ledger::{CallRequest, Genesis, Ledger, Receipt, SimulatedLedger},
    Account, AccountRegistry, ChainConfig, Result, SignedTransaction, TestChainError,
    TransactionIntent, TransactionSigner,
};

/// A test chain: funded accounts, their signers and the ledger they transact on.
///
/// Every submission is followed by a commit, so each transaction lands in its own block.
/// Mutating operations take `&mut self`; parallel scenarios build their own chain.
#[derive(Debug)]
pub struct TestChain<L = SimulatedLedger> {
    ledger: L,
    config: ChainConfig,
    registry: AccountRegistry,
    signers: AddressHashMap<TransactionSigner>,
}

impl TestChain<SimulatedLedger> {
    /// A chain with the default [`ChainConfig`].
    pub fn new() -> Result<Self> {
        Self::with_config(ChainConfig::default())
    }

    /// A chain with a custom configuration, backed by a fresh [`SimulatedLedger`].
    pub fn with_config(config: ChainConfig) -> Result<Self> {
        config.validate()?;
        let registry = AccountRegistry::from_config(&config)?;
        let genesis = Genesis {
            chain_id: config.chain_id,
            gas_limit: config.gas_limit,
            timestamp: config.genesis_timestamp,
            alloc: registry.genesis_alloc(),
        };
        Self::with_ledger(SimulatedLedger::new(genesis), registry, config)
    }
}

impl<L: Ledger> TestChain<L> {
    /// Assemble a chain over an existing ledger.
    ///
    /// The ledger must accept `config.chain_id`, and the registry must reach the owner index.
    pub fn with_ledger(ledger: L, registry: AccountRegistry, config: ChainConfig) -> Result<Self> {
        if ledger.chain_id() != config.chain_id {
            return Err(TestChainError::InvalidConfig(format!(
                "ledger chain id {} differs from configured chain id {}",
                ledger.chain_id(),
                config.chain_id
            )));
        }
        if registry.len() <= OWNER_INDEX {
            return Err(TestChainError::InvalidConfig(format!(
                "{} accounts do not reach the owner account index {OWNER_INDEX}",
                registry.len()
            )));
        }
        let signers = registry
            .accounts()
            .iter()
            .filter_map(|account| {
                let key = registry.key(&account.address)?.clone();
                let signer = TransactionSigner::new(key, config.chain_id, config.gas_price);
                Some((account.address, signer))
            })
            .collect();
        info!(chain_id = config.chain_id, accounts = registry.len(), "Test chain created");
        Ok(Self { ledger, config, registry, signers })
    }

    /// The underlying ledger.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Mutable access to the underlying ledger.
    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    /// Configuration the chain was built from.
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// All accounts, in generation order.
    pub fn accounts(&self) -> &[Account] {
        self.registry.accounts()
    }

    /// Address of the account at `index`.
    pub fn account(&self, index: usize) -> Option<Address> {
        self.registry.address(index)
    }

    /// The account deploying contracts (index 0).
    pub fn deployer(&self) -> Address {
        self.accounts()[DEPLOYER_INDEX].address
    }

    /// The funder and token owner account of scenarios (index 127).
    pub fn owner(&self) -> Address {
        self.accounts()[OWNER_INDEX].address
    }

    /// Signing context of `address`.
    pub fn signer(&self, address: Address) -> Option<&TransactionSigner> {
        self.signers.get(&address)
    }

    /// Build a transaction from `from` and sign it.
    ///
    /// The nonce is the sender's pending nonce and the gas limit is the ledger's estimate.
    /// No recipient means a contract creation with `input` as init code.
    pub fn build_and_sign(
        &self,
        from: Address,
        to: Option<Address>,
        value: U256,
        input: Bytes,
    ) -> Result<SignedTransaction> {
        let signer = self.signer(from).ok_or(TestChainError::UnknownSigningKey(from))?;
        let intent = TransactionIntent { from, to, value, input };

        let nonce = self
            .ledger
            .pending_nonce(from)
            .map_err(|source| TestChainError::NonceUnavailable { address: from, source })?;
        let gas_limit = self
            .ledger
            .estimate_gas(&intent.call_request())
            .map_err(TestChainError::GasEstimationFailed)?;
        debug!(%from, ?to, nonce, gas_limit, "Building transaction");

        signer.sign_with_nonce(&intent, nonce, gas_limit)
    }

    /// Submit a signed transaction, commit a block and return its receipt.
    ///
    /// The receipt may report a failed execution; callers decide what that means.
    pub fn submit(&mut self, tx: SignedTransaction) -> Result<Receipt> {
        let hash = *tx.hash();
        self.ledger
            .send_transaction(tx)
            .map_err(|source| TestChainError::SubmissionFailed { hash, source })?;
        self.seal(hash)
    }

    /// Submit RLP-encoded transaction bytes, commit a block and return the receipt.
    ///
    /// A refused submission reports `keccak256(raw)` as its hash.
    pub fn submit_raw(&mut self, raw: &[u8]) -> Result<Receipt> {
        let hash = self.ledger.send_raw_transaction(raw).map_err(|source| {
            TestChainError::SubmissionFailed { hash: alloy_primitives::keccak256(raw), source }
        })?;
        self.seal(hash)
    }

    fn seal(&mut self, hash: TxHash) -> Result<Receipt> {
        self.ledger.commit();
        self.ledger
            .receipt(hash)
            .map_err(|source| TestChainError::ReceiptUnavailable { hash, source })
    }

    /// Deploy `init_code` from `deployer` and return the new contract address.
    ///
    /// Every call deploys a new instance. A deployment that is mined but fails still consumes
    /// the deployer's nonce and a block.
    pub fn deploy(&mut self, deployer: Address, value: U256, init_code: Bytes) -> Result<Address> {
        let tx = self.build_and_sign(deployer, None, value, init_code)?;
        let receipt = self.submit(tx)?;
        match receipt.contract_address {
            Some(address) if receipt.is_success() => {
                info!(%deployer, contract = %address, gas_used = receipt.gas_used, "Contract deployed");
                Ok(address)
            }
            _ => {
                warn!(hash = %receipt.transaction_hash, gas_used = receipt.gas_used, "Deployment failed");
                Err(TestChainError::DeploymentFailed {
                    hash: receipt.transaction_hash,
                    gas_used: receipt.gas_used,
                    revert_data: receipt.output,
                })
            }
        }
    }

    /// Send a call or value transaction, mine it and return the successful receipt.
    pub fn transact(
        &mut self,
        from: Address,
        to: Address,
        value: U256,
        input: Bytes,
    ) -> Result<Receipt> {
        let tx = self.build_and_sign(from, Some(to), value, input)?;
        let receipt = self.submit(tx)?;
        if !receipt.is_success() {
            warn!(hash = %receipt.transaction_hash, gas_used = receipt.gas_used, "Transaction failed");
            return Err(TestChainError::TransactionFailed {
                hash: receipt.transaction_hash,
                gas_used: receipt.gas_used,
                revert_data: receipt.output,
            });
        }
        Ok(receipt)
    }

    /// Send `value` wei from `from` to `to`.
    pub fn transfer(&mut self, from: Address, to: Address, value: U256) -> Result<Receipt> {
        self.transact(from, to, value, Bytes::new())
    }

    /// Execute a read-only call at the latest block and return the raw output.
    pub fn call(&self, from: Address, to: Address, input: Bytes) -> Result<Bytes> {
        self.call_at(from, to, input, None)
    }

    /// Execute a read-only call at a historical block (`None` for the latest).
    pub fn call_at(
        &self,
        from: Address,
        to: Address,
        input: Bytes,
        block: Option<u64>,
    ) -> Result<Bytes> {
        self.ledger
            .call(&CallRequest::call(from, to, input), block)
            .map_err(TestChainError::CallFailed)
    }

    /// Execute a typed read-only call at the latest block and decode its return value.
    pub fn call_sol<C: SolCall>(&self, from: Address, to: Address, call: C) -> Result<C::Return> {
        let output = self.call(from, to, call.abi_encode().into())?;
        Ok(C::abi_decode_returns(&output)?)
    }

    /// Balance of `address` at the latest block.
    pub fn balance(&self, address: Address) -> Result<U256> {
        self.balance_at(address, None)
    }

    /// Balance of `address` at a historical block.
    pub fn balance_at(&self, address: Address, block: Option<u64>) -> Result<U256> {
        self.ledger.balance_at(address, block).map_err(TestChainError::Query)
    }

    /// Nonce of `address` at the latest block.
    pub fn nonce(&self, address: Address) -> Result<u64> {
        self.ledger.nonce_at(address, None).map_err(TestChainError::Query)
    }

    /// Code of `address` at the latest block.
    pub fn code(&self, address: Address) -> Result<Bytes> {
        self.ledger.code_at(address, None).map_err(TestChainError::Query)
    }

    /// Number of the latest block.
    pub fn block_number(&self) -> u64 {
        self.ledger.block_number()
    }
}
