//! The ledger a [`TestChain`](crate::TestChain) submits to.
//!
//! [`Ledger`] is the capability surface the transaction pipeline needs: state queries, gas
//! estimation, read-only calls, submission, block production and receipts. Block arguments of
//! `None` mean the latest committed block.

use std::collections::BTreeMap;

use alloy_primitives::{Address, Bytes, Log, TxHash, B256, U256};
use auto_impl::auto_impl;
use revm::context::result::{HaltReason, InvalidTransaction};

use crate::{decode_signed_transaction, SignedTransaction};

mod simulated;
pub use simulated::*;

mod state;
pub use state::*;

/// Errors reported by a [`Ledger`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// The requested block does not exist.
    #[error("Unknown block: {0}")]
    UnknownBlock(u64),

    /// No committed receipt exists for the hash.
    #[error("Receipt not found: {0}")]
    ReceiptNotFound(TxHash),

    /// The sender could not be recovered from the signature.
    #[error("Invalid transaction signature")]
    InvalidSignature,

    /// The transaction is signed for another chain.
    #[error("Chain id mismatch: expected {expected}, got {got}")]
    ChainIdMismatch {
        /// Chain id of the ledger.
        expected: u64,
        /// Chain id signed into the transaction.
        got: u64,
    },

    /// The transaction was already submitted.
    #[error("Transaction already known: {0}")]
    AlreadyKnown(TxHash),

    /// Raw transaction bytes could not be decoded.
    #[error("Malformed transaction: {0}")]
    MalformedTransaction(String),

    /// The transaction failed validation (nonce, funds, gas limit, ...).
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(InvalidTransaction),

    /// The pending block has no room left for the transaction's gas limit.
    #[error("Block gas limit reached: {used} used, {requested} requested, {limit} available")]
    BlockGasLimitReached {
        /// Gas already used by the pending block.
        used: u64,
        /// Gas limit of the transaction.
        requested: u64,
        /// Gas limit of the block.
        limit: u64,
    },

    /// Execution reverted.
    #[error("Execution reverted after {gas_used} gas: {output}")]
    ExecutionReverted {
        /// Gas consumed before the revert.
        gas_used: u64,
        /// Revert data.
        output: Bytes,
    },

    /// Execution halted with an exceptional condition such as running out of gas.
    #[error("Execution halted after {gas_used} gas: {reason:?}")]
    ExecutionHalted {
        /// Gas consumed, which is the whole gas limit.
        gas_used: u64,
        /// Halt reason.
        reason: HaltReason,
    },

    /// The execution engine failed.
    #[error("Internal ledger error: {0}")]
    Internal(String),
}

/// Initial state and parameters of a ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genesis {
    /// Chain id accepted by the ledger.
    pub chain_id: u64,
    /// Gas limit of every block.
    pub gas_limit: u64,
    /// Timestamp of block 0.
    pub timestamp: u64,
    /// Accounts present at block 0.
    pub alloc: BTreeMap<Address, GenesisAccount>,
}

impl Genesis {
    /// Create an empty genesis.
    pub fn new(chain_id: u64, gas_limit: u64) -> Self {
        Self { chain_id, gas_limit, timestamp: 0, alloc: BTreeMap::new() }
    }

    /// Set the genesis timestamp.
    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Add an account to the allocation.
    pub fn with_account(mut self, address: Address, account: GenesisAccount) -> Self {
        self.alloc.insert(address, account);
        self
    }
}

/// An account in the genesis allocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenesisAccount {
    /// Balance in wei.
    pub balance: U256,
    /// Account nonce.
    pub nonce: u64,
    /// Deployed code, if any.
    pub code: Option<Bytes>,
    /// Storage slots.
    pub storage: BTreeMap<U256, U256>,
}

impl GenesisAccount {
    /// An externally owned account holding `balance`.
    pub fn with_balance(balance: U256) -> Self {
        Self { balance, ..Default::default() }
    }

    /// Set the deployed code.
    pub fn with_code(mut self, code: Bytes) -> Self {
        self.code = Some(code);
        self
    }

    /// Set a storage slot.
    pub fn with_storage(mut self, slot: U256, value: U256) -> Self {
        self.storage.insert(slot, value);
        self
    }
}

/// A sealed block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockInfo {
    /// Block number.
    pub number: u64,
    /// Block hash.
    pub hash: B256,
    /// Hash of the parent block, zero for genesis.
    pub parent_hash: B256,
    /// Block timestamp.
    pub timestamp: u64,
    /// Block gas limit.
    pub gas_limit: u64,
    /// Gas used by all transactions in the block.
    pub gas_used: u64,
    /// Hashes of the included transactions, in execution order.
    pub transactions: Vec<TxHash>,
}

/// Outcome of a transaction included in a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// Hash of the transaction.
    pub transaction_hash: TxHash,
    /// Whether execution succeeded.
    pub status: bool,
    /// Recovered sender.
    pub from: Address,
    /// Recipient, `None` for contract creations.
    pub to: Option<Address>,
    /// Address of the created contract, for creations.
    pub contract_address: Option<Address>,
    /// Gas used by this transaction.
    pub gas_used: u64,
    /// Gas used by the block up to and including this transaction.
    pub cumulative_gas_used: u64,
    /// Emitted logs, empty on failure.
    pub logs: Vec<Log>,
    /// Number of the including block.
    pub block_number: u64,
    /// Hash of the including block.
    pub block_hash: B256,
    /// Position in the including block.
    pub transaction_index: u64,
    /// Return data of the execution, or revert data on failure.
    pub output: Bytes,
}

impl Receipt {
    /// Whether execution succeeded.
    pub const fn is_success(&self) -> bool {
        self.status
    }
}

/// A message for read-only execution and gas estimation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallRequest {
    /// Caller.
    pub from: Address,
    /// Callee, `None` to simulate a contract creation.
    pub to: Option<Address>,
    /// Value sent along.
    pub value: U256,
    /// Calldata, or init code for creations.
    pub input: Bytes,
    /// Gas limit, capped at the block gas limit. `None` means the block gas limit.
    pub gas: Option<u64>,
}

impl CallRequest {
    /// A call from `from` to `to` with `input`.
    pub fn call(from: Address, to: Address, input: Bytes) -> Self {
        Self { from, to: Some(to), input, ..Default::default() }
    }

    /// A contract creation from `from` running `init_code`.
    pub fn create(from: Address, init_code: Bytes) -> Self {
        Self { from, input: init_code, ..Default::default() }
    }

    /// Set the value sent along.
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

/// A chain backend the test chain builds transactions against.
#[auto_impl(&mut, Box)]
pub trait Ledger {
    /// Chain id transactions must be signed for.
    fn chain_id(&self) -> u64;

    /// Number of the latest committed block.
    fn block_number(&self) -> u64;

    /// A committed block.
    fn block(&self, number: u64) -> Result<BlockInfo, LedgerError>;

    /// Nonce of `address` including submitted but uncommitted transactions.
    fn pending_nonce(&self, address: Address) -> Result<u64, LedgerError>;

    /// Nonce of `address` at a committed block.
    fn nonce_at(&self, address: Address, block: Option<u64>) -> Result<u64, LedgerError>;

    /// Balance of `address` at a committed block.
    fn balance_at(&self, address: Address, block: Option<u64>) -> Result<U256, LedgerError>;

    /// Code of `address` at a committed block.
    fn code_at(&self, address: Address, block: Option<u64>) -> Result<Bytes, LedgerError>;

    /// Storage slot of `address` at a committed block.
    fn storage_at(
        &self,
        address: Address,
        slot: U256,
        block: Option<u64>,
    ) -> Result<U256, LedgerError>;

    /// Lowest gas limit the request succeeds with against the pending state.
    fn estimate_gas(&self, request: &CallRequest) -> Result<u64, LedgerError>;

    /// Execute the request against a committed block without changing state.
    fn call(&self, request: &CallRequest, block: Option<u64>) -> Result<Bytes, LedgerError>;

    /// Execute the request against the pending state without changing it.
    fn pending_call(&self, request: &CallRequest) -> Result<Bytes, LedgerError>;

    /// Execute a signed transaction into the pending block.
    fn send_transaction(&mut self, tx: SignedTransaction) -> Result<TxHash, LedgerError>;

    /// Decode RLP-encoded legacy transaction bytes and submit them.
    fn send_raw_transaction(&mut self, raw: &[u8]) -> Result<TxHash, LedgerError> {
        self.send_transaction(decode_signed_transaction(raw)?)
    }

    /// Seal the pending block.
    fn commit(&mut self) -> BlockInfo;

    /// Drop the pending block and its state changes.
    fn rollback(&mut self);

    /// Receipt of a committed transaction.
    fn receipt(&self, hash: TxHash) -> Result<Receipt, LedgerError>;
}
