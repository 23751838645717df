use alloy_primitives::{Address, Bytes, TxHash};

use crate::LedgerError;

/// Errors raised by [`TestChain`](crate::TestChain) operations.
///
/// Each variant names the step that failed, so "could not build the transaction" and "the
/// transaction was mined but rejected" stay distinguishable.
#[derive(Debug, thiserror::Error)]
pub enum TestChainError {
    /// The pending nonce of the sender could not be obtained.
    #[error("Failed to obtain pending nonce for {address}: {source}")]
    NonceUnavailable {
        /// Sender whose nonce was requested.
        address: Address,
        /// Ledger failure.
        #[source]
        source: LedgerError,
    },

    /// The ledger could not estimate gas for the transaction.
    #[error("Failed to estimate gas: {0}")]
    GasEstimationFailed(#[source] LedgerError),

    /// The sender is not one of the chain's accounts.
    #[error("No signing key for {0}")]
    UnknownSigningKey(Address),

    /// Signing the transaction failed.
    #[error("Failed to sign transaction: {0}")]
    Signing(#[from] alloy_signer::Error),

    /// The ledger refused the signed transaction.
    #[error("Failed to submit transaction {hash}: {source}")]
    SubmissionFailed {
        /// Hash of the refused transaction.
        hash: TxHash,
        /// Ledger failure.
        #[source]
        source: LedgerError,
    },

    /// No receipt exists for a transaction that was submitted and committed.
    #[error("Failed to obtain receipt for {hash}: {source}")]
    ReceiptUnavailable {
        /// Hash of the transaction.
        hash: TxHash,
        /// Ledger failure.
        #[source]
        source: LedgerError,
    },

    /// The deployment was mined but its constructor reverted or ran out of gas.
    #[error("Deployment {hash} failed after {gas_used} gas (revert data: {revert_data})")]
    DeploymentFailed {
        /// Hash of the mined transaction.
        hash: TxHash,
        /// Gas consumed by the failed deployment.
        gas_used: u64,
        /// Data returned by the reverting constructor, empty on halts.
        revert_data: Bytes,
    },

    /// A call or value transaction was mined but failed.
    #[error("Transaction {hash} failed after {gas_used} gas (revert data: {revert_data})")]
    TransactionFailed {
        /// Hash of the mined transaction.
        hash: TxHash,
        /// Gas consumed by the failed transaction.
        gas_used: u64,
        /// Data returned by the reverting call, empty on halts.
        revert_data: Bytes,
    },

    /// A read-only call failed.
    #[error("Call failed: {0}")]
    CallFailed(#[source] LedgerError),

    /// The output of a read-only call could not be decoded.
    #[error("Failed to decode call output: {0}")]
    Decode(#[from] alloy_sol_types::Error),

    /// A state query against the ledger failed.
    #[error("Ledger query failed: {0}")]
    Query(#[source] LedgerError),

    /// An account key could not be generated.
    #[error("Failed to generate key for account {index}: {reason}")]
    KeyGeneration {
        /// Index of the account.
        index: usize,
        /// Why the key was rejected.
        reason: String,
    },

    /// The chain configuration is unusable.
    #[error("Invalid chain configuration: {0}")]
    InvalidConfig(String),

    /// The registry deployment did not produce the canonical registry.
    #[error("Registry deployment produced {actual:?}, expected code at {expected}")]
    RegistryAddressMismatch {
        /// Canonical registry address.
        expected: Address,
        /// Contract address reported by the receipt.
        actual: Option<Address>,
    },
}

/// Result type for test chain operations.
pub type Result<T, E = TestChainError> = core::result::Result<T, E>;
