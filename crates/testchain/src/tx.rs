//! Transaction intents, signing and raw encoding.

use alloy_consensus::{
    transaction::{RlpEcdsaDecodableTx, RlpEcdsaEncodableTx},
    SignableTransaction, Signed, TxLegacy,
};
use alloy_primitives::{Address, Bytes, TxKind, U256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;

use crate::{ledger::CallRequest, LedgerError, Result};

/// A signed legacy transaction.
pub type SignedTransaction = Signed<TxLegacy>;

/// What a transaction should do, before nonce, gas and signature are attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionIntent {
    /// Sender.
    pub from: Address,
    /// Recipient, `None` for a contract creation.
    pub to: Option<Address>,
    /// Value transferred.
    pub value: U256,
    /// Calldata, or init code for creations.
    pub input: Bytes,
}

impl TransactionIntent {
    /// A contract creation running `init_code`.
    pub fn create(from: Address, value: U256, init_code: Bytes) -> Self {
        Self { from, to: None, value, input: init_code }
    }

    /// A call to `to`, or a plain transfer when `input` is empty.
    pub fn call(from: Address, to: Address, value: U256, input: Bytes) -> Self {
        Self { from, to: Some(to), value, input }
    }

    /// Transaction kind matching the recipient.
    pub fn kind(&self) -> TxKind {
        self.to.map_or(TxKind::Create, TxKind::Call)
    }

    /// The message the ledger simulates to estimate gas.
    pub fn call_request(&self) -> CallRequest {
        CallRequest {
            from: self.from,
            to: self.to,
            value: self.value,
            input: self.input.clone(),
            gas: None,
        }
    }
}

/// Signs transactions for one account, bound to a fixed chain id and gas price.
#[derive(Debug, Clone)]
pub struct TransactionSigner {
    signer: PrivateKeySigner,
    chain_id: u64,
    gas_price: u128,
}

impl TransactionSigner {
    /// Bind `signer` to `chain_id` and `gas_price`.
    pub fn new(signer: PrivateKeySigner, chain_id: u64, gas_price: u128) -> Self {
        Self { signer, chain_id, gas_price }
    }

    /// Address of the signing account.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Chain id signed into every transaction (EIP-155).
    pub const fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Gas price of every transaction.
    pub const fn gas_price(&self) -> u128 {
        self.gas_price
    }

    /// Sign `intent` with an explicit nonce and gas limit, without consulting a ledger.
    pub fn sign_with_nonce(
        &self,
        intent: &TransactionIntent,
        nonce: u64,
        gas_limit: u64,
    ) -> Result<SignedTransaction> {
        let tx = TxLegacy {
            chain_id: Some(self.chain_id),
            nonce,
            gas_price: self.gas_price,
            gas_limit,
            to: intent.kind(),
            value: intent.value,
            input: intent.input.clone(),
        };
        let signature = self.signer.sign_hash_sync(&tx.signature_hash())?;
        Ok(tx.into_signed(signature))
    }
}

/// RLP encoding of a signed transaction, as accepted by
/// [`Ledger::send_raw_transaction`](crate::Ledger::send_raw_transaction).
pub fn encode_signed_transaction(tx: &SignedTransaction) -> Bytes {
    let mut out = Vec::new();
    tx.tx().rlp_encode_signed(tx.signature(), &mut out);
    out.into()
}

/// Decode an RLP-encoded legacy transaction.
///
/// Both pre-EIP-155 (`v` of 27 or 28) and EIP-155 signatures are accepted; trailing bytes
/// are not.
pub fn decode_signed_transaction(raw: &[u8]) -> Result<SignedTransaction, LedgerError> {
    let mut buf = raw;
    let signed = TxLegacy::rlp_decode_signed(&mut buf)
        .map_err(|err| LedgerError::MalformedTransaction(err.to_string()))?;
    if !buf.is_empty() {
        return Err(LedgerError::MalformedTransaction(format!(
            "{} trailing bytes",
            buf.len()
        )));
    }
    Ok(signed)
}
