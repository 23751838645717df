use alloy_primitives::{keccak256, map::B256HashMap, Address, Bytes, TxHash, TxKind, B256, U256};
use revm::{
    context::{
        result::{EVMError, ExecutionResult, ResultAndState},
        BlockEnv, CfgEnv, TxEnv,
    },
    database::WrapDatabaseRef,
    primitives::hardfork::SpecId,
    Context, DatabaseCommit, ExecuteEvm, MainBuilder, MainContext,
};
use tracing::{debug, info, trace, warn};

use super::{BlockInfo, CallRequest, Genesis, Ledger, LedgerError, LedgerState, Receipt};
use crate::{constants::BLOCK_TIME, SignedTransaction};

/// A committed block together with the state after it.
#[derive(Debug, Clone)]
struct CommittedBlock {
    info: BlockInfo,
    state: LedgerState,
}

/// Transactions executed since the last commit.
#[derive(Debug, Clone)]
struct PendingBlock {
    state: LedgerState,
    receipts: Vec<Receipt>,
    gas_used: u64,
}

impl PendingBlock {
    fn on(state: LedgerState) -> Self {
        Self { state, receipts: Vec::new(), gas_used: 0 }
    }
}

/// An in-memory [`Ledger`] executing transactions with `revm`.
///
/// Submitted transactions execute immediately against a pending block, and
/// [`commit`](Ledger::commit) seals that block. The state after every block is kept, so
/// queries and calls can target any historical block.
///
/// Blocks run under the Prague rules with a zero base fee and the zero address as
/// beneficiary. Block `n` has timestamp `genesis.timestamp + n * BLOCK_TIME`.
#[derive(Debug, Clone)]
pub struct SimulatedLedger {
    chain_id: u64,
    gas_limit: u64,
    genesis_timestamp: u64,
    ancestors: Vec<CommittedBlock>,
    head: CommittedBlock,
    pending: PendingBlock,
    receipts: B256HashMap<Receipt>,
}

impl SimulatedLedger {
    /// Create a ledger at block 0 holding the genesis allocation.
    pub fn new(genesis: Genesis) -> Self {
        let state = LedgerState::from_genesis(&genesis.alloc);
        let info = BlockInfo {
            number: 0,
            hash: block_hash(B256::ZERO, 0, genesis.timestamp, &[]),
            parent_hash: B256::ZERO,
            timestamp: genesis.timestamp,
            gas_limit: genesis.gas_limit,
            gas_used: 0,
            transactions: Vec::new(),
        };
        debug!(chain_id = genesis.chain_id, accounts = genesis.alloc.len(), "Genesis created");
        Self {
            chain_id: genesis.chain_id,
            gas_limit: genesis.gas_limit,
            genesis_timestamp: genesis.timestamp,
            ancestors: Vec::new(),
            pending: PendingBlock::on(state.clone()),
            head: CommittedBlock { info, state },
            receipts: B256HashMap::default(),
        }
    }

    /// Number of transactions waiting in the pending block.
    pub fn pending_transaction_count(&self) -> usize {
        self.pending.receipts.len()
    }

    fn committed(&self, number: Option<u64>) -> Result<&CommittedBlock, LedgerError> {
        match number {
            None => Ok(&self.head),
            Some(number) if number == self.head.info.number => Ok(&self.head),
            Some(number) => usize::try_from(number)
                .ok()
                .and_then(|index| self.ancestors.get(index))
                .ok_or(LedgerError::UnknownBlock(number)),
        }
    }

    fn pending_number(&self) -> u64 {
        self.head.info.number + 1
    }

    fn timestamp_of(&self, number: u64) -> u64 {
        self.genesis_timestamp + number * BLOCK_TIME
    }

    fn block_env(&self, number: u64) -> BlockEnv {
        BlockEnv {
            number: U256::from(number),
            timestamp: U256::from(self.timestamp_of(number)),
            gas_limit: self.gas_limit,
            basefee: 0,
            ..Default::default()
        }
    }

    fn cfg(&self) -> CfgEnv {
        let mut cfg = CfgEnv::new_with_spec(SpecId::PRAGUE);
        cfg.chain_id = self.chain_id;
        cfg
    }

    /// Run `tx` on top of `state` without committing anything.
    fn execute(
        &self,
        state: &LedgerState,
        number: u64,
        tx: TxEnv,
    ) -> Result<ResultAndState, LedgerError> {
        let mut evm = Context::mainnet()
            .with_db(WrapDatabaseRef(state))
            .with_block(self.block_env(number))
            .with_cfg(self.cfg())
            .build_mainnet();
        evm.transact(tx).map_err(|err| match err {
            EVMError::Transaction(err) => LedgerError::InvalidTransaction(err),
            err => LedgerError::Internal(err.to_string()),
        })
    }

    /// Simulate `request` with an explicit gas limit. Gas is free for simulations.
    fn simulate(
        &self,
        state: &LedgerState,
        number: u64,
        request: &CallRequest,
        gas_limit: u64,
    ) -> Result<ExecutionResult, LedgerError> {
        let tx = TxEnv {
            caller: request.from,
            kind: request.to.map_or(TxKind::Create, TxKind::Call),
            data: request.input.clone(),
            value: request.value,
            gas_limit,
            gas_price: 0,
            nonce: state.nonce(request.from),
            chain_id: Some(self.chain_id),
            ..Default::default()
        };
        let ResultAndState { result, .. } = self.execute(state, number, tx)?;
        trace!(from = %request.from, to = ?request.to, gas_limit, result = ?result, "Simulated");
        Ok(result)
    }

    fn gas_cap(&self, request: &CallRequest) -> u64 {
        request.gas.map_or(self.gas_limit, |gas| gas.min(self.gas_limit))
    }

    fn is_known(&self, hash: TxHash) -> bool {
        self.receipts.contains_key(&hash) ||
            self.pending.receipts.iter().any(|receipt| receipt.transaction_hash == hash)
    }
}

/// Output of a read-only execution, or the reason it failed.
fn into_output(result: ExecutionResult) -> Result<Bytes, LedgerError> {
    match result {
        ExecutionResult::Success { output, .. } => Ok(output.into_data()),
        ExecutionResult::Revert { gas_used, output } => {
            Err(LedgerError::ExecutionReverted { gas_used, output })
        }
        ExecutionResult::Halt { reason, gas_used } => {
            Err(LedgerError::ExecutionHalted { gas_used, reason })
        }
    }
}

/// Synthetic block hash committing to the parent, height, time and transactions.
fn block_hash(parent_hash: B256, number: u64, timestamp: u64, transactions: &[TxHash]) -> B256 {
    let mut preimage = Vec::with_capacity(48 + transactions.len() * 32);
    preimage.extend_from_slice(parent_hash.as_slice());
    preimage.extend_from_slice(&number.to_be_bytes());
    preimage.extend_from_slice(&timestamp.to_be_bytes());
    for hash in transactions {
        preimage.extend_from_slice(hash.as_slice());
    }
    keccak256(preimage)
}

impl Ledger for SimulatedLedger {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn block_number(&self) -> u64 {
        self.head.info.number
    }

    fn block(&self, number: u64) -> Result<BlockInfo, LedgerError> {
        self.committed(Some(number)).map(|block| block.info.clone())
    }

    fn pending_nonce(&self, address: Address) -> Result<u64, LedgerError> {
        Ok(self.pending.state.nonce(address))
    }

    fn nonce_at(&self, address: Address, block: Option<u64>) -> Result<u64, LedgerError> {
        Ok(self.committed(block)?.state.nonce(address))
    }

    fn balance_at(&self, address: Address, block: Option<u64>) -> Result<U256, LedgerError> {
        Ok(self.committed(block)?.state.balance(address))
    }

    fn code_at(&self, address: Address, block: Option<u64>) -> Result<Bytes, LedgerError> {
        Ok(self.committed(block)?.state.code(address))
    }

    fn storage_at(
        &self,
        address: Address,
        slot: U256,
        block: Option<u64>,
    ) -> Result<U256, LedgerError> {
        Ok(self.committed(block)?.state.storage(address, slot))
    }

    fn estimate_gas(&self, request: &CallRequest) -> Result<u64, LedgerError> {
        let state = &self.pending.state;
        let number = self.pending_number();
        let cap = self.gas_cap(request);

        let result = self.simulate(state, number, request, cap)?;
        let used = result.gas_used();
        into_output(result)?;

        // Anything below the gas used at the cap is bound to fail.
        let (mut lo, mut hi) = (used.saturating_sub(1), cap);
        while lo + 1 < hi {
            let mid = lo + (hi - lo) / 2;
            match self.simulate(state, number, request, mid) {
                Ok(result) if result.is_success() => hi = mid,
                _ => lo = mid,
            }
        }
        debug!(from = %request.from, to = ?request.to, gas = hi, "Gas estimated");
        Ok(hi)
    }

    fn call(&self, request: &CallRequest, block: Option<u64>) -> Result<Bytes, LedgerError> {
        let committed = self.committed(block)?;
        into_output(self.simulate(
            &committed.state,
            committed.info.number,
            request,
            self.gas_cap(request),
        )?)
    }

    fn pending_call(&self, request: &CallRequest) -> Result<Bytes, LedgerError> {
        into_output(self.simulate(
            &self.pending.state,
            self.pending_number(),
            request,
            self.gas_cap(request),
        )?)
    }

    fn send_transaction(&mut self, signed: SignedTransaction) -> Result<TxHash, LedgerError> {
        let hash = *signed.hash();
        let sender = signed.recover_signer().map_err(|_| LedgerError::InvalidSignature)?;
        let tx = signed.tx();

        if let Some(got) = tx.chain_id {
            if got != self.chain_id {
                return Err(LedgerError::ChainIdMismatch { expected: self.chain_id, got });
            }
        }
        if self.is_known(hash) {
            return Err(LedgerError::AlreadyKnown(hash));
        }
        if self.pending.gas_used.saturating_add(tx.gas_limit) > self.gas_limit {
            return Err(LedgerError::BlockGasLimitReached {
                used: self.pending.gas_used,
                requested: tx.gas_limit,
                limit: self.gas_limit,
            });
        }

        // At most one transaction per 21000 gas of a u64 block gas limit.
        let transaction_index = u64::try_from(self.pending.receipts.len())
            .map_err(|err| LedgerError::Internal(err.to_string()))?;

        let number = self.pending_number();
        let tx_env = TxEnv {
            caller: sender,
            kind: tx.to,
            data: tx.input.clone(),
            value: tx.value,
            gas_limit: tx.gas_limit,
            gas_price: tx.gas_price,
            nonce: tx.nonce,
            chain_id: tx.chain_id,
            ..Default::default()
        };
        let ResultAndState { result, state } = self.execute(&self.pending.state, number, tx_env)?;
        trace!(%hash, result = ?result, "Transaction executed");
        self.pending.state.commit(state);

        let (status, gas_used, logs, output) = match result {
            ExecutionResult::Success { gas_used, logs, output, .. } => {
                (true, gas_used, logs, output.into_data())
            }
            ExecutionResult::Revert { gas_used, output } => (false, gas_used, Vec::new(), output),
            ExecutionResult::Halt { reason, gas_used } => {
                warn!(%hash, ?reason, "Transaction halted");
                (false, gas_used, Vec::new(), Bytes::new())
            }
        };
        self.pending.gas_used += gas_used;

        let receipt = Receipt {
            transaction_hash: hash,
            status,
            from: sender,
            to: tx.to.to().copied(),
            contract_address: tx.to.is_create().then(|| sender.create(tx.nonce)),
            gas_used,
            cumulative_gas_used: self.pending.gas_used,
            logs,
            block_number: number,
            block_hash: B256::ZERO,
            transaction_index,
            output,
        };
        debug!(%hash, %sender, nonce = tx.nonce, status, gas_used, "Transaction added to pending block");
        self.pending.receipts.push(receipt);
        Ok(hash)
    }

    fn commit(&mut self) -> BlockInfo {
        let number = self.pending_number();
        let timestamp = self.timestamp_of(number);
        let receipts = std::mem::take(&mut self.pending.receipts);
        let gas_used = std::mem::take(&mut self.pending.gas_used);
        let transactions: Vec<TxHash> =
            receipts.iter().map(|receipt| receipt.transaction_hash).collect();

        let parent_hash = self.head.info.hash;
        let info = BlockInfo {
            number,
            hash: block_hash(parent_hash, number, timestamp, &transactions),
            parent_hash,
            timestamp,
            gas_limit: self.gas_limit,
            gas_used,
            transactions,
        };
        let sealed = CommittedBlock { info: info.clone(), state: self.pending.state.clone() };
        self.ancestors.push(std::mem::replace(&mut self.head, sealed));

        for mut receipt in receipts {
            receipt.block_hash = info.hash;
            self.receipts.insert(receipt.transaction_hash, receipt);
        }
        info!(number, hash = %info.hash, transactions = info.transactions.len(), gas_used, "Block committed");
        info
    }

    fn rollback(&mut self) {
        debug!(dropped = self.pending.receipts.len(), "Pending block rolled back");
        self.pending = PendingBlock::on(self.head.state.clone());
    }

    fn receipt(&self, hash: TxHash) -> Result<Receipt, LedgerError> {
        self.receipts.get(&hash).cloned().ok_or(LedgerError::ReceiptNotFound(hash))
    }
}
