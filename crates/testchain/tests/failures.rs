//! Failure paths of the transaction pipeline, driven through ledgers that misbehave on purpose.

use alloy_primitives::{bytes, hex, Address, Bytes, TxHash, U256};
use delegate::delegate;
use evm_testchain::{
    ledger::{BlockInfo, CallRequest, Genesis, GenesisAccount, Receipt},
    test_utils::*,
    AccountRegistry, ChainConfig, Ledger, LedgerError, SignedTransaction, SimulatedLedger,
    TestChain, TestChainError,
};
use revm::context::result::InvalidTransaction;

/// Legacy creation signed for chain 1.
const CHAIN_1_TX: &[u8] = &hex!("f856808504a817c800830186a0808085608060405226a0fceb37453e90ac5ec2780748b7a4907b1dcfb87708697de2e6be19831938c77ba0224ee4c1aaa6a1490b4e3a1fbed7c5151668a12b6f6e3227c2692a64cf79e81f");

/// Legacy creation signed for chain 1337 by an unfunded key.
const CHAIN_1337_TX: &[u8] = &hex!("f858808504a817c800830186a08080856080604052820a95a0bea22b3c93e686c12e09c4c519919244bd710de249e2588b22cfb28a2d9ecc22a04b8d3598bae247ce8846aafa41fdaadff2e2154034f5789448bf263d905f20c3");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fault {
    Nonce,
    Estimate,
    Underestimate,
    LoseReceipts,
}

#[derive(Debug)]
struct FaultyLedger {
    inner: SimulatedLedger,
    fault: Fault,
}

impl Ledger for FaultyLedger {
    delegate! {
        to self.inner {
            fn chain_id(&self) -> u64;
            fn block_number(&self) -> u64;
            fn block(&self, number: u64) -> Result<BlockInfo, LedgerError>;
            fn nonce_at(&self, address: Address, block: Option<u64>) -> Result<u64, LedgerError>;
            fn balance_at(&self, address: Address, block: Option<u64>) -> Result<U256, LedgerError>;
            fn code_at(&self, address: Address, block: Option<u64>) -> Result<Bytes, LedgerError>;
            fn storage_at(&self, address: Address, slot: U256, block: Option<u64>) -> Result<U256, LedgerError>;
            fn call(&self, request: &CallRequest, block: Option<u64>) -> Result<Bytes, LedgerError>;
            fn pending_call(&self, request: &CallRequest) -> Result<Bytes, LedgerError>;
            fn send_transaction(&mut self, tx: SignedTransaction) -> Result<TxHash, LedgerError>;
            fn commit(&mut self) -> BlockInfo;
            fn rollback(&mut self);
        }
    }

    fn pending_nonce(&self, address: Address) -> Result<u64, LedgerError> {
        match self.fault {
            Fault::Nonce => Err(LedgerError::Internal("nonce unavailable".into())),
            _ => self.inner.pending_nonce(address),
        }
    }

    fn estimate_gas(&self, request: &CallRequest) -> Result<u64, LedgerError> {
        match self.fault {
            Fault::Estimate => Err(LedgerError::Internal("estimator offline".into())),
            Fault::Underestimate => self.inner.estimate_gas(request).map(|gas| gas - 1),
            _ => self.inner.estimate_gas(request),
        }
    }

    fn receipt(&self, hash: TxHash) -> Result<Receipt, LedgerError> {
        match self.fault {
            Fault::LoseReceipts => Err(LedgerError::ReceiptNotFound(hash)),
            _ => self.inner.receipt(hash),
        }
    }
}

fn genesis(config: &ChainConfig, registry: &AccountRegistry) -> Genesis {
    Genesis { alloc: registry.genesis_alloc(), ..Genesis::new(config.chain_id, config.gas_limit) }
}

fn simulated(config: &ChainConfig, registry: &AccountRegistry) -> SimulatedLedger {
    SimulatedLedger::new(genesis(config, registry))
}

fn faulty_chain_with(
    fault: Fault,
    customize: impl FnOnce(Genesis) -> Genesis,
) -> TestChain<FaultyLedger> {
    init_tracing();
    let config = ChainConfig::default();
    let registry = AccountRegistry::from_config(&config).unwrap();
    let inner = SimulatedLedger::new(customize(genesis(&config, &registry)));
    TestChain::with_ledger(FaultyLedger { inner, fault }, registry, config).unwrap()
}

fn faulty_chain(fault: Fault) -> TestChain<FaultyLedger> {
    faulty_chain_with(fault, |genesis| genesis)
}

#[test]
fn test_nonce_failure() {
    let mut chain = faulty_chain(Fault::Nonce);
    let deployer = chain.deployer();
    match chain.deploy(deployer, U256::ZERO, HELLO_WORLD_INIT_CODE) {
        Err(TestChainError::NonceUnavailable { address, source: LedgerError::Internal(_) }) => {
            assert_eq!(address, deployer)
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(chain.block_number(), 0);
}

#[test]
fn test_estimation_failure() {
    let mut chain = faulty_chain(Fault::Estimate);
    let (from, to) = (chain.account(1).unwrap(), chain.account(2).unwrap());
    assert!(matches!(
        chain.transfer(from, to, U256::from(1)),
        Err(TestChainError::GasEstimationFailed(LedgerError::Internal(_)))
    ));
    assert_eq!(chain.nonce(from).unwrap(), 0);
}

#[test]
fn test_mined_deployment_failure_consumes_nonce() {
    let mut chain = faulty_chain(Fault::Underestimate);
    let deployer = chain.deployer();

    match chain.deploy(deployer, U256::ZERO, HELLO_WORLD_INIT_CODE) {
        Err(TestChainError::DeploymentFailed { hash, gas_used, revert_data }) => {
            assert!(revert_data.is_empty());
            let receipt = chain.ledger().receipt(hash).unwrap();
            assert!(!receipt.is_success());
            assert_eq!(receipt.gas_used, gas_used);
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(chain.block_number(), 1);
    assert_eq!(chain.nonce(deployer).unwrap(), 1);
    assert!(chain.code(deployer.create(0)).unwrap().is_empty());
}

#[test]
fn test_mined_call_failure() {
    // Returns 42 for any call.
    let answer = Address::repeat_byte(0x42);
    let mut chain = faulty_chain_with(Fault::Underestimate, |genesis| {
        genesis.with_account(answer, GenesisAccount::default().with_code(bytes!("602a5f5260205ff3")))
    });
    let from = chain.account(1).unwrap();

    match chain.transact(from, answer, U256::ZERO, Bytes::new()) {
        Err(TestChainError::TransactionFailed { hash, revert_data, .. }) => {
            assert!(revert_data.is_empty());
            assert!(!chain.ledger().receipt(hash).unwrap().is_success());
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(chain.nonce(from).unwrap(), 1);
}

#[test]
fn test_lost_receipt() {
    let mut chain = faulty_chain(Fault::LoseReceipts);
    let (from, to) = (chain.account(1).unwrap(), chain.account(2).unwrap());
    assert!(matches!(
        chain.transfer(from, to, U256::from(1)),
        Err(TestChainError::ReceiptUnavailable { source: LedgerError::ReceiptNotFound(_), .. })
    ));
    // The transaction itself landed.
    assert_eq!(chain.balance(to).unwrap(), chain.accounts()[2].initial_balance + U256::from(1));
}

#[test]
fn test_underestimated_transfer_is_refused() {
    let mut chain = faulty_chain(Fault::Underestimate);
    let (from, to) = (chain.account(1).unwrap(), chain.account(2).unwrap());
    assert!(matches!(
        chain.transfer(from, to, U256::from(1)),
        Err(TestChainError::SubmissionFailed { source: LedgerError::InvalidTransaction(_), .. })
    ));
    assert_eq!(chain.block_number(), 0);
}

#[test]
fn test_raw_transaction_for_other_chain() {
    let mut chain = TestChain::new().unwrap();
    assert!(matches!(
        chain.submit_raw(CHAIN_1_TX),
        Err(TestChainError::SubmissionFailed {
            source: LedgerError::ChainIdMismatch { expected: 1337, got: 1 },
            ..
        })
    ));
}

#[test]
fn test_raw_transaction_from_unfunded_sender() {
    let mut chain = TestChain::new().unwrap();
    assert!(matches!(
        chain.submit_raw(CHAIN_1337_TX),
        Err(TestChainError::SubmissionFailed {
            source: LedgerError::InvalidTransaction(InvalidTransaction::LackOfFundForMaxFee { .. }),
            ..
        })
    ));
}

#[test]
fn test_malformed_raw_transaction() {
    let mut chain = TestChain::new().unwrap();
    assert!(matches!(
        chain.submit_raw(&[0xc0, 0x01]),
        Err(TestChainError::SubmissionFailed { source: LedgerError::MalformedTransaction(_), .. })
    ));
}

#[test]
fn test_undecodable_call_output() {
    let chain = TestChain::new().unwrap();
    let nobody = chain.account(20).unwrap();
    assert!(matches!(
        chain.call_sol(nobody, nobody, IHelloWorld::helloCall {}),
        Err(TestChainError::Decode(_))
    ));
}

#[test]
fn test_mismatched_ledger_chain_id() {
    let config = ChainConfig::default();
    let registry = AccountRegistry::from_config(&config).unwrap();
    let ledger = simulated(&config.clone().with_chain_id(1), &registry);
    assert!(matches!(
        TestChain::with_ledger(ledger, registry, config),
        Err(TestChainError::InvalidConfig(_))
    ));
}

#[test]
fn test_boxed_ledger() {
    let config = ChainConfig::default();
    let registry = AccountRegistry::from_config(&config).unwrap();
    let ledger: Box<dyn Ledger> = Box::new(simulated(&config, &registry));
    let mut chain = TestChain::with_ledger(ledger, registry, config).unwrap();

    let deployer = chain.deployer();
    let contract = chain.deploy(deployer, U256::ZERO, HELLO_WORLD_INIT_CODE).unwrap();
    assert_eq!(chain.call(deployer, contract, HELLO_SELECTOR.into()).unwrap(), HELLO_WORLD_OUTPUT);
}

#[test]
fn test_borrowed_ledger() {
    let config = ChainConfig::default();
    let registry = AccountRegistry::from_config(&config).unwrap();
    let mut ledger = simulated(&config, &registry);
    {
        let mut chain = TestChain::with_ledger(&mut ledger, registry, config).unwrap();
        let (from, to) = (chain.account(1).unwrap(), chain.account(2).unwrap());
        chain.transfer(from, to, U256::from(5)).unwrap();
    }
    assert_eq!(ledger.block_number(), 1);
}
