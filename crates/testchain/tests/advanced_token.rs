//! Tests for the ERC-1820 registry and the granular token that registers in it.

use alloy_primitives::{keccak256, Address, U256};
use alloy_sol_types::SolCall;
use evm_testchain::{
    contracts::{
        advanced_token::{self, ERC777_TOKEN_INTERFACE, ERC777_TOKEN_INTERFACE_HASH, TOTAL_SUPPLY},
        interfaces::{IERC1820Registry, IToken},
        registry::{
            registry_deployment_cost, REGISTRY_ADDRESS, REGISTRY_CODE_HASH, REGISTRY_DEPLOYER,
        },
    },
    deploy_advanced_token_contract, deploy_registry_contract,
    test_utils::*,
    LedgerError, TestChain, TestChainError,
};
use rstest::rstest;

const GRANULARITY: u64 = 1_000_000_000;

fn chain_with_registry() -> TestChain {
    init_tracing();
    let mut chain = TestChain::new().unwrap();
    deploy_registry_contract(&mut chain).unwrap();
    chain
}

#[test]
fn test_registry_at_canonical_address() {
    let chain = chain_with_registry();
    let code = chain.code(REGISTRY_ADDRESS).unwrap();
    assert!(!code.is_empty());
    assert_eq!(keccak256(&code), REGISTRY_CODE_HASH);

    // The deployer was topped up to exactly the deployment cost and then spent part of it.
    assert!(chain.balance(REGISTRY_DEPLOYER).unwrap() < registry_deployment_cost());
    assert_eq!(chain.nonce(REGISTRY_DEPLOYER).unwrap(), 1);
    assert_eq!(chain.block_number(), 2);
}

#[test]
fn test_registry_deployment_is_idempotent() {
    let mut chain = chain_with_registry();
    deploy_registry_contract(&mut chain).unwrap();
    assert_eq!(chain.block_number(), 2);
}

#[test]
fn test_registry_interface_hash() {
    let chain = chain_with_registry();
    let hash = chain
        .call_sol(
            chain.deployer(),
            REGISTRY_ADDRESS,
            IERC1820Registry::interfaceHashCall { interfaceName: ERC777_TOKEN_INTERFACE.into() },
        )
        .unwrap();
    assert_eq!(hash, ERC777_TOKEN_INTERFACE_HASH);
}

#[test]
fn test_granularity_and_supply() {
    let mut chain = chain_with_registry();
    let owner = chain.owner();
    let token = deploy_advanced_token_contract(&mut chain, U256::from(GRANULARITY), owner).unwrap();
    let caller = chain.account(0).unwrap();

    assert_eq!(
        chain.call_sol(caller, token, IToken::granularityCall {}).unwrap(),
        U256::from(GRANULARITY)
    );
    assert_eq!(chain.call_sol(caller, token, IToken::totalSupplyCall {}).unwrap(), TOTAL_SUPPLY);
    assert_eq!(chain.call_sol(caller, token, IToken::balanceOfCall { owner }).unwrap(), TOTAL_SUPPLY);
    assert_eq!(chain.code(token).unwrap(), advanced_token::runtime_code());
}

#[test]
fn test_token_registers_itself() {
    let mut chain = chain_with_registry();
    let owner = chain.owner();
    let token = deploy_advanced_token_contract(&mut chain, U256::from(GRANULARITY), owner).unwrap();

    let implementer = chain
        .call_sol(
            owner,
            REGISTRY_ADDRESS,
            IERC1820Registry::getInterfaceImplementerCall {
                addr: token,
                interfaceHash: ERC777_TOKEN_INTERFACE_HASH,
            },
        )
        .unwrap();
    assert_eq!(implementer, token);
}

#[test]
fn test_requires_registry() {
    let mut chain = TestChain::new().unwrap();
    let owner = chain.owner();
    assert!(matches!(
        deploy_advanced_token_contract(&mut chain, U256::from(GRANULARITY), owner),
        Err(TestChainError::GasEstimationFailed(LedgerError::ExecutionReverted { .. }))
    ));
}

#[test]
fn test_zero_granularity_rejected() {
    let mut chain = chain_with_registry();
    let owner = chain.owner();
    assert!(matches!(
        deploy_advanced_token_contract(&mut chain, U256::ZERO, owner),
        Err(TestChainError::GasEstimationFailed(LedgerError::ExecutionReverted { .. }))
    ));
}

#[rstest]
#[case(GRANULARITY, true)]
#[case(3 * GRANULARITY, true)]
#[case(GRANULARITY + 1, false)]
#[case(GRANULARITY / 2, false)]
fn test_transfers_respect_granularity(#[case] amount: u64, #[case] accepted: bool) {
    let mut chain = chain_with_registry();
    let owner = chain.owner();
    let token = deploy_advanced_token_contract(&mut chain, U256::from(GRANULARITY), owner).unwrap();
    let recipient = chain.account(11).unwrap();

    let input = IToken::transferCall { to: recipient, amount: U256::from(amount) }.abi_encode();
    let result = chain.transact(owner, token, U256::ZERO, input.into());
    assert_eq!(result.is_ok(), accepted);

    let expected = if accepted { U256::from(amount) } else { U256::ZERO };
    assert_eq!(
        chain.call_sol(owner, token, IToken::balanceOfCall { owner: recipient }).unwrap(),
        expected
    );
}

#[test]
fn test_manager_defaults_to_self() {
    let chain = chain_with_registry();
    let someone: Address = chain.account(12).unwrap();
    let manager = chain
        .call_sol(someone, REGISTRY_ADDRESS, IERC1820Registry::getManagerCall { addr: someone })
        .unwrap();
    assert_eq!(manager, someone);
}
