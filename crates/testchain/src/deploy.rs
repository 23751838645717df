//! Deployers for the contracts scenarios rely on.

use alloy_primitives::{Address, U256};
use testchain_contracts::{
    advanced_token,
    registry::{registry_deployment_cost, REGISTRY_ADDRESS, REGISTRY_DEPLOYER, REGISTRY_DEPLOYMENT_TX},
    token,
};
use tracing::{debug, info};

use crate::{Ledger, Result, TestChain, TestChainError};

/// Deploy an ERC-20 style token with `decimals`, minting the whole supply to `owner`.
///
/// Deployed by the chain's deployer account.
pub fn deploy_token_contract<L: Ledger>(
    chain: &mut TestChain<L>,
    decimals: u8,
    owner: Address,
) -> Result<Address> {
    let deployer = chain.deployer();
    chain.deploy(deployer, U256::ZERO, token::init_code(decimals, owner))
}

/// Deploy an ERC-777 style token with `granularity`, minting the whole supply to `owner`.
///
/// The token registers itself in the ERC-1820 registry, so
/// [`deploy_registry_contract`] must have run first. A zero granularity is rejected by the
/// constructor.
pub fn deploy_advanced_token_contract<L: Ledger>(
    chain: &mut TestChain<L>,
    granularity: U256,
    owner: Address,
) -> Result<Address> {
    let deployer = chain.deployer();
    chain.deploy(deployer, U256::ZERO, advanced_token::init_code(granularity, owner))
}

/// Deploy the ERC-1820 registry at its canonical address.
///
/// The keyless deployer is topped up by the deployer account to exactly the gas cost of the
/// pre-signed transaction, which is then submitted as is. Does nothing when the registry is
/// already deployed.
pub fn deploy_registry_contract<L: Ledger>(chain: &mut TestChain<L>) -> Result<()> {
    if !chain.code(REGISTRY_ADDRESS)?.is_empty() {
        debug!(address = %REGISTRY_ADDRESS, "Registry already deployed");
        return Ok(());
    }

    let cost = registry_deployment_cost();
    let balance = chain.balance(REGISTRY_DEPLOYER)?;
    if balance < cost {
        let funder = chain.deployer();
        chain.transfer(funder, REGISTRY_DEPLOYER, cost - balance)?;
    }

    let receipt = chain.submit_raw(REGISTRY_DEPLOYMENT_TX)?;
    if !receipt.is_success() {
        return Err(TestChainError::DeploymentFailed {
            hash: receipt.transaction_hash,
            gas_used: receipt.gas_used,
            revert_data: receipt.output,
        });
    }
    if receipt.contract_address != Some(REGISTRY_ADDRESS) || chain.code(REGISTRY_ADDRESS)?.is_empty()
    {
        return Err(TestChainError::RegistryAddressMismatch {
            expected: REGISTRY_ADDRESS,
            actual: receipt.contract_address,
        });
    }
    info!(address = %REGISTRY_ADDRESS, gas_used = receipt.gas_used, "Registry deployed");
    Ok(())
}
