//! Shared assembly of the two token contracts.
//!
//! Storage layout:
//! - slot 0: total supply
//! - slot 1: decimals (fixed-point token) or granularity (advanced token)
//! - `keccak256(owner . 2)`: balance of `owner`
//!
//! The constructor reads its two ABI-encoded words from the tail of the init code.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, SolEvent};
use revm::bytecode::opcode::{
    ADD, ADDRESS, CALL, CALLDATALOAD, CALLDATASIZE, CALLER, CALLVALUE, CODECOPY, CODESIZE, DUP1,
    DUP2, DUP3, DUP4, EQ, EXTCODESIZE, GAS, ISZERO, JUMPI, KECCAK256, LOG3, LT, MLOAD, MOD, MSTORE,
    PUSH0, RETURN, SHL, SHR, SLOAD, SSTORE, SUB, SWAP1,
};

use crate::{
    advanced_token::ERC777_TOKEN_INTERFACE_HASH,
    interfaces::{IERC1820Registry, IToken},
    registry::REGISTRY_ADDRESS,
    token::{BALANCES_SLOT, PARAMETER_SLOT, TOTAL_SUPPLY, TOTAL_SUPPLY_SLOT},
    BytecodeBuilder,
};

const REVERT: &str = "revert";
const RUNTIME: &str = "runtime";

/// Which of the two token contracts to assemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flavour {
    /// ERC-20 style token with `decimals()`.
    Fixed,
    /// ERC-777 style token with `granularity()` and ERC-1820 registration.
    Granular,
}

impl Flavour {
    const fn parameter_selector(self) -> [u8; 4] {
        match self {
            Self::Fixed => IToken::decimalsCall::SELECTOR,
            Self::Granular => IToken::granularityCall::SELECTOR,
        }
    }
}

/// Replace the address word on top of the stack with its balance slot.
fn balance_slot(code: BytecodeBuilder) -> BytecodeBuilder {
    code.append(PUSH0)
        .append(MSTORE)
        .push_number(BALANCES_SLOT)
        .mstore_top(0x20)
        .push_number(0x40u8)
        .append(PUSH0)
        .append(KECCAK256)
}

/// Load the calldata word at `offset`, reverting unless it is a clean address.
fn address_argument(code: BytecodeBuilder, offset: u8) -> BytecodeBuilder {
    code.push_number(offset)
        .append(CALLDATALOAD)
        .append(DUP1)
        .push_number(0xa0u8)
        .append(SHR)
        .push_label(REVERT)
        .append(JUMPI)
}

/// Deployed code of the token.
pub(crate) fn runtime_code(flavour: Flavour) -> Bytes {
    let mut code = BytecodeBuilder::default()
        .append(CALLVALUE)
        .push_label(REVERT)
        .append(JUMPI)
        .push_number(4u8)
        .append(CALLDATASIZE)
        .append(LT)
        .push_label(REVERT)
        .append(JUMPI)
        .append(PUSH0)
        .append(CALLDATALOAD)
        .push_number(0xe0u8)
        .append(SHR);

    for (selector, label) in [
        (IToken::totalSupplyCall::SELECTOR, "totalSupply"),
        (flavour.parameter_selector(), "parameter"),
        (IToken::balanceOfCall::SELECTOR, "balanceOf"),
        (IToken::transferCall::SELECTOR, "transfer"),
    ] {
        code = code.append(DUP1).push_bytes(selector).append(EQ).push_label(label).append(JUMPI);
    }

    code = code
        .jumpdest(REVERT)
        .revert()
        .jumpdest("totalSupply")
        .push_number(TOTAL_SUPPLY_SLOT)
        .append(SLOAD)
        .return_top()
        .jumpdest("parameter")
        .push_number(PARAMETER_SLOT)
        .append(SLOAD)
        .return_top()
        .jumpdest("balanceOf");
    code = address_argument(code, 4);
    code = balance_slot(code).append(SLOAD).return_top();

    // transfer(to, amount): [from_slot, from_balance, amount]
    code = balance_slot(code.jumpdest("transfer").append(CALLER))
        .append(DUP1)
        .append(SLOAD)
        .push_number(0x24u8)
        .append(CALLDATALOAD)
        .append(DUP1)
        .append(DUP3)
        .append(LT)
        .push_label(REVERT)
        .append(JUMPI);
    if flavour == Flavour::Granular {
        code = code
            .push_number(PARAMETER_SLOT)
            .append(SLOAD)
            .append(DUP2)
            .append(MOD)
            .push_label(REVERT)
            .append(JUMPI);
    }
    code = code.append(DUP1).append(DUP3).append(SUB).append(DUP4).append(SSTORE);
    code = balance_slot(address_argument(code, 4))
        .append(DUP1)
        .append(SLOAD)
        .append(DUP3)
        .append(ADD)
        .append(SWAP1)
        .append(SSTORE)
        .mstore_top(0x40)
        .push_number(4u8)
        .append(CALLDATALOAD)
        .append(CALLER)
        .push_bytes(IToken::Transfer::SIGNATURE_HASH)
        .push_number(0x20u8)
        .push_number(0x40u8)
        .append(LOG3)
        .push_number(1u8)
        .return_top();

    code.build()
}

/// Init code of the token, with the constructor arguments `(parameter, owner)` appended.
pub(crate) fn init_code(flavour: Flavour, parameter: U256, owner: Address) -> Bytes {
    let runtime = runtime_code(flavour);

    let mut code = BytecodeBuilder::default()
        .append(CALLVALUE)
        .push_label(REVERT)
        .append(JUMPI)
        .push_number(0x40u8)
        .push_number(0x40u8)
        .append(CODESIZE)
        .append(SUB)
        .append(PUSH0)
        .append(CODECOPY)
        .push_number(0x20u8)
        .append(MLOAD)
        .push_number(0xa0u8)
        .append(SHR)
        .push_label(REVERT)
        .append(JUMPI)
        .append(PUSH0)
        .append(MLOAD);
    code = match flavour {
        Flavour::Fixed => code.push_number(0xffu8).append(LT),
        Flavour::Granular => code.append(ISZERO),
    };
    code = code.push_label(REVERT).append(JUMPI);

    code = code
        .push_u256(TOTAL_SUPPLY)
        .push_number(TOTAL_SUPPLY_SLOT)
        .append(SSTORE)
        .append(PUSH0)
        .append(MLOAD)
        .push_number(PARAMETER_SLOT)
        .append(SSTORE)
        .push_number(0x20u8)
        .append(MLOAD)
        .push_u256(TOTAL_SUPPLY)
        .append(DUP2);
    code = balance_slot(code)
        .append(SSTORE)
        .push_u256(TOTAL_SUPPLY)
        .mstore_top(0x40)
        .append(PUSH0)
        .push_bytes(IToken::Transfer::SIGNATURE_HASH)
        .push_number(0x20u8)
        .push_number(0x40u8)
        .append(LOG3);

    if flavour == Flavour::Granular {
        // setInterfaceImplementer(this, ERC777Token, this) on the registry
        code = code
            .push_bytes(IERC1820Registry::setInterfaceImplementerCall::SELECTOR)
            .push_number(0xe0u8)
            .append(SHL)
            .mstore_top(0x80)
            .append(ADDRESS)
            .mstore_top(0x84)
            .push_bytes(ERC777_TOKEN_INTERFACE_HASH)
            .mstore_top(0xa4)
            .append(ADDRESS)
            .mstore_top(0xc4)
            .push_address(REGISTRY_ADDRESS)
            .append(EXTCODESIZE)
            .append(ISZERO)
            .push_label(REVERT)
            .append(JUMPI)
            .append(PUSH0)
            .append(PUSH0)
            .push_number(0x64u8)
            .push_number(0x80u8)
            .append(PUSH0)
            .push_address(REGISTRY_ADDRESS)
            .append(GAS)
            .append(CALL)
            .append(ISZERO)
            .push_label(REVERT)
            .append(JUMPI);
    }

    let runtime_len = runtime.len() as u64;
    let mut init = code
        .push_number(runtime_len)
        .push_label(RUNTIME)
        .append(PUSH0)
        .append(CODECOPY)
        .push_number(runtime_len)
        .append(PUSH0)
        .append(RETURN)
        .jumpdest(REVERT)
        .revert()
        .mark(RUNTIME)
        .append_many(runtime)
        .build_vec();

    init.extend_from_slice(&parameter.to_be_bytes::<32>());
    init.extend_from_slice(owner.into_word().as_slice());
    init.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use rstest::rstest;

    const OWNER: Address = address!("0x00000000000000000000000000000000000000aa");

    #[rstest]
    #[case(Flavour::Fixed)]
    #[case(Flavour::Granular)]
    fn test_init_code_layout(#[case] flavour: Flavour) {
        let runtime = runtime_code(flavour);
        let init = init_code(flavour, U256::from(7), OWNER);

        let (body, args) = init.split_at(init.len() - 64);
        assert!(body.ends_with(&runtime));
        assert_eq!(U256::from_be_slice(&args[..32]), U256::from(7));
        assert_eq!(Address::from_word(args[32..].try_into().unwrap()), OWNER);
    }

    #[test]
    fn test_flavours_serve_different_parameters() {
        let fixed = runtime_code(Flavour::Fixed);
        let granular = runtime_code(Flavour::Granular);
        let contains = |code: &Bytes, needle: [u8; 4]| code.windows(4).any(|w| w == needle);

        assert!(contains(&fixed, IToken::decimalsCall::SELECTOR));
        assert!(!contains(&fixed, IToken::granularityCall::SELECTOR));
        assert!(contains(&granular, IToken::granularityCall::SELECTOR));
        assert!(!contains(&granular, IToken::decimalsCall::SELECTOR));
    }

    #[test]
    fn test_only_granular_constructor_calls_registry() {
        let contains_registry =
            |code: &Bytes| code.windows(20).any(|w| w == REGISTRY_ADDRESS.as_slice());
        assert!(!contains_registry(&init_code(Flavour::Fixed, U256::from(18), OWNER)));
        assert!(contains_registry(&init_code(Flavour::Granular, U256::from(1), OWNER)));
    }
}
