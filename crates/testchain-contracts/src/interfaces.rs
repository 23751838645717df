//! Solidity interfaces of the contracts deployed on the test chain.

use alloy_sol_types::sol;

sol! {
    /// Token surface implemented by both token contracts.
    ///
    /// `decimals` is only served by the fixed-point token and `granularity` only by the
    /// advanced token; the other one reverts.
    #[derive(Debug, PartialEq, Eq)]
    interface IToken {
        /// Emitted on mint and on every transfer.
        event Transfer(address indexed from, address indexed to, uint256 value);

        function totalSupply() external view returns (uint256);
        function balanceOf(address owner) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
        function decimals() external view returns (uint8);
        function granularity() external view returns (uint256);
    }

    /// The ERC-1820 pseudo-introspection registry.
    #[derive(Debug, PartialEq, Eq)]
    interface IERC1820Registry {
        event InterfaceImplementerSet(
            address indexed addr,
            bytes32 indexed interfaceHash,
            address indexed implementer
        );

        function setInterfaceImplementer(
            address addr,
            bytes32 interfaceHash,
            address implementer
        ) external;
        function getInterfaceImplementer(address addr, bytes32 interfaceHash)
            external
            view
            returns (address);
        function interfaceHash(string calldata interfaceName) external pure returns (bytes32);
        function getManager(address addr) external view returns (address);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_sol_types::{SolCall, SolEvent};

    #[test]
    fn test_selectors_match_deployed_abi() {
        assert_eq!(IToken::totalSupplyCall::SELECTOR, [0x18, 0x16, 0x0d, 0xdd]);
        assert_eq!(IToken::decimalsCall::SELECTOR, [0x31, 0x3c, 0xe5, 0x67]);
        assert_eq!(IToken::granularityCall::SELECTOR, [0x55, 0x6f, 0x0d, 0xc7]);
        assert_eq!(IToken::balanceOfCall::SELECTOR, [0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(IToken::transferCall::SELECTOR, [0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(IERC1820Registry::setInterfaceImplementerCall::SELECTOR, [0x29, 0x96, 0x5a, 0x1d]);
        assert_eq!(
            IToken::Transfer::SIGNATURE_HASH,
            alloy_primitives::b256!(
                "ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
            )
        );
    }
}
