//! Fixtures shared by the test suites.

#![allow(missing_docs)]

use alloy_primitives::{bytes, hex, Bytes};
use alloy_sol_types::sol;
use testchain_contracts::BytecodeBuilder;
use tracing_subscriber::{fmt, EnvFilter};

sol! {
    #[derive(Debug, PartialEq, Eq)]
    interface IHelloWorld {
        function hello() external pure returns (string memory);
    }
}

/// Install a `fmt` subscriber honouring `RUST_LOG`. Safe to call from every test.
pub fn init_tracing() {
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Init code of a contract whose `hello()` returns `"Hello, world!"`.
pub const HELLO_WORLD_INIT_CODE: Bytes = bytes!("608060405234801561001057600080fd5b50610108806100206000396000f3fe6080604052348015600f57600080fd5b506004361060285760003560e01c806319ff1d2114602d575b600080fd5b603360a5565b6040805160208082528351818301528351919283929083019185019080838360005b83811015606b5781810151838201526020016055565b50505050905090810190601f16801560975780820380516001836020036101000a031916815260200191505b509250505060405180910390f35b60408051808201909152600d81527f48656c6c6f2c20776f726c64210000000000000000000000000000000000000060208201529056fea165627a7a72305820025f93d88ad4ed442aaaed9b4041425029b6a951425bb127494ab09293568c5c0029");

/// Selector of `hello()`.
pub const HELLO_SELECTOR: [u8; 4] = hex!("19ff1d21");

/// ABI encoding of the string `"Hello, world!"` as returned by `hello()`.
pub const HELLO_WORLD_OUTPUT: Bytes = bytes!("0000000000000000000000000000000000000000000000000000000000000020000000000000000000000000000000000000000000000000000000000000000d48656c6c6f2c20776f726c642100000000000000000000000000000000000000");

/// Init code whose constructor reverts with `data`.
pub fn reverting_init_code(data: &[u8]) -> Bytes {
    let mut code = BytecodeBuilder::default();
    for (index, chunk) in data.chunks(32).enumerate() {
        let mut word = [0u8; 32];
        word[..chunk.len()].copy_from_slice(chunk);
        code = code.push_bytes(word).mstore_top(index as u64 * 32);
    }
    code.push_number(data.len() as u64).push_number(0u8).append(revm::bytecode::opcode::REVERT).build()
}

/// Init code deploying `runtime` verbatim.
pub fn init_code_for(runtime: &[u8]) -> Bytes {
    use revm::bytecode::opcode::{CODECOPY, PUSH0, RETURN};

    let len = runtime.len() as u64;
    BytecodeBuilder::default()
        .push_number(len)
        .push_label("runtime")
        .append(PUSH0)
        .append(CODECOPY)
        .push_number(len)
        .append(PUSH0)
        .append(RETURN)
        .mark("runtime")
        .append_many(runtime.iter().copied())
        .build()
}
