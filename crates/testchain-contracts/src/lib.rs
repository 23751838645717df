//! Contracts used by the EVM test chain.
//!
//! Init code for the token contracts is assembled at runtime with [`BytecodeBuilder`], so the
//! crate needs no Solidity toolchain. The ERC-1820 registry is deployed from its canonical
//! pre-signed transaction.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![deny(unused_must_use)]

pub use alloy_primitives;

mod opcode_gen;
pub use opcode_gen::*;

pub mod interfaces;

pub mod advanced_token;
pub mod registry;
pub mod token;

mod assembly;
