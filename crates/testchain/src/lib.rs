//! A deterministic, in-process EVM test chain.
//!
//! [`TestChain`] owns a set of funded accounts and a [`Ledger`]. It builds, signs and submits
//! transactions, forces a block per submission and hands back receipts or contract addresses.
//! The shipped ledger, [`SimulatedLedger`], executes real bytecode with `revm` over an
//! in-memory database.
//!
//! ```ignore
//! let mut chain = TestChain::new()?;
//! let owner = chain.owner();
//! let token = deploy_token_contract(&mut chain, 3, owner)?;
//! ```

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub use testchain_contracts as contracts;

pub mod constants;

mod accounts;
pub use accounts::*;

mod chain;
pub use chain::*;

mod config;
pub use config::*;

mod deploy;
pub use deploy::*;

mod error;
pub use error::*;

pub mod ledger;
pub use ledger::{Ledger, LedgerError, SimulatedLedger};

mod tx;
pub use tx::*;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
