//! A small assembler for EVM bytecode.
//!
//! Jump targets are referenced by label. Every label reference is emitted as a `PUSH2`
//! placeholder and patched when [`BytecodeBuilder::build`] resolves the final offsets.

use std::collections::HashMap;

use alloy_primitives::{Address, Bytes, U256};
use revm::bytecode::opcode::{JUMPDEST, MSTORE, PUSH0, PUSH2, RETURN, REVERT};

/// A builder for assembling EVM bytecode.
#[derive(Debug, Default, Clone)]
pub struct BytecodeBuilder {
    code: Vec<u8>,
    labels: HashMap<&'static str, usize>,
    fixups: Vec<(usize, &'static str)>,
}

impl BytecodeBuilder {
    /// Build the bytecode, resolving every label reference.
    ///
    /// # Panics
    ///
    /// Panics if a referenced label was never placed, or if a label lies beyond the range a
    /// `PUSH2` can address. Both are assembly mistakes in the generator, not runtime inputs.
    pub fn build(self) -> Bytes {
        self.build_vec().into()
    }

    /// Build the bytecode as a vector.
    pub fn build_vec(mut self) -> Vec<u8> {
        for (position, label) in &self.fixups {
            let Some(&target) = self.labels.get(label) else {
                panic!("label `{label}` is referenced but never placed");
            };
            let target = u16::try_from(target)
                .unwrap_or_else(|_| panic!("label `{label}` is out of PUSH2 range"));
            self.code[position + 1..position + 3].copy_from_slice(&target.to_be_bytes());
        }
        self.code
    }

    /// Get the length of the bytecode.
    pub fn len(&self) -> usize {
        self.code.len()
    }

    /// Check if the bytecode is empty.
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Append a single opcode or byte.
    pub fn append(mut self, opcode: u8) -> Self {
        self.code.push(opcode);
        self
    }

    /// Append a series of opcodes or bytes.
    pub fn append_many(mut self, items: impl IntoIterator<Item = u8>) -> Self {
        self.code.extend(items);
        self
    }

    /// Record `label` at the current offset without emitting anything.
    ///
    /// Used for data offsets, such as the start of a runtime appended after a constructor.
    pub fn mark(mut self, label: &'static str) -> Self {
        let previous = self.labels.insert(label, self.code.len());
        assert!(previous.is_none(), "label `{label}` placed twice");
        self
    }

    /// Emit a `JUMPDEST` and record `label` at it.
    pub fn jumpdest(self, label: &'static str) -> Self {
        self.mark(label).append(JUMPDEST)
    }

    /// Push the offset of `label`, which may be placed later.
    pub fn push_label(mut self, label: &'static str) -> Self {
        self.fixups.push((self.code.len(), label));
        self.code.extend([PUSH2, 0, 0]);
        self
    }

    /// Append a PUSH opcode and the bytes to push.
    pub fn push_bytes(mut self, bytes: impl AsRef<[u8]>) -> Self {
        let bytes: &[u8] = bytes.as_ref();
        assert!(bytes.len() <= 32);
        self.code.push(PUSH0 + bytes.len() as u8);
        self.code.extend_from_slice(bytes);
        self
    }

    /// Append the shortest PUSH opcode for the number. Zero becomes `PUSH0`.
    pub fn push_number(self, number: impl Into<u128>) -> Self {
        self.push_u256(U256::from(number.into()))
    }

    /// Append a PUSH opcode and the address to push.
    pub fn push_address(self, address: Address) -> Self {
        self.push_bytes(address)
    }

    /// Append the shortest PUSH opcode for the u256 value.
    pub fn push_u256(self, value: U256) -> Self {
        let bytes = value.to_be_bytes::<32>();
        let skip = bytes.iter().take_while(|b| **b == 0).count();
        self.push_bytes(&bytes[skip..])
    }

    /// Store the word currently on top of the stack at memory `offset`.
    pub fn mstore_top(self, offset: u64) -> Self {
        self.push_number(offset).append(MSTORE)
    }

    /// Append a REVERT opcode with empty return data.
    pub fn revert(self) -> Self {
        self.append_many([PUSH0, PUSH0, REVERT])
    }

    /// Return the word on top of the stack as 32 bytes of output.
    pub fn return_top(self) -> Self {
        self.append(PUSH0).append(MSTORE).push_number(32u8).append_many([PUSH0, RETURN])
    }
}
