//! Instruction units and their assembly into a transaction.

use std::collections::HashSet;
use std::fmt;

use solana_program::instruction::Instruction;
use solana_program::pubkey::Pubkey;
use solana_sdk::signature::Signer;

use crate::shared::SignerHandle;

/// A ready-to-submit instruction with the signers it needs
#[derive(Clone)]
pub struct WrappedInstruction {
    pub instruction: Instruction,
    pub signers: Vec<SignerHandle>,
    /// New account storage the instruction allocates on-chain
    pub bytes_created_on_chain: u64,
}

impl fmt::Debug for WrappedInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let signers: Vec<Pubkey> = self.signers.iter().map(|s| s.pubkey()).collect();
        f.debug_struct("WrappedInstruction")
            .field("instruction", &self.instruction)
            .field("signers", &signers)
            .field("bytes_created_on_chain", &self.bytes_created_on_chain)
            .finish()
    }
}

/// Ordered collection of instruction units forming one transaction
#[derive(Debug, Clone, Default)]
pub struct TransactionBuilder {
    items: Vec<WrappedInstruction>,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, item: WrappedInstruction) -> Self {
        self.items.push(item);
        self
    }

    pub fn append(mut self, other: TransactionBuilder) -> Self {
        self.items.extend(other.items);
        self
    }

    pub fn items(&self) -> &[WrappedInstruction] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn instructions(&self) -> Vec<Instruction> {
        self.items.iter().map(|item| item.instruction.clone()).collect()
    }

    /// Signers of every instruction, first occurrence of each key kept
    pub fn signers(&self) -> Vec<SignerHandle> {
        let mut seen = HashSet::new();
        self.items
            .iter()
            .flat_map(|item| item.signers.iter())
            .filter(|signer| seen.insert(signer.pubkey()))
            .cloned()
            .collect()
    }

    pub fn bytes_created_on_chain(&self) -> u64 {
        self.items.iter().map(|item| item.bytes_created_on_chain).sum()
    }
}

impl From<WrappedInstruction> for TransactionBuilder {
    fn from(item: WrappedInstruction) -> Self {
        Self::new().add(item)
    }
}
