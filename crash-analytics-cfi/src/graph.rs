use std::collections::BTreeMap;

use crate::disasm::decode_function;
use crate::{CfiError, CodeProvider, FdeEntry};

/// A direct-call graph: each function's address maps to the sorted, unique
/// set of addresses it calls directly.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CallGraph {
    edges: BTreeMap<u64, Vec<u64>>,
}

impl CallGraph {
    /// Decodes every function named by `fdes` and records its direct call
    /// targets.
    pub fn build(provider: &dyn CodeProvider, fdes: &[FdeEntry]) -> Result<CallGraph, CfiError> {
        let mut edges = BTreeMap::new();
        for fde in fdes {
            let code = provider
                .code_at(fde.start_address, fde.length)
                .ok_or(CfiError::MissingCode { address: fde.start_address, length: fde.length })?;
            let insns = decode_function(code, fde.start_address)?;

            let mut callees: Vec<u64> = insns
                .iter()
                .filter(|insn| insn.mnemonic.starts_with("call"))
                .filter_map(|insn| insn.branch_target)
                .collect();
            callees.sort_unstable();
            callees.dedup();

            edges.insert(fde.start_address, callees);
        }
        Ok(CallGraph { edges })
    }

    /// The sorted, unique set of addresses called directly from `address`,
    /// or an empty slice if `address` was not one of the decoded functions.
    pub fn callees(&self, address: u64) -> &[u64] {
        self.edges.get(&address).map(Vec::as_slice).unwrap_or(&[])
    }
}
