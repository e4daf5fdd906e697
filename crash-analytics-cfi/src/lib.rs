//! Direct-call graph construction and machine-code fingerprinting for
//! functions whose symbol names have been stripped.
//!
//! Both passes decode the same instruction stream once via [`disasm`] and
//! derive different views of it: [`CallGraph`] keeps only direct `CALL`
//! targets, [`fingerprint`] also looks at conditional jumps, `AND`/`OR`,
//! shifts, and backward jumps within the function body.

#![warn(missing_docs)]

mod disasm;
mod fingerprint;
mod graph;

pub use fingerprint::fingerprint;
pub use graph::CallGraph;

use thiserror::Error;

/// One entry of a binary's Procedure Linkage Table: an external symbol
/// reachable through a fixed stub address.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PltEntry {
    /// Address of the PLT stub.
    pub address: u64,
    /// The external symbol it resolves to.
    pub symbol_name: String,
}

/// One `.eh_frame`/FDE entry describing a function's extent.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FdeEntry {
    /// Base address the binary was (or would be) loaded at.
    pub exec_base: u64,
    /// Start address of the function, including `exec_base`.
    pub start_address: u64,
    /// Length of the function body, in bytes.
    pub length: u64,
}

/// Supplies raw code bytes for an address range, decoupling this crate from
/// any particular object-file loader.
pub trait CodeProvider {
    /// Returns `length` bytes of code starting at `address`, or `None` if
    /// the range is not backed by this provider.
    fn code_at(&self, address: u64, length: u64) -> Option<&[u8]>;
}

/// Errors produced while decoding or fingerprinting a function body.
#[derive(Debug, Error)]
pub enum CfiError {
    /// The code provider had no bytes for the requested range.
    #[error("no code bytes available for address {address:#x}, length {length:#x}")]
    MissingCode {
        /// Address that was requested.
        address: u64,
        /// Length that was requested.
        length: u64,
    },
    /// The disassembler itself failed to initialize or decode.
    #[error("disassembly failed: {0}")]
    Disassembly(#[from] capstone::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) struct FixedCode(pub Vec<u8>, pub u64);

    impl CodeProvider for FixedCode {
        fn code_at(&self, address: u64, length: u64) -> Option<&[u8]> {
            if address == self.1 && (length as usize) <= self.0.len() {
                Some(&self.0[..length as usize])
            } else {
                None
            }
        }
    }

    #[test]
    fn missing_code_is_reported() {
        let provider = FixedCode(vec![0x90], 0x1000);
        let fde = FdeEntry { exec_base: 0, start_address: 0x2000, length: 1 };
        let err = CallGraph::build(&provider, &[fde]).unwrap_err();
        assert!(matches!(err, CfiError::MissingCode { .. }));
    }
}
