use std::collections::{BTreeSet, VecDeque};

use crate::disasm::decode_function;
use crate::graph::CallGraph;
use crate::{CfiError, CodeProvider, FdeEntry, PltEntry};

const EQUALITY_JUMPS: &[&str] = &["je", "jne", "jz", "jnz"];
const SIGNED_JUMPS: &[&str] = &["jg", "jge", "jl", "jle", "jo", "jno", "js", "jns"];
const UNSIGNED_JUMPS: &[&str] = &["ja", "jae", "jb", "jbe"];
const SHIFTS: &[&str] = &["shl", "shr", "sar", "sal", "rol", "ror"];

const CALLTREE_DEPTH: u32 = 6;

/// Builds the short textual fingerprint for one function's machine code.
///
/// `plt` is consulted to turn raw call targets into symbol names for the
/// `libcalls`/`calltree_leaves` fragments; `graph` supplies the call
/// relationships used to walk the calltree. If `hash` is set, the returned
/// fingerprint is replaced by its SHA-1 hex digest and the second tuple
/// element is `true`.
pub fn fingerprint(
    provider: &dyn CodeProvider,
    fde: &FdeEntry,
    plt: &[PltEntry],
    graph: &CallGraph,
    hash: bool,
) -> Result<(String, bool), CfiError> {
    let code = provider
        .code_at(fde.start_address, fde.length)
        .ok_or(CfiError::MissingCode { address: fde.start_address, length: fde.length })?;
    let insns = decode_function(code, fde.start_address)?;

    let range = fde.start_address..fde.start_address + fde.length;
    let j_eql = insns.iter().any(|i| EQUALITY_JUMPS.contains(&i.mnemonic.as_str()));
    let j_sgn = insns.iter().any(|i| SIGNED_JUMPS.contains(&i.mnemonic.as_str()));
    let j_usn = insns.iter().any(|i| UNSIGNED_JUMPS.contains(&i.mnemonic.as_str()));
    let and_or = insns.iter().any(|i| i.mnemonic == "and" || i.mnemonic == "or");
    let shift = insns.iter().any(|i| SHIFTS.contains(&i.mnemonic.as_str()));
    let has_cycle = insns
        .iter()
        .any(|i| i.mnemonic == "jmp" && i.branch_target.is_some_and(|t| range.contains(&t)));

    let libcalls = direct_libcalls(&insns, plt);
    let calltree_leaves = calltree_leaves(fde.start_address, graph, plt);

    let text = format!(
        "j_eql:{}|j_sgn:{}|j_usn:{}|and_or:{}|shift:{}|has_cycle:{}|libcalls:{}|calltree_leaves:{}",
        j_eql as u8,
        j_sgn as u8,
        j_usn as u8,
        and_or as u8,
        shift as u8,
        has_cycle as u8,
        join_or_dash(&libcalls),
        join_or_dash(&calltree_leaves),
    );

    if hash {
        Ok((sha1_hex(&text), true))
    } else {
        Ok((text, false))
    }
}

fn direct_libcalls(insns: &[crate::disasm::DecodedInsn], plt: &[PltEntry]) -> BTreeSet<String> {
    insns
        .iter()
        .filter(|i| i.mnemonic.starts_with("call"))
        .filter_map(|i| i.branch_target)
        .filter_map(|target| plt.iter().find(|p| p.address == target))
        .map(|p| p.symbol_name.clone())
        .collect()
}

fn calltree_leaves(start: u64, graph: &CallGraph, plt: &[PltEntry]) -> BTreeSet<String> {
    let mut leaves = BTreeSet::new();
    let mut visited = BTreeSet::new();
    let mut queue = VecDeque::new();
    queue.push_back((start, 0u32));
    visited.insert(start);

    while let Some((addr, depth)) = queue.pop_front() {
        if depth >= CALLTREE_DEPTH {
            continue;
        }
        for &callee in graph.callees(addr) {
            if let Some(plt_entry) = plt.iter().find(|p| p.address == callee) {
                leaves.insert(plt_entry.symbol_name.clone());
                continue;
            }
            if visited.insert(callee) {
                queue.push_back((callee, depth + 1));
            }
        }
    }

    leaves
}

fn join_or_dash(items: &BTreeSet<String>) -> String {
    if items.is_empty() {
        "-".to_owned()
    } else {
        items.iter().cloned().collect::<Vec<_>>().join(",")
    }
}

fn sha1_hex(text: &str) -> String {
    let mut hasher = sha1_smol::Sha1::new();
    hasher.update(text.as_bytes());
    hasher.digest().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedCode {
        code: Vec<u8>,
        address: u64,
    }

    impl CodeProvider for FixedCode {
        fn code_at(&self, address: u64, length: u64) -> Option<&[u8]> {
            if address == self.address && (length as usize) <= self.code.len() {
                Some(&self.code[..length as usize])
            } else {
                None
            }
        }
    }

    #[test]
    fn fingerprints_a_call_and_conditional_jump() {
        // call rel32 (+5), je rel8 (+0), ret
        let code = vec![0xe8, 0x00, 0x00, 0x00, 0x00, 0x74, 0x00, 0xc3];
        let provider = FixedCode { code: code.clone(), address: 0x1000 };
        let fde = FdeEntry { exec_base: 0, start_address: 0x1000, length: code.len() as u64 };
        let plt = vec![PltEntry { address: 0x1005, symbol_name: "puts".into() }];
        let graph = CallGraph::build(&provider, &[fde]).unwrap();

        let (text, hashed) = fingerprint(&provider, &fde, &plt, &graph, false).unwrap();
        assert!(!hashed);
        assert!(text.contains("j_eql:1"));
        assert!(text.contains("libcalls:puts"));
    }

    #[test]
    fn hashing_replaces_text_with_sha1_digest() {
        let code = vec![0xc3];
        let provider = FixedCode { code: code.clone(), address: 0x2000 };
        let fde = FdeEntry { exec_base: 0, start_address: 0x2000, length: code.len() as u64 };
        let graph = CallGraph::build(&provider, &[fde]).unwrap();
        let (digest, hashed) = fingerprint(&provider, &fde, &[], &graph, true).unwrap();
        assert!(hashed);
        assert_eq!(digest.len(), 40);
    }
}
