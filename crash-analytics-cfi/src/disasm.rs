use capstone::arch::x86::X86OperandType;
use capstone::arch::{self, ArchOperand};
use capstone::prelude::*;

use crate::CfiError;

/// One decoded instruction, reduced to the fields the call-graph and
/// fingerprint passes actually need.
pub(crate) struct DecodedInsn {
    pub address: u64,
    pub mnemonic: String,
    /// The resolved absolute target of a `CALL`/`JMP`/conditional jump with
    /// an immediate operand, if any.
    pub branch_target: Option<u64>,
}

pub(crate) fn decode_function(code: &[u8], address: u64) -> Result<Vec<DecodedInsn>, CfiError> {
    let cs = Capstone::new()
        .x86()
        .mode(arch::x86::ArchMode::Mode64)
        .detail(true)
        .build()?;

    let insns = cs.disasm_all(code, address)?;
    let mut decoded = Vec::with_capacity(insns.len());

    for insn in insns.iter() {
        let mnemonic = insn.mnemonic().unwrap_or("").to_ascii_lowercase();
        let branch_target = cs
            .insn_detail(insn)
            .ok()
            .and_then(|detail| {
                detail.arch_detail().operands().into_iter().find_map(|op| match op {
                    ArchOperand::X86Operand(x86_op) => match x86_op.op_type {
                        X86OperandType::Imm(imm) => Some(imm as u64),
                        _ => None,
                    },
                    _ => None,
                })
            });

        decoded.push(DecodedInsn {
            address: insn.address(),
            mnemonic,
            branch_target,
        });
    }

    Ok(decoded)
}
