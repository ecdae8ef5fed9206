//! Invocation call-site classification.

use dexpatch_ir::ConstantPool;
use dexpatch_isa::{Instruction, Opcode, Operands, Reg};

use crate::target::{MethodCall, from_method_reference};

/// A matched invocation: its position in the method and the register the
/// following capture is expected to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    pub index: usize,
    pub result_register: Reg,
}

/// The ten plain invoke forms, fixed-register and range.
pub fn is_call_opcode(opcode: Opcode) -> bool {
    matches!(
        opcode,
        Opcode::InvokeVirtual
            | Opcode::InvokeSuper
            | Opcode::InvokeDirect
            | Opcode::InvokeStatic
            | Opcode::InvokeInterface
            | Opcode::InvokeVirtualRange
            | Opcode::InvokeSuperRange
            | Opcode::InvokeDirectRange
            | Opcode::InvokeStaticRange
            | Opcode::InvokeInterfaceRange
    )
}

/// Register that stands in for the call's result: `regC` of a fixed-register
/// invoke, the first register of a range.
///
/// This follows the usual code generation where the capture reuses the
/// first argument register; it is not derived from data flow.
pub fn result_register(instruction: &Instruction) -> Option<Reg> {
    match instruction.operands() {
        Operands::FixedRegisters { registers, .. } => registers.first().copied(),
        Operands::RegisterRange { start, count, .. } => (*count > 0).then_some(*start),
        _ => None,
    }
}

/// Decide whether `instruction` at `index` invokes one of `targets`.
///
/// No match is not an error. References that resolve to anything but a
/// method, or matching references under a non-invoke opcode, yield `None`.
pub fn classify<T: MethodCall>(
    instruction: &Instruction,
    index: usize,
    pool: &ConstantPool,
    targets: &[T],
) -> Option<CallSite> {
    let reference = pool.resolve(instruction)?.as_method()?;
    from_method_reference(targets, reference)?;
    if !is_call_opcode(instruction.opcode()) {
        return None;
    }
    Some(CallSite {
        index,
        result_register: result_register(instruction)?,
    })
}
