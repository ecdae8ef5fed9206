use std::collections::BTreeSet;
use std::fmt::Write;

use dexpatch_isa::Instruction;

use crate::pool::ConstantPool;

/// Render one instruction with references resolved through `pool`.
///
/// Indices the pool does not hold fall back to the `kind@index` form.
pub fn render_instruction(instruction: &Instruction, pool: &ConstantPool) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = instruction.write_with(&mut out, |out, kind, index| match pool.reference(kind, index) {
        Some(reference) => write!(out, "{reference}"),
        None => write!(out, "{}@{index}", kind.prefix()),
    });
    out
}

/// Render a method body as listing lines, with a `:L<index>` label line in
/// front of every branch, switch or payload target.
///
/// The output assembles back to the same instructions with
/// [`assemble_method`](crate::assemble_method).
pub fn disassemble(instructions: &[Instruction], pool: &ConstantPool) -> Vec<String> {
    let targets: BTreeSet<u32> = instructions
        .iter()
        .flat_map(Instruction::labels)
        .map(|label| label.0)
        .collect();

    let mut lines = Vec::with_capacity(instructions.len() + targets.len());
    for (i, instruction) in instructions.iter().enumerate() {
        if targets.contains(&(i as u32)) {
            lines.push(format!(":L{i}"));
        }
        lines.push(render_instruction(instruction, pool));
    }
    lines
}
