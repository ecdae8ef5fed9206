//! Forcing a call's captured result to `false`.
//!
//! From a [`CallSite`] the rewriter scans a bounded window forward for the
//! `move-result` that captures the call's value and substitutes a constant
//! load of `0` in that one slot. The scan gives up on anything that makes
//! the substitution unsafe: a wide capture, leaving the method, a branch, or
//! a newer result replacing the pending one. Instructions are never inserted
//! or removed.

use std::fmt;

use dexpatch_ir::{Method, MethodImplementation};
use dexpatch_isa::{Instruction, Opcode, Operands, Reg, encode};
use log::{debug, info, warn};

use crate::call_site::{CallSite, is_call_opcode};
use crate::error::{PatchError, Result};
use crate::options::{PatchOptions, RegisterSource};

/// Why a call site was left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SkipReason {
    /// The call-site slot does not hold one of the invoke forms.
    NotAnInvoke,
    /// Abstract or native method.
    NoImplementation,
    /// No instruction follows the call site.
    OutOfBounds,
    WideResult,
    /// `return*` or `throw` before any capture.
    MethodExit,
    /// `if-*` or a switch before any capture.
    ConditionalBranch,
    /// `goto*` before any capture.
    UnconditionalJump,
    /// Another invoke or `filled-new-array` replaced the pending result.
    ResultOverwritten,
    WindowExhausted,
    /// The wider constant load would push a branch past its offset range.
    BranchOutOfRange,
    /// Register above `v255`, out of reach of a one-slot constant load.
    UnencodableRegister,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::NotAnInvoke => "not an invoke",
            SkipReason::NoImplementation => "no implementation",
            SkipReason::OutOfBounds => "out of bounds",
            SkipReason::WideResult => "wide result",
            SkipReason::MethodExit => "method exit",
            SkipReason::ConditionalBranch => "conditional branch",
            SkipReason::UnconditionalJump => "unconditional jump",
            SkipReason::ResultOverwritten => "result overwritten",
            SkipReason::WindowExhausted => "window exhausted",
            SkipReason::BranchOutOfRange => "branch out of range",
            SkipReason::UnencodableRegister => "unencodable register",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteOutcome {
    Applied { index: usize },
    Skipped(SkipReason),
}

/// A located, validated substitution that has not been applied yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    /// Index of the capture instruction being replaced.
    pub index: usize,
    pub replacement: Instruction,
}

/// Single-slot constant load of `0` into `register`: `const/4` up to `v15`,
/// `const/16` up to `v255`.
pub fn const_false_for(register: Reg) -> Option<Instruction> {
    let opcode = match register.0 {
        0..=15 => Opcode::Const4,
        16..=255 => Opcode::Const16,
        _ => return None,
    };
    Instruction::new(opcode, Operands::Literal(register, 0)).ok()
}

/// Index of the capture for the call at `site`, scanning at most `lookahead`
/// instructions.
fn find_capture(
    instructions: &[Instruction],
    site: &CallSite,
    lookahead: usize,
) -> std::result::Result<usize, SkipReason> {
    let start = site.index + 1;
    let end = start.saturating_add(lookahead).min(instructions.len());
    for (index, instruction) in instructions.iter().enumerate().take(end).skip(start) {
        let opcode = instruction.opcode();
        if opcode.captures_result() {
            return Ok(index);
        }
        if opcode.captures_wide_result() {
            return Err(SkipReason::WideResult);
        }
        if opcode.is_method_exit() {
            return Err(SkipReason::MethodExit);
        }
        if opcode.is_conditional_branch() {
            return Err(SkipReason::ConditionalBranch);
        }
        if opcode.is_unconditional_jump() {
            return Err(SkipReason::UnconditionalJump);
        }
        if opcode.sets_result() {
            return Err(SkipReason::ResultOverwritten);
        }
    }
    Err(SkipReason::WindowExhausted)
}

/// Decide where the constant goes without touching the method.
pub fn plan(
    instructions: &[Instruction],
    site: &CallSite,
    options: &PatchOptions,
) -> std::result::Result<Rewrite, SkipReason> {
    let call = instructions.get(site.index).ok_or(SkipReason::OutOfBounds)?;
    if !is_call_opcode(call.opcode()) {
        return Err(SkipReason::NotAnInvoke);
    }
    if site.index + 1 >= instructions.len() {
        return Err(SkipReason::OutOfBounds);
    }

    let index = find_capture(instructions, site, options.lookahead)?;
    let captured = instructions[index].destination();
    if let Some(captured) = captured.filter(|r| *r != site.result_register) {
        warn!(
            "call site {} expects its result in {}, but instruction {index} captures into {captured}",
            site.index, site.result_register
        );
    }
    let register = match options.register_source {
        RegisterSource::CallSite => site.result_register,
        RegisterSource::Capture => captured.unwrap_or(site.result_register),
    };

    let replacement = const_false_for(register).ok_or(SkipReason::UnencodableRegister)?;

    // A grown slot shifts every later offset; the body must still encode.
    if replacement.code_units() > instructions[index].code_units() {
        let mut trial = instructions.to_vec();
        trial[index] = replacement.clone();
        if let Err(e) = encode(&trial) {
            debug!("call site {}: {replacement} at {index} does not encode: {e}", site.index);
            return Err(SkipReason::BranchOutOfRange);
        }
    }

    Ok(Rewrite { index, replacement })
}

/// Substitute the planned constant load, returning the capture it replaced.
pub fn apply(body: &mut MethodImplementation, rewrite: &Rewrite) -> dexpatch_ir::Result<Instruction> {
    body.replace_instruction(rewrite.index, rewrite.replacement.clone())
}

/// Plan and apply for one call site of `method`.
///
/// Unsafe or unsupported sites come back as [`RewriteOutcome::Skipped`];
/// only a rejected replacement is an error.
pub fn rewrite(method: &mut Method, site: &CallSite, options: &PatchOptions) -> Result<RewriteOutcome> {
    let reference = method.reference();
    let Some(body) = method.implementation_mut() else {
        debug!("{reference}: call site {} skipped: {}", site.index, SkipReason::NoImplementation);
        return Ok(RewriteOutcome::Skipped(SkipReason::NoImplementation));
    };

    let rewrite = match plan(body.instructions(), site, options) {
        Ok(rewrite) => rewrite,
        Err(reason) => {
            debug!("{reference}: call site {} skipped: {reason}", site.index);
            return Ok(RewriteOutcome::Skipped(reason));
        }
    };

    let previous = apply(body, &rewrite).map_err(|source| PatchError::Replace {
        method: reference.to_string(),
        index: rewrite.index,
        source,
    })?;
    info!("{reference}: [{}] {previous} -> {}", rewrite.index, rewrite.replacement);
    Ok(RewriteOutcome::Applied { index: rewrite.index })
}
