use std::collections::HashMap;

use crate::instruction::{Instruction, OperandError, Operands};
use crate::opcode::{Format, Opcode};

/// Errors from [`encode`].
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// Operands of the instruction at `index` do not fit its format.
    #[error("instruction {index}: {source}")]
    InvalidOperands {
        index: usize,
        #[source]
        source: OperandError,
    },
    /// A branch instruction references instruction index `{0}` which is
    /// beyond the program length `{1}`.
    #[error("label index {0} is out of bounds (program length: {1})")]
    LabelOutOfBounds(u32, usize),
    /// The distance to the target does not fit the branch format.
    #[error("branch at instruction {index} spans {distance} code units, too far for format {format}")]
    BranchOutOfRange {
        index: usize,
        distance: i64,
        format: Format,
    },
    /// A switch or `fill-array-data` label names an instruction that is not
    /// the matching payload.
    #[error("instruction {index} does not point at a matching payload")]
    PayloadMismatch { index: usize },
    /// A switch payload with no switch instruction referring to it.
    #[error("switch payload at instruction {0} is never referenced")]
    UnreferencedPayload(usize),
    /// The instruction slice is too large for [`Label`](crate::Label)'s
    /// `u32` index space.
    #[error("instruction count {0} exceeds Label index capacity")]
    TooManyInstructions(usize),
}

/// Encode a sequence of instructions into little-endian code units.
///
/// [`Label`](crate::Label) operands are interpreted as instruction indices
/// into `instructions`. Payloads are aligned to an even code-unit offset with
/// a `nop` padding unit where needed.
///
/// Returns `(units, offsets)` where `offsets[i]` is the code-unit offset of
/// instruction `i` within `units`. This is needed for try items, which
/// address instructions by offset.
///
/// ```
/// use dexpatch_isa::{encode, insn, Label, Reg};
///
/// let program = [
///     insn::if_eqz(Reg(0), Label(2)),
///     insn::const4(Reg(0), 1),
///     insn::return_(Reg(0)),
/// ];
/// let (units, offsets) = encode(&program)?;
/// assert_eq!(units.len(), 4);
/// assert_eq!(offsets, vec![0, 2, 3]);
/// # Ok::<(), dexpatch_isa::EncodeError>(())
/// ```
pub fn encode(instructions: &[Instruction]) -> Result<(Vec<u16>, Vec<u32>), EncodeError> {
    // Label uses u32 indices; guard against truncation on 64-bit platforms.
    if instructions.len() > u32::MAX as usize {
        return Err(EncodeError::TooManyInstructions(instructions.len()));
    }

    // 1. Validate operands and label bounds, and find the switch that owns
    //    each switch payload.
    let mut payload_owner: HashMap<usize, usize> = HashMap::new();
    for (i, insn) in instructions.iter().enumerate() {
        insn.validate()
            .map_err(|source| EncodeError::InvalidOperands { index: i, source })?;
        for label in insn.labels() {
            if label.0 as usize >= instructions.len() {
                return Err(EncodeError::LabelOutOfBounds(label.0, instructions.len()));
            }
        }
        if insn.opcode().format() == Format::F31t {
            let target = insn.labels()[0].0 as usize;
            let expected = match insn.opcode() {
                Opcode::PackedSwitch => Opcode::PackedSwitchPayload,
                Opcode::SparseSwitch => Opcode::SparseSwitchPayload,
                _ => Opcode::ArrayPayload,
            };
            if instructions[target].opcode() != expected {
                return Err(EncodeError::PayloadMismatch { index: i });
            }
            if expected != Opcode::ArrayPayload {
                payload_owner.entry(target).or_insert(i);
            }
        }
    }

    // 2. Lay out offsets, padding payloads to even offsets.
    let mut offsets = Vec::with_capacity(instructions.len());
    let mut pos = 0usize;
    for insn in instructions {
        if insn.opcode().is_payload() && pos % 2 == 1 {
            pos += 1;
        }
        offsets.push(pos);
        pos += insn.code_units();
    }

    // 3. Emit.
    let mut out: Vec<u16> = Vec::with_capacity(pos);
    for (i, insn) in instructions.iter().enumerate() {
        if out.len() < offsets[i] {
            out.push(0);
        }
        let rel = |target: u32| offsets[target as usize] as i64 - offsets[i] as i64;
        emit_one(insn, i, &offsets, &payload_owner, rel, &mut out)?;
    }

    Ok((out, offsets.into_iter().map(|o| o as u32).collect()))
}

fn emit_one(
    insn: &Instruction,
    index: usize,
    offsets: &[usize],
    payload_owner: &HashMap<usize, usize>,
    rel: impl Fn(u32) -> i64,
    out: &mut Vec<u16>,
) -> Result<(), EncodeError> {
    let op = insn.opcode().raw();
    let format = insn.opcode().format();
    let fits = |distance: i64, min: i64, max: i64| -> Result<i64, EncodeError> {
        if distance < min || distance > max {
            Err(EncodeError::BranchOutOfRange {
                index,
                distance,
                format,
            })
        } else {
            Ok(distance)
        }
    };

    match insn.operands() {
        Operands::None => out.push(op),
        Operands::Register(a) => out.push(op | a.0 << 8),
        Operands::RegisterPair(a, b) => match format {
            Format::F12x => out.push(op | a.0 << 8 | b.0 << 12),
            Format::F22x => out.extend([op | a.0 << 8, b.0]),
            _ => out.extend([op, a.0, b.0]),
        },
        Operands::Literal(a, v) => match format {
            Format::F11n => out.push(op | a.0 << 8 | ((*v as u16) & 0xf) << 12),
            Format::F21s => out.extend([op | a.0 << 8, *v as u16]),
            Format::F21h => {
                let shift = if insn.opcode() == Opcode::ConstWideHigh16 { 48 } else { 16 };
                out.extend([op | a.0 << 8, (*v >> shift) as u16]);
            }
            Format::F31i => {
                out.push(op | a.0 << 8);
                push_i32(out, *v as i32);
            }
            _ => {
                out.push(op | a.0 << 8);
                out.extend((0..4).map(|i| ((*v as u64) >> (i * 16)) as u16));
            }
        },
        Operands::RegisterPairLiteral(a, b, v) => match format {
            Format::F22b => out.extend([op | a.0 << 8, b.0 | ((*v as u8 as u16) << 8)]),
            _ => out.extend([op | a.0 << 8 | b.0 << 12, *v as u16]),
        },
        Operands::RegisterTriple(a, b, c) => out.extend([op | a.0 << 8, b.0 | c.0 << 8]),
        Operands::Branch(target) => match format {
            Format::F10t => {
                let d = fits(rel(target.0), i8::MIN as i64, i8::MAX as i64)?;
                out.push(op | (d as i8 as u8 as u16) << 8);
            }
            Format::F20t => {
                let d = fits(rel(target.0), i16::MIN as i64, i16::MAX as i64)?;
                out.extend([op, d as u16]);
            }
            _ => {
                let d = fits(rel(target.0), i32::MIN as i64, i32::MAX as i64)?;
                out.push(op);
                push_i32(out, d as i32);
            }
        },
        Operands::RegisterBranch(a, target) => {
            if format == Format::F21t {
                let d = fits(rel(target.0), i16::MIN as i64, i16::MAX as i64)?;
                out.extend([op | a.0 << 8, d as u16]);
            } else {
                let d = fits(rel(target.0), i32::MIN as i64, i32::MAX as i64)?;
                out.push(op | a.0 << 8);
                push_i32(out, d as i32);
            }
        }
        Operands::RegisterPairBranch(a, b, target) => {
            let d = fits(rel(target.0), i16::MIN as i64, i16::MAX as i64)?;
            out.extend([op | a.0 << 8 | b.0 << 12, d as u16]);
        }
        Operands::RegisterIndex(a, i) => {
            if format == Format::F21c {
                out.extend([op | a.0 << 8, *i as u16]);
            } else {
                out.push(op | a.0 << 8);
                push_i32(out, *i as i32);
            }
        }
        Operands::RegisterPairIndex(a, b, i) => out.extend([op | a.0 << 8 | b.0 << 12, *i as u16]),
        Operands::FixedRegisters { registers, index: i } => {
            out.extend(fixed_units(op, registers, *i));
        }
        Operands::FixedRegistersProto {
            registers,
            index: i,
            proto,
        } => {
            out.extend(fixed_units(op, registers, *i));
            out.push(*proto as u16);
        }
        Operands::RegisterRange {
            start,
            count,
            index: i,
        } => out.extend([op | *count << 8, *i as u16, start.0]),
        Operands::RegisterRangeProto {
            start,
            count,
            index: i,
            proto,
        } => out.extend([op | *count << 8, *i as u16, start.0, *proto as u16]),
        Operands::PackedSwitch { first_key, targets } => {
            let owner = owner_offset(index, offsets, payload_owner)?;
            out.extend([op, targets.len() as u16]);
            push_i32(out, *first_key);
            for t in targets {
                push_i32(out, (offsets[t.0 as usize] as i64 - owner) as i32);
            }
        }
        Operands::SparseSwitch { keys, targets } => {
            let owner = owner_offset(index, offsets, payload_owner)?;
            out.extend([op, keys.len() as u16]);
            for k in keys {
                push_i32(out, *k);
            }
            for t in targets {
                push_i32(out, (offsets[t.0 as usize] as i64 - owner) as i32);
            }
        }
        Operands::ArrayData {
            element_width,
            data,
        } => {
            let count = (data.len() / *element_width as usize) as u32;
            out.extend([op, *element_width, count as u16, (count >> 16) as u16]);
            out.extend(
                data.chunks(2)
                    .map(|pair| pair[0] as u16 | (pair.get(1).copied().unwrap_or(0) as u16) << 8),
            );
        }
    }
    Ok(())
}

fn push_i32(out: &mut Vec<u16>, v: i32) {
    out.push(v as u32 as u16);
    out.push(((v as u32) >> 16) as u16);
}

fn fixed_units(op: u16, registers: &[crate::Reg], index: u32) -> [u16; 3] {
    let reg = |i: usize| registers.get(i).map_or(0, |r| r.0 & 0xf);
    [
        op | (registers.len() as u16) << 12 | reg(4) << 8,
        index as u16,
        reg(0) | reg(1) << 4 | reg(2) << 8 | reg(3) << 12,
    ]
}

fn owner_offset(
    payload: usize,
    offsets: &[usize],
    payload_owner: &HashMap<usize, usize>,
) -> Result<i64, EncodeError> {
    payload_owner
        .get(&payload)
        .map(|&owner| offsets[owner] as i64)
        .ok_or(EncodeError::UnreferencedPayload(payload))
}
