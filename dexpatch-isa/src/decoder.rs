use std::collections::HashMap;

use crate::instruction::{Instruction, Label, Operands, Reg};
use crate::opcode::{Format, Opcode};

/// Errors from [`decode`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Invalid or unknown opcode at the given code-unit offset.
    #[error("invalid opcode at offset {0}")]
    InvalidOpcode(usize),
    /// Code units truncated at the given offset.
    #[error("truncated instruction at offset {0}")]
    Truncated(usize),
    /// A branch at `offset` targets code-unit offset `target` which does not
    /// land on an instruction boundary (or is out of range).
    #[error("branch at offset {offset} targets invalid offset {target}")]
    InvalidBranchTarget { offset: usize, target: i64 },
    /// A switch or `fill-array-data` at `offset` points at something other
    /// than the matching payload kind.
    #[error("instruction at offset {offset} references a mismatched payload at {target}")]
    PayloadMismatch { offset: usize, target: usize },
    /// A switch payload that no switch instruction refers to; its targets
    /// cannot be resolved.
    #[error("switch payload at offset {0} is never referenced")]
    UnreferencedPayload(usize),
    /// Malformed operand fields (e.g. a `35c` register count above five).
    #[error("malformed operands at offset {0}")]
    MalformedOperands(usize),
    /// Too many instructions to represent branch targets as `u32` indices.
    #[error("instruction count {0} exceeds Label index capacity")]
    TooManyInstructions(usize),
}

/// A relative target still in code units, resolved in pass 2.
enum Fixup {
    /// Branch operand, relative to the instruction itself.
    Branch(i64),
    /// Switch / fill-array-data payload reference.
    Payload(i64),
}

/// Decode little-endian code units into `(instruction, code_unit_offset)`
/// pairs with resolved branch targets.
///
/// Branch, switch and `fill-array-data` operands are converted to [`Label`]
/// values whose inner `u32` is the index of the target instruction in the
/// returned `Vec`. Switch payload targets are relative to the switch that
/// references the payload, so they are resolved through that switch.
///
/// The `nop` padding that aligns a payload to an even offset is not
/// returned as an instruction.
pub fn decode(units: &[u16]) -> Result<Vec<(Instruction, u32)>, DecodeError> {
    let mut instructions: Vec<Instruction> = Vec::new();
    let mut offsets: Vec<usize> = Vec::new();
    let mut fixups: Vec<(usize, Fixup)> = Vec::new();
    // payload instruction index -> raw targets relative to the referencing switch
    let mut switch_targets: HashMap<usize, Vec<i64>> = HashMap::new();
    let mut offset: usize = 0;

    // Pass 1: decode instructions, record code-unit offsets.
    while offset < units.len() {
        let unit = units[offset];
        if unit == 0 && units.get(offset + 1).is_some_and(|&next| is_payload_ident(next)) && offset % 2 == 1 {
            // Alignment padding.
            offset += 1;
            continue;
        }

        let (insn, size, raw) = decode_one(units, offset)?;
        match raw {
            RawTargets::None => {}
            RawTargets::Branch(rel) => fixups.push((instructions.len(), Fixup::Branch(rel))),
            RawTargets::Payload(rel) => fixups.push((instructions.len(), Fixup::Payload(rel))),
            RawTargets::Switch(targets) => {
                switch_targets.insert(instructions.len(), targets);
            }
        }

        offsets.push(offset);
        instructions.push(insn);
        offset += size;
    }

    // Label uses u32 indices; guard against truncation on 64-bit platforms.
    if instructions.len() > u32::MAX as usize {
        return Err(DecodeError::TooManyInstructions(instructions.len()));
    }

    let index_of = |insn_offset: usize, rel: i64| -> Result<usize, DecodeError> {
        let target = insn_offset as i64 + rel;
        let invalid = DecodeError::InvalidBranchTarget {
            offset: insn_offset,
            target,
        };
        let target = usize::try_from(target).map_err(|_| invalid.clone())?;
        offsets.binary_search(&target).map_err(|_| invalid)
    };

    // Pass 2: resolve targets to instruction indices.
    for (insn_idx, fixup) in fixups {
        let insn_offset = offsets[insn_idx];
        match fixup {
            Fixup::Branch(rel) => {
                let target = index_of(insn_offset, rel)?;
                set_label(&mut instructions[insn_idx], Label(target as u32));
            }
            Fixup::Payload(rel) => {
                let payload = index_of(insn_offset, rel)?;
                let expected = match instructions[insn_idx].opcode() {
                    Opcode::PackedSwitch => Opcode::PackedSwitchPayload,
                    Opcode::SparseSwitch => Opcode::SparseSwitchPayload,
                    _ => Opcode::ArrayPayload,
                };
                if instructions[payload].opcode() != expected {
                    return Err(DecodeError::PayloadMismatch {
                        offset: insn_offset,
                        target: offsets[payload],
                    });
                }
                set_label(&mut instructions[insn_idx], Label(payload as u32));

                if let Some(raw_targets) = switch_targets.remove(&payload) {
                    let mut labels = Vec::with_capacity(raw_targets.len());
                    for rel in raw_targets {
                        labels.push(Label(index_of(insn_offset, rel)? as u32));
                    }
                    for (slot, label) in instructions[payload].labels_mut().into_iter().zip(labels) {
                        *slot = label;
                    }
                }
            }
        }
    }

    if let Some(&payload) = switch_targets.keys().min() {
        return Err(DecodeError::UnreferencedPayload(offsets[payload]));
    }

    Ok(instructions
        .into_iter()
        .zip(offsets.iter().map(|&o| o as u32))
        .collect())
}

fn is_payload_ident(unit: u16) -> bool {
    matches!(unit, 0x0100 | 0x0200 | 0x0300)
}

fn set_label(insn: &mut Instruction, label: Label) {
    if let Some(slot) = insn.labels_mut().into_iter().next() {
        *slot = label;
    }
}

enum RawTargets {
    None,
    Branch(i64),
    Payload(i64),
    Switch(Vec<i64>),
}

/// Decode the instruction starting at `offset`. Labels are left as
/// placeholders and the raw relative targets are returned alongside.
fn decode_one(units: &[u16], offset: usize) -> Result<(Instruction, usize, RawTargets), DecodeError> {
    let unit0 = units[offset];
    if is_payload_ident(unit0) {
        return decode_payload(units, offset);
    }

    let opcode = Opcode::from_raw((unit0 & 0xff) as u8).ok_or(DecodeError::InvalidOpcode(offset))?;
    let size = opcode
        .code_units()
        .ok_or(DecodeError::InvalidOpcode(offset))?;
    if offset + size > units.len() {
        return Err(DecodeError::Truncated(offset));
    }
    let u = &units[offset..offset + size];
    let aa = u[0] >> 8;
    let a = Reg(aa & 0xf);
    let b = Reg(aa >> 4);
    let placeholder = Label(0);
    let i32_at = |i: usize| (u[i] as u32 | (u[i + 1] as u32) << 16) as i32;

    let mut raw = RawTargets::None;
    let operands = match opcode.format() {
        Format::F10x => Operands::None,
        Format::F11x => Operands::Register(Reg(aa)),
        Format::F12x => Operands::RegisterPair(a, b),
        Format::F11n => Operands::Literal(a, (((aa >> 4) as i8) << 4 >> 4) as i64),
        Format::F10t => {
            raw = RawTargets::Branch(aa as u8 as i8 as i64);
            Operands::Branch(placeholder)
        }
        Format::F20t => {
            raw = RawTargets::Branch(u[1] as i16 as i64);
            Operands::Branch(placeholder)
        }
        Format::F22x => Operands::RegisterPair(Reg(aa), Reg(u[1])),
        Format::F21t => {
            raw = RawTargets::Branch(u[1] as i16 as i64);
            Operands::RegisterBranch(Reg(aa), placeholder)
        }
        Format::F21s => Operands::Literal(Reg(aa), u[1] as i16 as i64),
        Format::F21h => {
            let shift = if opcode == Opcode::ConstWideHigh16 { 48 } else { 16 };
            Operands::Literal(Reg(aa), (u[1] as i16 as i64) << shift)
        }
        Format::F21c => Operands::RegisterIndex(Reg(aa), u[1] as u32),
        Format::F23x => Operands::RegisterTriple(Reg(aa), Reg(u[1] & 0xff), Reg(u[1] >> 8)),
        Format::F22b => {
            Operands::RegisterPairLiteral(Reg(aa), Reg(u[1] & 0xff), (u[1] >> 8) as u8 as i8 as i32)
        }
        Format::F22t => {
            raw = RawTargets::Branch(u[1] as i16 as i64);
            Operands::RegisterPairBranch(a, b, placeholder)
        }
        Format::F22s => Operands::RegisterPairLiteral(a, b, u[1] as i16 as i32),
        Format::F22c => Operands::RegisterPairIndex(a, b, u[1] as u32),
        Format::F32x => Operands::RegisterPair(Reg(u[1]), Reg(u[2])),
        Format::F30t => {
            raw = RawTargets::Branch(i32_at(1) as i64);
            Operands::Branch(placeholder)
        }
        Format::F31t => {
            raw = RawTargets::Payload(i32_at(1) as i64);
            Operands::RegisterBranch(Reg(aa), placeholder)
        }
        Format::F31i => Operands::Literal(Reg(aa), i32_at(1) as i64),
        Format::F31c => Operands::RegisterIndex(Reg(aa), i32_at(1) as u32),
        Format::F35c | Format::F45cc => {
            let count = (aa >> 4) as usize;
            if count > 5 {
                return Err(DecodeError::MalformedOperands(offset));
            }
            let packed = [u[2] & 0xf, (u[2] >> 4) & 0xf, (u[2] >> 8) & 0xf, u[2] >> 12, aa & 0xf];
            let registers = packed[..count].iter().map(|&r| Reg(r)).collect();
            if opcode.format() == Format::F35c {
                Operands::FixedRegisters {
                    registers,
                    index: u[1] as u32,
                }
            } else {
                Operands::FixedRegistersProto {
                    registers,
                    index: u[1] as u32,
                    proto: u[3] as u32,
                }
            }
        }
        Format::F3rc => Operands::RegisterRange {
            start: Reg(u[2]),
            count: aa,
            index: u[1] as u32,
        },
        Format::F4rcc => Operands::RegisterRangeProto {
            start: Reg(u[2]),
            count: aa,
            index: u[1] as u32,
            proto: u[3] as u32,
        },
        Format::F51l => {
            let value = (1..5).rev().fold(0u64, |acc, i| acc << 16 | u[i] as u64);
            Operands::Literal(Reg(aa), value as i64)
        }
        Format::Payload => return Err(DecodeError::InvalidOpcode(offset)),
    };

    let insn = Instruction::new(opcode, operands).map_err(|_| DecodeError::MalformedOperands(offset))?;
    Ok((insn, size, raw))
}

fn decode_payload(units: &[u16], offset: usize) -> Result<(Instruction, usize, RawTargets), DecodeError> {
    let header = |n: usize| {
        units
            .get(offset..offset + n)
            .ok_or(DecodeError::Truncated(offset))
    };
    let i32_at = |u: &[u16], i: usize| (u[i] as u32 | (u[i + 1] as u32) << 16) as i32;

    let (opcode, operands, size, raw) = match units[offset] {
        0x0100 => {
            let size = header(2)?[1] as usize;
            let total = 4 + size * 2;
            let u = header(total)?;
            let first_key = i32_at(u, 2);
            let targets = (0..size).map(|i| i32_at(u, 4 + i * 2) as i64).collect();
            (
                Opcode::PackedSwitchPayload,
                Operands::PackedSwitch {
                    first_key,
                    targets: vec![Label(0); size],
                },
                total,
                RawTargets::Switch(targets),
            )
        }
        0x0200 => {
            let size = header(2)?[1] as usize;
            let total = 2 + size * 4;
            let u = header(total)?;
            let keys = (0..size).map(|i| i32_at(u, 2 + i * 2)).collect();
            let targets = (0..size).map(|i| i32_at(u, 2 + size * 2 + i * 2) as i64).collect();
            (
                Opcode::SparseSwitchPayload,
                Operands::SparseSwitch {
                    keys,
                    targets: vec![Label(0); size],
                },
                total,
                RawTargets::Switch(targets),
            )
        }
        _ => {
            let h = header(4)?;
            let element_width = h[1];
            let count = (h[2] as u32 | (h[3] as u32) << 16) as usize;
            let byte_len = count
                .checked_mul(element_width as usize)
                .ok_or(DecodeError::MalformedOperands(offset))?;
            let total = 4 + byte_len.div_ceil(2);
            let u = header(total)?;
            let data = u[4..]
                .iter()
                .flat_map(|unit| unit.to_le_bytes())
                .take(byte_len)
                .collect();
            (
                Opcode::ArrayPayload,
                Operands::ArrayData {
                    element_width,
                    data,
                },
                total,
                RawTargets::None,
            )
        }
    };

    let insn = Instruction::new(opcode, operands).map_err(|_| DecodeError::MalformedOperands(offset))?;
    Ok((insn, size, raw))
}
