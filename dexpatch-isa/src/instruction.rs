//! Decoded instructions and their operand shapes.

use std::fmt;

use crate::opcode::{Format, Opcode, ReferenceType};

/// Virtual register number.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct Reg(pub u16);

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Branch target: the index of the target instruction within the method's
/// instruction list (not a code-unit offset).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct Label(pub u32);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":L{}", self.0)
    }
}

/// Operand payload, one variant per operand shape.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Operands {
    /// `10x`
    None,
    /// `11x`
    Register(Reg),
    /// `12x`, `22x`, `32x`
    RegisterPair(Reg, Reg),
    /// `11n`, `21s`, `21h`, `31i`, `51l`. High-16 forms carry the shifted
    /// value (`const/high16 v0, 0x7f000000`).
    Literal(Reg, i64),
    /// `22b`, `22s`
    RegisterPairLiteral(Reg, Reg, i32),
    /// `23x`
    RegisterTriple(Reg, Reg, Reg),
    /// `10t`, `20t`, `30t`
    Branch(Label),
    /// `21t`, `31t`
    RegisterBranch(Reg, Label),
    /// `22t`
    RegisterPairBranch(Reg, Reg, Label),
    /// `21c`, `31c`
    RegisterIndex(Reg, u32),
    /// `22c`
    RegisterPairIndex(Reg, Reg, u32),
    /// `35c`: up to five explicit registers.
    FixedRegisters { registers: Vec<Reg>, index: u32 },
    /// `3rc`: `count` consecutive registers starting at `start`.
    RegisterRange { start: Reg, count: u16, index: u32 },
    /// `45cc`
    FixedRegistersProto { registers: Vec<Reg>, index: u32, proto: u32 },
    /// `4rcc`
    RegisterRangeProto { start: Reg, count: u16, index: u32, proto: u32 },
    PackedSwitch { first_key: i32, targets: Vec<Label> },
    SparseSwitch { keys: Vec<i32>, targets: Vec<Label> },
    ArrayData { element_width: u16, data: Vec<u8> },
}

/// Operands that do not fit the opcode's format.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum OperandError {
    #[error("`{mnemonic}` does not take these operands (format {format})")]
    ShapeMismatch {
        mnemonic: &'static str,
        format: Format,
    },
    #[error("`{mnemonic}`: register v{register} exceeds v{max}")]
    RegisterOutOfRange {
        mnemonic: &'static str,
        register: u32,
        max: u32,
    },
    #[error("`{mnemonic}`: literal {literal:#x} does not fit format {format}")]
    LiteralOutOfRange {
        mnemonic: &'static str,
        literal: i64,
        format: Format,
    },
    #[error("`{mnemonic}`: index {index} exceeds {max}")]
    IndexOutOfRange {
        mnemonic: &'static str,
        index: u32,
        max: u32,
    },
    #[error("`{mnemonic}`: {count} registers, at most {max} allowed")]
    TooManyRegisters {
        mnemonic: &'static str,
        count: usize,
        max: usize,
    },
    #[error("sparse-switch payload has {keys} keys but {targets} targets")]
    SparseSwitchLength { keys: usize, targets: usize },
    #[error("sparse-switch keys are not strictly ascending")]
    UnsortedKeys,
    #[error("array payload element width {0} is not 1, 2, 4 or 8")]
    ElementWidth(u16),
    #[error("array payload of {len} bytes is not a multiple of element width {width}")]
    ArrayLength { len: usize, width: u16 },
}

/// A single Dalvik instruction.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Instruction {
    opcode: Opcode,
    operands: Operands,
}

const NIBBLE: u32 = 0xf;
const BYTE: u32 = 0xff;
const SHORT: u32 = 0xffff;

impl Instruction {
    /// Construct an instruction, checking the operands against the opcode's
    /// format.
    pub fn new(opcode: Opcode, operands: Operands) -> Result<Self, OperandError> {
        let insn = Self { opcode, operands };
        insn.validate()?;
        Ok(insn)
    }

    #[inline]
    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    #[inline]
    pub fn operands(&self) -> &Operands {
        &self.operands
    }

    pub fn mnemonic(&self) -> &'static str {
        self.opcode.mnemonic()
    }

    /// Constant-pool index operand, if the opcode references the pool.
    pub fn reference_index(&self) -> Option<u32> {
        if self.opcode.reference_type() == ReferenceType::None {
            return None;
        }
        match self.operands {
            Operands::RegisterIndex(_, index)
            | Operands::RegisterPairIndex(_, _, index)
            | Operands::FixedRegisters { index, .. }
            | Operands::RegisterRange { index, .. }
            | Operands::FixedRegistersProto { index, .. }
            | Operands::RegisterRangeProto { index, .. } => Some(index),
            _ => None,
        }
    }

    /// Secondary proto index of `invoke-polymorphic*`.
    pub fn proto_index(&self) -> Option<u32> {
        match self.operands {
            Operands::FixedRegistersProto { proto, .. }
            | Operands::RegisterRangeProto { proto, .. } => Some(proto),
            _ => None,
        }
    }

    /// Destination register written by this instruction, if any.
    pub fn destination(&self) -> Option<Reg> {
        if !self.opcode.has_flag(crate::OpcodeFlags::SETS_REGISTER) {
            return None;
        }
        match self.operands {
            Operands::Register(a)
            | Operands::RegisterPair(a, _)
            | Operands::Literal(a, _)
            | Operands::RegisterPairLiteral(a, _, _)
            | Operands::RegisterTriple(a, _, _)
            | Operands::RegisterIndex(a, _)
            | Operands::RegisterPairIndex(a, _, _) => Some(a),
            _ => None,
        }
    }

    /// Highest register number mentioned by the operands.
    pub fn max_register(&self) -> Option<u32> {
        let wide = self.opcode.has_flag(crate::OpcodeFlags::SETS_WIDE_REGISTER) as u32;
        match &self.operands {
            Operands::Register(a) | Operands::RegisterBranch(a, _) | Operands::RegisterIndex(a, _) => {
                Some(a.0 as u32 + wide)
            }
            Operands::Literal(a, _) => Some(a.0 as u32 + wide),
            Operands::RegisterPair(a, b)
            | Operands::RegisterPairLiteral(a, b, _)
            | Operands::RegisterPairBranch(a, b, _)
            | Operands::RegisterPairIndex(a, b, _) => {
                Some((a.0 as u32 + wide).max(b.0 as u32 + wide))
            }
            Operands::RegisterTriple(a, b, c) => {
                Some((a.0 as u32 + wide).max(b.0 as u32 + wide).max(c.0 as u32 + wide))
            }
            Operands::FixedRegisters { registers, .. }
            | Operands::FixedRegistersProto { registers, .. } => {
                registers.iter().map(|r| r.0 as u32).max()
            }
            Operands::RegisterRange { start, count, .. }
            | Operands::RegisterRangeProto { start, count, .. } => {
                (*count > 0).then(|| start.0 as u32 + *count as u32 - 1)
            }
            Operands::None
            | Operands::Branch(_)
            | Operands::PackedSwitch { .. }
            | Operands::SparseSwitch { .. }
            | Operands::ArrayData { .. } => None,
        }
    }

    /// Labels this instruction refers to, in operand order.
    pub fn labels(&self) -> Vec<Label> {
        match &self.operands {
            Operands::Branch(l)
            | Operands::RegisterBranch(_, l)
            | Operands::RegisterPairBranch(_, _, l) => vec![*l],
            Operands::PackedSwitch { targets, .. } | Operands::SparseSwitch { targets, .. } => {
                targets.clone()
            }
            _ => Vec::new(),
        }
    }

    pub(crate) fn labels_mut(&mut self) -> Vec<&mut Label> {
        match &mut self.operands {
            Operands::Branch(l)
            | Operands::RegisterBranch(_, l)
            | Operands::RegisterPairBranch(_, _, l) => vec![l],
            Operands::PackedSwitch { targets, .. } | Operands::SparseSwitch { targets, .. } => {
                targets.iter_mut().collect()
            }
            _ => Vec::new(),
        }
    }

    /// Size of the encoded instruction in code units, excluding alignment
    /// padding in front of payloads.
    pub fn code_units(&self) -> usize {
        if let Some(units) = self.opcode.code_units() {
            return units;
        }
        match &self.operands {
            Operands::PackedSwitch { targets, .. } => 4 + targets.len() * 2,
            Operands::SparseSwitch { keys, .. } => 2 + keys.len() * 4,
            Operands::ArrayData { data, .. } => 4 + data.len().div_ceil(2),
            _ => 0,
        }
    }

    /// Check that the operand shape matches the format and that every field
    /// fits its encoding width.
    pub fn validate(&self) -> Result<(), OperandError> {
        let mnemonic = self.opcode.mnemonic();
        let format = self.opcode.format();
        let reg = |r: Reg, max: u32| -> Result<(), OperandError> {
            if r.0 as u32 > max {
                Err(OperandError::RegisterOutOfRange {
                    mnemonic,
                    register: r.0 as u32,
                    max,
                })
            } else {
                Ok(())
            }
        };
        let lit = |value: i64, min: i64, max: i64| -> Result<(), OperandError> {
            if value < min || value > max {
                Err(OperandError::LiteralOutOfRange {
                    mnemonic,
                    literal: value,
                    format,
                })
            } else {
                Ok(())
            }
        };
        let idx = |index: u32, max: u32| -> Result<(), OperandError> {
            if index > max {
                Err(OperandError::IndexOutOfRange {
                    mnemonic,
                    index,
                    max,
                })
            } else {
                Ok(())
            }
        };
        let fixed = |registers: &[Reg]| -> Result<(), OperandError> {
            if registers.len() > 5 {
                return Err(OperandError::TooManyRegisters {
                    mnemonic,
                    count: registers.len(),
                    max: 5,
                });
            }
            registers.iter().try_for_each(|r| reg(*r, NIBBLE))
        };
        let range = |start: Reg, count: u16| -> Result<(), OperandError> {
            if count as u32 > BYTE {
                return Err(OperandError::TooManyRegisters {
                    mnemonic,
                    count: count as usize,
                    max: BYTE as usize,
                });
            }
            if count > 0 {
                let last = start.0 as u32 + count as u32 - 1;
                if last > SHORT {
                    return Err(OperandError::RegisterOutOfRange {
                        mnemonic,
                        register: last,
                        max: SHORT,
                    });
                }
            }
            Ok(())
        };

        match (format, &self.operands) {
            (Format::F10x, Operands::None) => Ok(()),
            (Format::F11x, Operands::Register(a)) => reg(*a, BYTE),
            (Format::F12x, Operands::RegisterPair(a, b)) => {
                reg(*a, NIBBLE)?;
                reg(*b, NIBBLE)
            }
            (Format::F22x, Operands::RegisterPair(a, b)) => {
                reg(*a, BYTE)?;
                reg(*b, SHORT)
            }
            (Format::F32x, Operands::RegisterPair(_, _)) => Ok(()),
            (Format::F11n, Operands::Literal(a, v)) => {
                reg(*a, NIBBLE)?;
                lit(*v, -8, 7)
            }
            (Format::F21s, Operands::Literal(a, v)) => {
                reg(*a, BYTE)?;
                lit(*v, i16::MIN as i64, i16::MAX as i64)
            }
            (Format::F21h, Operands::Literal(a, v)) => {
                reg(*a, BYTE)?;
                let shift = if self.opcode == Opcode::ConstWideHigh16 { 48 } else { 16 };
                let high = *v >> shift;
                if high << shift != *v || high < i16::MIN as i64 || high > i16::MAX as i64 {
                    return Err(OperandError::LiteralOutOfRange {
                        mnemonic,
                        literal: *v,
                        format,
                    });
                }
                Ok(())
            }
            (Format::F31i, Operands::Literal(a, v)) => {
                reg(*a, BYTE)?;
                lit(*v, i32::MIN as i64, i32::MAX as i64)
            }
            (Format::F51l, Operands::Literal(a, _)) => reg(*a, BYTE),
            (Format::F22b, Operands::RegisterPairLiteral(a, b, v)) => {
                reg(*a, BYTE)?;
                reg(*b, BYTE)?;
                lit(*v as i64, i8::MIN as i64, i8::MAX as i64)
            }
            (Format::F22s, Operands::RegisterPairLiteral(a, b, v)) => {
                reg(*a, NIBBLE)?;
                reg(*b, NIBBLE)?;
                lit(*v as i64, i16::MIN as i64, i16::MAX as i64)
            }
            (Format::F23x, Operands::RegisterTriple(a, b, c)) => {
                reg(*a, BYTE)?;
                reg(*b, BYTE)?;
                reg(*c, BYTE)
            }
            (Format::F10t | Format::F20t | Format::F30t, Operands::Branch(_)) => Ok(()),
            (Format::F21t | Format::F31t, Operands::RegisterBranch(a, _)) => reg(*a, BYTE),
            (Format::F22t, Operands::RegisterPairBranch(a, b, _)) => {
                reg(*a, NIBBLE)?;
                reg(*b, NIBBLE)
            }
            (Format::F21c, Operands::RegisterIndex(a, i)) => {
                reg(*a, BYTE)?;
                idx(*i, SHORT)
            }
            (Format::F31c, Operands::RegisterIndex(a, _)) => reg(*a, BYTE),
            (Format::F22c, Operands::RegisterPairIndex(a, b, i)) => {
                reg(*a, NIBBLE)?;
                reg(*b, NIBBLE)?;
                idx(*i, SHORT)
            }
            (Format::F35c, Operands::FixedRegisters { registers, index }) => {
                fixed(registers)?;
                idx(*index, SHORT)
            }
            (Format::F3rc, Operands::RegisterRange { start, count, index }) => {
                range(*start, *count)?;
                idx(*index, SHORT)
            }
            (
                Format::F45cc,
                Operands::FixedRegistersProto {
                    registers,
                    index,
                    proto,
                },
            ) => {
                fixed(registers)?;
                idx(*index, SHORT)?;
                idx(*proto, SHORT)
            }
            (
                Format::F4rcc,
                Operands::RegisterRangeProto {
                    start,
                    count,
                    index,
                    proto,
                },
            ) => {
                range(*start, *count)?;
                idx(*index, SHORT)?;
                idx(*proto, SHORT)
            }
            (Format::Payload, Operands::PackedSwitch { targets, .. })
                if self.opcode == Opcode::PackedSwitchPayload =>
            {
                if targets.len() > SHORT as usize {
                    return Err(OperandError::TooManyRegisters {
                        mnemonic,
                        count: targets.len(),
                        max: SHORT as usize,
                    });
                }
                Ok(())
            }
            (Format::Payload, Operands::SparseSwitch { keys, targets })
                if self.opcode == Opcode::SparseSwitchPayload =>
            {
                if keys.len() != targets.len() || keys.len() > SHORT as usize {
                    return Err(OperandError::SparseSwitchLength {
                        keys: keys.len(),
                        targets: targets.len(),
                    });
                }
                if keys.windows(2).any(|w| w[0] >= w[1]) {
                    return Err(OperandError::UnsortedKeys);
                }
                Ok(())
            }
            (
                Format::Payload,
                Operands::ArrayData {
                    element_width,
                    data,
                },
            ) if self.opcode == Opcode::ArrayPayload => {
                if !matches!(*element_width, 1 | 2 | 4 | 8) {
                    return Err(OperandError::ElementWidth(*element_width));
                }
                if data.len() % *element_width as usize != 0 {
                    return Err(OperandError::ArrayLength {
                        len: data.len(),
                        width: *element_width,
                    });
                }
                Ok(())
            }
            _ => Err(OperandError::ShapeMismatch { mnemonic, format }),
        }
    }

    /// Render in smali syntax, formatting pool indices with `reference`.
    ///
    /// `reference` receives the reference kind and raw index and writes the
    /// operand text; [`Display`](fmt::Display) uses `kind@index`.
    pub fn write_with<W, F>(&self, out: &mut W, mut reference: F) -> fmt::Result
    where
        W: fmt::Write,
        F: FnMut(&mut W, ReferenceType, u32) -> fmt::Result,
    {
        let kind = self.opcode.reference_type();
        match &self.operands {
            Operands::PackedSwitch { first_key, targets } => {
                write!(out, ".packed-switch {} {{", hex(*first_key as i64))?;
                write_list(out, targets.iter().map(|t| t.to_string()))?;
                return out.write_char('}');
            }
            Operands::SparseSwitch { keys, targets } => {
                out.write_str(".sparse-switch {")?;
                write_list(
                    out,
                    keys.iter()
                        .zip(targets)
                        .map(|(k, t)| format!("{} -> {t}", hex(*k as i64))),
                )?;
                return out.write_char('}');
            }
            Operands::ArrayData {
                element_width,
                data,
            } => {
                write!(out, ".array-data {element_width} {{")?;
                write_list(
                    out,
                    data.chunks(*element_width as usize)
                        .map(|chunk| hex(element_value(chunk))),
                )?;
                return out.write_char('}');
            }
            _ => {}
        }

        out.write_str(self.opcode.mnemonic())?;
        match &self.operands {
            Operands::None => Ok(()),
            Operands::Register(a) => write!(out, " {a}"),
            Operands::RegisterPair(a, b) => write!(out, " {a}, {b}"),
            Operands::Literal(a, v) => write!(out, " {a}, {}", hex(*v)),
            Operands::RegisterPairLiteral(a, b, v) => write!(out, " {a}, {b}, {}", hex(*v as i64)),
            Operands::RegisterTriple(a, b, c) => write!(out, " {a}, {b}, {c}"),
            Operands::Branch(l) => write!(out, " {l}"),
            Operands::RegisterBranch(a, l) => write!(out, " {a}, {l}"),
            Operands::RegisterPairBranch(a, b, l) => write!(out, " {a}, {b}, {l}"),
            Operands::RegisterIndex(a, i) => {
                write!(out, " {a}, ")?;
                reference(out, kind, *i)
            }
            Operands::RegisterPairIndex(a, b, i) => {
                write!(out, " {a}, {b}, ")?;
                reference(out, kind, *i)
            }
            Operands::FixedRegisters { registers, index } => {
                out.write_str(" {")?;
                write_list(out, registers.iter().map(|r| r.to_string()))?;
                out.write_str("}, ")?;
                reference(out, kind, *index)
            }
            Operands::RegisterRange {
                start,
                count,
                index,
            } => {
                out.write_char(' ')?;
                write_range(out, *start, *count)?;
                out.write_str(", ")?;
                reference(out, kind, *index)
            }
            Operands::FixedRegistersProto {
                registers,
                index,
                proto,
            } => {
                out.write_str(" {")?;
                write_list(out, registers.iter().map(|r| r.to_string()))?;
                out.write_str("}, ")?;
                reference(out, kind, *index)?;
                out.write_str(", ")?;
                reference(out, ReferenceType::MethodProto, *proto)
            }
            Operands::RegisterRangeProto {
                start,
                count,
                index,
                proto,
            } => {
                out.write_char(' ')?;
                write_range(out, *start, *count)?;
                out.write_str(", ")?;
                reference(out, kind, *index)?;
                out.write_str(", ")?;
                reference(out, ReferenceType::MethodProto, *proto)
            }
            Operands::PackedSwitch { .. } | Operands::SparseSwitch { .. } | Operands::ArrayData { .. } => {
                Ok(())
            }
        }
    }
}

/// Signed smali-style hex literal: `0x0`, `-0x1`.
pub fn hex(value: i64) -> String {
    if value < 0 {
        format!("-{:#x}", value.unsigned_abs())
    } else {
        format!("{value:#x}")
    }
}

fn element_value(chunk: &[u8]) -> i64 {
    let mut bytes = [0u8; 8];
    bytes[..chunk.len()].copy_from_slice(chunk);
    let raw = u64::from_le_bytes(bytes);
    let shift = 64 - chunk.len() as u32 * 8;
    ((raw << shift) as i64) >> shift
}

fn write_list<W: fmt::Write>(out: &mut W, items: impl Iterator<Item = String>) -> fmt::Result {
    for (i, item) in items.enumerate() {
        if i > 0 {
            out.write_str(", ")?;
        }
        out.write_str(&item)?;
    }
    Ok(())
}

fn write_range<W: fmt::Write>(out: &mut W, start: Reg, count: u16) -> fmt::Result {
    if count == 0 {
        return out.write_str("{}");
    }
    write!(out, "{{{start} .. v{}}}", start.0 as u32 + count as u32 - 1)
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_with(f, |out, kind, index| write!(out, "{}@{index}", kind.prefix()))
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instruction({self})")
    }
}

/// Constructors for common instructions. Each returns an already validated
/// [`Instruction`] and panics on operands that do not fit, so they are meant
/// for literals written in code rather than for decoded input.
pub mod insn {
    use super::{Instruction, Label, Operands, Reg};
    use crate::opcode::Opcode;

    fn build(opcode: Opcode, operands: Operands) -> Instruction {
        match Instruction::new(opcode, operands) {
            Ok(insn) => insn,
            Err(e) => panic!("{e}"),
        }
    }

    pub fn nop() -> Instruction {
        build(Opcode::Nop, Operands::None)
    }

    pub fn return_void() -> Instruction {
        build(Opcode::ReturnVoid, Operands::None)
    }

    pub fn return_(register: Reg) -> Instruction {
        build(Opcode::Return, Operands::Register(register))
    }

    pub fn return_object(register: Reg) -> Instruction {
        build(Opcode::ReturnObject, Operands::Register(register))
    }

    pub fn throw(register: Reg) -> Instruction {
        build(Opcode::Throw, Operands::Register(register))
    }

    pub fn move_result(register: Reg) -> Instruction {
        build(Opcode::MoveResult, Operands::Register(register))
    }

    pub fn move_result_object(register: Reg) -> Instruction {
        build(Opcode::MoveResultObject, Operands::Register(register))
    }

    pub fn move_result_wide(register: Reg) -> Instruction {
        build(Opcode::MoveResultWide, Operands::Register(register))
    }

    pub fn move_(dst: Reg, src: Reg) -> Instruction {
        build(Opcode::Move, Operands::RegisterPair(dst, src))
    }

    pub fn const4(register: Reg, value: i64) -> Instruction {
        build(Opcode::Const4, Operands::Literal(register, value))
    }

    pub fn const16(register: Reg, value: i64) -> Instruction {
        build(Opcode::Const16, Operands::Literal(register, value))
    }

    pub fn const_(register: Reg, value: i64) -> Instruction {
        build(Opcode::Const, Operands::Literal(register, value))
    }

    pub fn const_string(register: Reg, index: u32) -> Instruction {
        build(Opcode::ConstString, Operands::RegisterIndex(register, index))
    }

    pub fn add_int(dst: Reg, a: Reg, b: Reg) -> Instruction {
        build(Opcode::AddInt, Operands::RegisterTriple(dst, a, b))
    }

    pub fn goto(target: Label) -> Instruction {
        build(Opcode::Goto, Operands::Branch(target))
    }

    pub fn goto16(target: Label) -> Instruction {
        build(Opcode::Goto16, Operands::Branch(target))
    }

    pub fn goto32(target: Label) -> Instruction {
        build(Opcode::Goto32, Operands::Branch(target))
    }

    pub fn if_eqz(register: Reg, target: Label) -> Instruction {
        build(Opcode::IfEqz, Operands::RegisterBranch(register, target))
    }

    pub fn if_eq(a: Reg, b: Reg, target: Label) -> Instruction {
        build(Opcode::IfEq, Operands::RegisterPairBranch(a, b, target))
    }

    /// Fixed-register invoke (`35c`) of one of the `invoke-*` opcodes.
    pub fn invoke(opcode: Opcode, registers: &[Reg], method: u32) -> Instruction {
        build(
            opcode,
            Operands::FixedRegisters {
                registers: registers.to_vec(),
                index: method,
            },
        )
    }

    /// Register-range invoke (`3rc`) of one of the `invoke-*/range` opcodes.
    pub fn invoke_range(opcode: Opcode, start: Reg, count: u16, method: u32) -> Instruction {
        build(
            opcode,
            Operands::RegisterRange {
                start,
                count,
                index: method,
            },
        )
    }

    pub fn packed_switch(register: Reg, payload: Label) -> Instruction {
        build(Opcode::PackedSwitch, Operands::RegisterBranch(register, payload))
    }

    pub fn sparse_switch(register: Reg, payload: Label) -> Instruction {
        build(Opcode::SparseSwitch, Operands::RegisterBranch(register, payload))
    }

    pub fn fill_array_data(register: Reg, payload: Label) -> Instruction {
        build(Opcode::FillArrayData, Operands::RegisterBranch(register, payload))
    }

    pub fn packed_switch_payload(first_key: i32, targets: &[Label]) -> Instruction {
        build(
            Opcode::PackedSwitchPayload,
            Operands::PackedSwitch {
                first_key,
                targets: targets.to_vec(),
            },
        )
    }

    pub fn sparse_switch_payload(entries: &[(i32, Label)]) -> Instruction {
        build(
            Opcode::SparseSwitchPayload,
            Operands::SparseSwitch {
                keys: entries.iter().map(|(k, _)| *k).collect(),
                targets: entries.iter().map(|(_, t)| *t).collect(),
            },
        )
    }

    pub fn array_payload(element_width: u16, data: &[u8]) -> Instruction {
        build(
            Opcode::ArrayPayload,
            Operands::ArrayData {
                element_width,
                data: data.to_vec(),
            },
        )
    }
}
