//! Smali-style assembler.
//!
//! One instruction per line, in the syntax [`Instruction`]'s `Display`
//! produces, with references written out in descriptor form:
//!
//! ```text
//! :check
//! invoke-virtual {v2}, Landroid/location/Location;->isMock()Z
//! move-result v2
//! if-eqz v2, :check
//! const-string v0, "mocked"
//! .packed-switch 0x0 {:a, :b}
//! ```
//!
//! Labels are `:name` lines naming the next instruction. `#` starts a
//! comment outside string literals.

use std::collections::HashMap;

use dexpatch_isa::{Format, Instruction, Label, Opcode, Operands, ReferenceType, Reg};

use crate::error::{AssembleError, AssembleErrorKind};
use crate::pool::ConstantPool;

type Kind = AssembleErrorKind;

/// Assemble one instruction. `:L<n>` labels are taken as instruction
/// indices.
pub fn assemble_instruction(text: &str, pool: &mut ConstantPool) -> Result<Instruction, AssembleError> {
    parse_instruction(text, pool, &numeric_label).map_err(|kind| AssembleError { line: 1, kind })
}

/// Assemble a method listing.
///
/// Label lines are collected first so branches may point forward. Blank
/// lines and comments are ignored; errors report the 1-based line.
pub fn assemble_method<S: AsRef<str>>(
    lines: &[S],
    pool: &mut ConstantPool,
) -> Result<Vec<Instruction>, AssembleError> {
    let mut labels: HashMap<&str, u32> = HashMap::new();
    let mut count = 0u32;
    for (n, line) in lines.iter().enumerate() {
        let line = strip_comment(line.as_ref());
        if line.is_empty() {
            continue;
        }
        match line.strip_prefix(':') {
            Some(name) => {
                if labels.insert(name, count).is_some() {
                    return Err(AssembleError {
                        line: n + 1,
                        kind: Kind::DuplicateLabel(line.to_string()),
                    });
                }
            }
            None => count += 1,
        }
    }

    let resolve = |name: &str| labels.get(name).copied();
    let mut instructions = Vec::with_capacity(count as usize);
    for (n, line) in lines.iter().enumerate() {
        let line = strip_comment(line.as_ref());
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        let insn = parse_instruction(line, pool, &resolve).map_err(|kind| AssembleError { line: n + 1, kind })?;
        instructions.push(insn);
    }
    Ok(instructions)
}

fn numeric_label(name: &str) -> Option<u32> {
    name.strip_prefix('L')?.parse().ok()
}

/// Drop a trailing `#` comment that is not inside a string literal.
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '#' if !in_string => return line[..i].trim(),
            _ => {}
        }
    }
    line.trim()
}

fn parse_instruction(
    text: &str,
    pool: &mut ConstantPool,
    labels: &dyn Fn(&str) -> Option<u32>,
) -> Result<Instruction, Kind> {
    let text = strip_comment(text);
    if text.is_empty() {
        return Err(Kind::Empty);
    }
    if text.starts_with('.') {
        return parse_directive(text, labels);
    }

    let (mnemonic, rest) = text.split_once(char::is_whitespace).unwrap_or((text, ""));
    let opcode = Opcode::from_mnemonic(mnemonic)
        .filter(|op| !op.is_payload())
        .ok_or_else(|| Kind::UnknownMnemonic(mnemonic.to_string()))?;
    let ops = split_operands(rest.trim());
    let kind = opcode.reference_type();
    let arity = |n: usize| -> Result<(), Kind> {
        if ops.len() == n {
            Ok(())
        } else {
            Err(Kind::OperandCount {
                mnemonic: opcode.mnemonic(),
                expected: n,
                found: ops.len(),
            })
        }
    };

    let operands = match opcode.format() {
        Format::F10x => {
            arity(0)?;
            Operands::None
        }
        Format::F11x => {
            arity(1)?;
            Operands::Register(register(ops[0])?)
        }
        Format::F12x | Format::F22x | Format::F32x => {
            arity(2)?;
            Operands::RegisterPair(register(ops[0])?, register(ops[1])?)
        }
        Format::F11n | Format::F21s | Format::F21h | Format::F31i | Format::F51l => {
            arity(2)?;
            Operands::Literal(register(ops[0])?, literal(ops[1])?)
        }
        Format::F22b | Format::F22s => {
            arity(3)?;
            Operands::RegisterPairLiteral(register(ops[0])?, register(ops[1])?, literal_i32(ops[2])?)
        }
        Format::F23x => {
            arity(3)?;
            Operands::RegisterTriple(register(ops[0])?, register(ops[1])?, register(ops[2])?)
        }
        Format::F10t | Format::F20t | Format::F30t => {
            arity(1)?;
            Operands::Branch(label(ops[0], labels)?)
        }
        Format::F21t | Format::F31t => {
            arity(2)?;
            Operands::RegisterBranch(register(ops[0])?, label(ops[1], labels)?)
        }
        Format::F22t => {
            arity(3)?;
            Operands::RegisterPairBranch(register(ops[0])?, register(ops[1])?, label(ops[2], labels)?)
        }
        Format::F21c | Format::F31c => {
            arity(2)?;
            Operands::RegisterIndex(register(ops[0])?, pool.intern_text(kind, ops[1])?)
        }
        Format::F22c => {
            arity(3)?;
            Operands::RegisterPairIndex(register(ops[0])?, register(ops[1])?, pool.intern_text(kind, ops[2])?)
        }
        Format::F35c => {
            arity(2)?;
            Operands::FixedRegisters {
                registers: register_list(ops[0])?,
                index: pool.intern_text(kind, ops[1])?,
            }
        }
        Format::F3rc => {
            arity(2)?;
            let (start, count) = register_range(ops[0])?;
            Operands::RegisterRange {
                start,
                count,
                index: pool.intern_text(kind, ops[1])?,
            }
        }
        Format::F45cc => {
            arity(3)?;
            Operands::FixedRegistersProto {
                registers: register_list(ops[0])?,
                index: pool.intern_text(kind, ops[1])?,
                proto: pool.intern_text(ReferenceType::MethodProto, ops[2])?,
            }
        }
        Format::F4rcc => {
            arity(3)?;
            let (start, count) = register_range(ops[0])?;
            Operands::RegisterRangeProto {
                start,
                count,
                index: pool.intern_text(kind, ops[1])?,
                proto: pool.intern_text(ReferenceType::MethodProto, ops[2])?,
            }
        }
        Format::Payload => return Err(Kind::UnknownMnemonic(mnemonic.to_string())),
    };

    Ok(Instruction::new(opcode, operands)?)
}

/// `.packed-switch`, `.sparse-switch` and `.array-data` payload lines.
fn parse_directive(text: &str, labels: &dyn Fn(&str) -> Option<u32>) -> Result<Instruction, Kind> {
    let malformed = || Kind::Directive(text.to_string());
    let (name, rest) = text.split_once(char::is_whitespace).ok_or_else(malformed)?;
    let (head, body) = rest.split_once('{').ok_or_else(malformed)?;
    let body = body.trim_end().strip_suffix('}').ok_or_else(malformed)?;
    let items: Vec<&str> = if body.trim().is_empty() {
        Vec::new()
    } else {
        body.split(',').map(str::trim).collect()
    };
    let head = head.trim();

    let (opcode, operands) = match name {
        ".packed-switch" => {
            let targets = items
                .iter()
                .map(|item| label(item, labels))
                .collect::<Result<_, _>>()?;
            (
                Opcode::PackedSwitchPayload,
                Operands::PackedSwitch {
                    first_key: literal_i32(head)?,
                    targets,
                },
            )
        }
        ".sparse-switch" => {
            if !head.is_empty() {
                return Err(malformed());
            }
            let mut keys = Vec::with_capacity(items.len());
            let mut targets = Vec::with_capacity(items.len());
            for item in &items {
                let (key, target) = item.split_once("->").ok_or_else(malformed)?;
                keys.push(literal_i32(key.trim())?);
                targets.push(label(target.trim(), labels)?);
            }
            (Opcode::SparseSwitchPayload, Operands::SparseSwitch { keys, targets })
        }
        ".array-data" => {
            let element_width: u16 = head.parse().map_err(|_| malformed())?;
            let width = element_width as usize;
            if !matches!(width, 1 | 2 | 4 | 8) {
                return Err(malformed());
            }
            let mut data = Vec::with_capacity(items.len() * width);
            for item in &items {
                let value = literal(item)?;
                if width < 8 {
                    let bits = width as u32 * 8;
                    let min = -(1i64 << (bits - 1));
                    let max = (1i64 << bits) - 1;
                    if value < min || value > max {
                        return Err(Kind::InvalidLiteral(item.to_string()));
                    }
                }
                data.extend_from_slice(&value.to_le_bytes()[..width]);
            }
            (Opcode::ArrayPayload, Operands::ArrayData { element_width, data })
        }
        _ => return Err(malformed()),
    };

    Ok(Instruction::new(opcode, operands)?)
}

/// Split on commas that are not inside braces or string literals.
fn split_operands(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => depth = depth.saturating_sub(1),
            ',' if !in_string && depth == 0 => {
                parts.push(text[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(text[start..].trim());
    parts
}

fn register(text: &str) -> Result<Reg, Kind> {
    text.strip_prefix('v')
        .and_then(|n| n.parse::<u16>().ok())
        .map(Reg)
        .ok_or_else(|| Kind::InvalidRegister(text.to_string()))
}

fn braced(text: &str) -> Result<&str, Kind> {
    text.strip_prefix('{')
        .and_then(|t| t.strip_suffix('}'))
        .map(str::trim)
        .ok_or_else(|| Kind::InvalidRegisterList(text.to_string()))
}

/// `{v1, v2}`
fn register_list(text: &str) -> Result<Vec<Reg>, Kind> {
    let inner = braced(text)?;
    if inner.is_empty() {
        return Ok(Vec::new());
    }
    inner.split(',').map(|r| register(r.trim())).collect()
}

/// `{v5 .. v7}`, or `{}` for an empty range.
fn register_range(text: &str) -> Result<(Reg, u16), Kind> {
    let inner = braced(text)?;
    if inner.is_empty() {
        return Ok((Reg(0), 0));
    }
    let invalid = || Kind::InvalidRegisterList(text.to_string());
    let (first, last) = inner.split_once("..").ok_or_else(invalid)?;
    let first = register(first.trim())?;
    let last = register(last.trim())?;
    let count = (last.0 as u32 + 1)
        .checked_sub(first.0 as u32)
        .filter(|&c| c > 0 && c <= u16::MAX as u32)
        .ok_or_else(invalid)?;
    Ok((first, count as u16))
}

fn label(text: &str, labels: &dyn Fn(&str) -> Option<u32>) -> Result<Label, Kind> {
    text.strip_prefix(':')
        .and_then(labels)
        .map(Label)
        .ok_or_else(|| Kind::UndefinedLabel(text.to_string()))
}

/// Signed decimal or `0x` hex. Hex up to 64 bits is taken as a bit pattern.
fn literal(text: &str) -> Result<i64, Kind> {
    let invalid = || Kind::InvalidLiteral(text.to_string());
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let magnitude = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).map_err(|_| invalid())?,
        None => digits.parse::<u64>().map_err(|_| invalid())?,
    };
    if negative {
        if magnitude > i64::MAX as u64 + 1 {
            return Err(invalid());
        }
        Ok((magnitude as i64).wrapping_neg())
    } else if magnitude > i64::MAX as u64 && !digits.starts_with("0x") && !digits.starts_with("0X") {
        Err(invalid())
    } else {
        Ok(magnitude as i64)
    }
}

fn literal_i32(text: &str) -> Result<i32, Kind> {
    i32::try_from(literal(text)?).map_err(|_| Kind::InvalidLiteral(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals() {
        assert_eq!(literal("0"), Ok(0));
        assert_eq!(literal("-0x1"), Ok(-1));
        assert_eq!(literal("0x7f"), Ok(127));
        assert_eq!(literal("-9223372036854775808"), Ok(i64::MIN));
        assert_eq!(literal("0xffffffffffffffff"), Ok(-1));
        assert!(literal("18446744073709551615").is_err());
        assert!(literal("0x").is_err());
        assert!(literal("v1").is_err());
    }

    #[test]
    fn operand_splitting() {
        assert_eq!(
            split_operands("{v1, v2}, La;->b(II)V"),
            vec!["{v1, v2}", "La;->b(II)V"]
        );
        assert_eq!(split_operands("v0, \"a, b\""), vec!["v0", "\"a, b\""]);
        assert!(split_operands("").is_empty());
    }

    #[test]
    fn comments_outside_strings() {
        assert_eq!(strip_comment("nop # pad"), "nop");
        assert_eq!(strip_comment("const-string v0, \"#1\""), "const-string v0, \"#1\"");
        assert_eq!(strip_comment("# whole line"), "");
    }

    #[test]
    fn register_ranges() {
        assert_eq!(register_range("{v5 .. v7}"), Ok((Reg(5), 3)));
        assert_eq!(register_range("{}"), Ok((Reg(0), 0)));
        assert!(register_range("{v7 .. v5}").is_err());
    }
}
