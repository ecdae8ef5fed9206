//! Binary dex `code_item` parsing.

use dexpatch_isa::{DecodeError, Instruction, decode};
use log::debug;

use crate::error::ParseError;
use crate::leb128::{decode_sleb128, decode_uleb128};
use crate::method::MethodImplementation;

/// One typed catch clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeAddrPair {
    pub type_idx: u32,
    /// Code-unit address of the handler.
    pub addr: u32,
}

/// An `encoded_catch_handler`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatchHandler {
    pub catches: Vec<TypeAddrPair>,
    pub catch_all_addr: Option<u32>,
}

/// A `try_item` with its handler resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TryItem {
    /// First covered code unit.
    pub start_addr: u32,
    /// Number of covered code units.
    pub insn_count: u16,
    pub handler: CatchHandler,
}

impl TryItem {
    pub fn covers(&self, addr: u32) -> bool {
        addr >= self.start_addr && addr - self.start_addr < self.insn_count as u32
    }
}

/// Parsed `code_item`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeItem {
    pub registers_size: u16,
    pub ins_size: u16,
    pub outs_size: u16,
    pub debug_info_off: u32,
    /// Raw instruction stream in code units.
    pub insns: Vec<u16>,
    pub tries: Vec<TryItem>,
}

/// Size of the fixed header in front of `insns`.
const HEADER_SIZE: usize = 16;
const TRY_ITEM_SIZE: usize = 8;

fn field<const N: usize>(data: &[u8], pos: usize) -> Result<[u8; N], ParseError> {
    let end = pos.saturating_add(N);
    data.get(pos..end)
        .and_then(|b| b.try_into().ok())
        .ok_or(ParseError::OffsetOutOfBounds(end, data.len()))
}

fn read_u16(data: &[u8], pos: usize) -> Result<u16, ParseError> {
    field(data, pos).map(u16::from_le_bytes)
}

fn read_u32(data: &[u8], pos: usize) -> Result<u32, ParseError> {
    field(data, pos).map(u32::from_le_bytes)
}

impl CodeItem {
    /// Parse a `code_item` at the given byte offset.
    pub fn parse(data: &[u8], offset: usize) -> Result<Self, ParseError> {
        let header_end = offset.saturating_add(HEADER_SIZE);
        if header_end > data.len() {
            return Err(ParseError::OffsetOutOfBounds(header_end, data.len()));
        }
        let mut pos = offset;
        let registers_size = read_u16(data, pos)?;
        let ins_size = read_u16(data, pos + 2)?;
        let outs_size = read_u16(data, pos + 4)?;
        let tries_size = read_u16(data, pos + 6)?;
        let debug_info_off = read_u32(data, pos + 8)?;
        let insns_size = read_u32(data, pos + 12)? as usize;
        pos += HEADER_SIZE;

        let insn_end = insns_size
            .checked_mul(2)
            .and_then(|n| n.checked_add(pos))
            .ok_or(ParseError::OffsetOutOfBounds(usize::MAX, data.len()))?;
        if insn_end > data.len() {
            return Err(ParseError::OffsetOutOfBounds(insn_end, data.len()));
        }
        let insns = data[pos..insn_end]
            .chunks_exact(2)
            .map(|b| u16::from_le_bytes([b[0], b[1]]))
            .collect();
        pos = insn_end;

        let mut tries = Vec::with_capacity(tries_size as usize);
        if tries_size > 0 {
            // try_items are 4-byte aligned
            if insns_size % 2 == 1 {
                pos += 2;
            }
            let raw: Vec<(u32, u16, u16)> = (0..tries_size as usize)
                .map(|i| -> Result<(u32, u16, u16), ParseError> {
                    let at = pos + i * TRY_ITEM_SIZE;
                    Ok((read_u32(data, at)?, read_u16(data, at + 4)?, read_u16(data, at + 6)?))
                })
                .collect::<Result<_, _>>()?;
            pos += tries_size as usize * TRY_ITEM_SIZE;

            let handlers = parse_handler_list(data, pos)?;
            for (index, (start_addr, insn_count, handler_off)) in raw.into_iter().enumerate() {
                if start_addr as usize + insn_count as usize > insns_size {
                    return Err(ParseError::TryOutOfRange(index));
                }
                let handler = handlers
                    .iter()
                    .find(|(off, _)| *off == handler_off as usize)
                    .map(|(_, h)| h.clone())
                    .ok_or(ParseError::InvalidHandlerOffset {
                        index,
                        offset: handler_off,
                    })?;
                tries.push(TryItem {
                    start_addr,
                    insn_count,
                    handler,
                });
            }
        }

        debug!(
            "code_item @{offset:#x}: {registers_size} registers, {insns_size} code units, {} tries",
            tries.len()
        );

        Ok(Self {
            registers_size,
            ins_size,
            outs_size,
            debug_info_off,
            insns,
            tries,
        })
    }

    /// Decode `insns`, see [`dexpatch_isa::decode`].
    pub fn decode_instructions(&self) -> Result<Vec<(Instruction, u32)>, DecodeError> {
        decode(&self.insns)
    }

    /// Decode into an editable method body. Try ranges are not carried over.
    pub fn to_implementation(&self) -> Result<MethodImplementation, ParseError> {
        let instructions = self
            .decode_instructions()?
            .into_iter()
            .map(|(insn, _)| insn)
            .collect();
        Ok(MethodImplementation::new(self.registers_size, instructions))
    }
}

/// Parse an `encoded_catch_handler_list`, keyed by each handler's byte
/// offset from the start of the list.
fn parse_handler_list(data: &[u8], start: usize) -> Result<Vec<(usize, CatchHandler)>, ParseError> {
    let mut pos = start;
    let (count, consumed) = decode_uleb128(data, pos)?;
    pos += consumed;

    let mut handlers = Vec::with_capacity(count.min(1024) as usize);
    for _ in 0..count {
        let handler_off = pos - start;
        let (size, consumed) = decode_sleb128(data, pos)?;
        pos += consumed;

        let mut handler = CatchHandler::default();
        for _ in 0..size.unsigned_abs() {
            let (type_idx, consumed) = decode_uleb128(data, pos)?;
            pos += consumed;
            let (addr, consumed) = decode_uleb128(data, pos)?;
            pos += consumed;
            handler.catches.push(TypeAddrPair { type_idx, addr });
        }
        if size <= 0 {
            let (addr, consumed) = decode_uleb128(data, pos)?;
            pos += consumed;
            handler.catch_all_addr = Some(addr);
        }
        handlers.push((handler_off, handler));
    }
    Ok(handlers)
}
