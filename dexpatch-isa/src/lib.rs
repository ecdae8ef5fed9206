//! Dalvik instruction set definitions.
//!
//! This crate provides the opcode table, instruction formats, the
//! [`Instruction`] operand model, and decoding/encoding between
//! instructions and 16-bit code units.

// The bitflags crate is used by the opcode table
pub use bitflags;

mod decoder;
mod emitter;
mod instruction;
mod opcode;

pub use decoder::{DecodeError, decode};
pub use emitter::{EncodeError, encode};
pub use instruction::{Instruction, Label, OperandError, Operands, Reg, hex, insn};
pub use opcode::{Format, Opcode, OpcodeFlags, ReferenceType, opcode_count, opcode_table};
