//! Methods and their instruction lists.

use dexpatch_isa::{EncodeError, Format, Instruction, Opcode, encode};
use log::trace;

use crate::access::AccessFlags;
use crate::assemble::assemble_instruction;
use crate::error::{Error, Result};
use crate::pool::ConstantPool;
use crate::reference::MethodReference;

/// Register frame and instruction list of a method with code.
///
/// Instructions are only ever substituted in place, so an index stays valid
/// for the life of the implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodImplementation {
    registers_count: u16,
    instructions: Vec<Instruction>,
}

impl MethodImplementation {
    pub fn new(registers_count: u16, instructions: Vec<Instruction>) -> Self {
        Self {
            registers_count,
            instructions,
        }
    }

    pub fn registers_count(&self) -> u16 {
        self.registers_count
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn instruction(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Substitute the instruction at `index`, returning the old one.
    ///
    /// The replacement must stay inside the register frame, its labels must
    /// name existing instructions, and neither side may be a payload.
    pub fn replace_instruction(&mut self, index: usize, instruction: Instruction) -> Result<Instruction> {
        let len = self.instructions.len();
        let current = self
            .instructions
            .get(index)
            .ok_or(Error::IndexOutOfBounds(index, len))?;
        if current.opcode().is_payload() || instruction.opcode().is_payload() {
            return Err(Error::PayloadSlot(index));
        }
        if let Some(register) = instruction.max_register() {
            if register >= self.registers_count as u32 {
                return Err(Error::RegisterOutsideFrame {
                    register,
                    registers: self.registers_count,
                });
            }
        }
        for label in instruction.labels() {
            let Some(target) = self.instructions.get(label.0 as usize) else {
                return Err(Error::LabelOutOfBounds(label.0, len));
            };
            if target.opcode().is_payload() != (instruction.opcode().format() == Format::F31t) {
                return Err(Error::PayloadSlot(label.0 as usize));
            }
            if payload_for(instruction.opcode()).is_some_and(|expected| target.opcode() != expected) {
                return Err(Error::PayloadSlot(label.0 as usize));
            }
        }

        trace!("replace [{index}] {current} -> {instruction}");
        Ok(std::mem::replace(&mut self.instructions[index], instruction))
    }

    /// Assemble a single smali line and substitute it at `index`.
    ///
    /// References in `text` are interned into `pool`; `:L<n>` labels name
    /// instruction indices directly.
    pub fn replace_instruction_text(
        &mut self,
        index: usize,
        text: &str,
        pool: &mut ConstantPool,
    ) -> Result<Instruction> {
        if index >= self.instructions.len() {
            return Err(Error::IndexOutOfBounds(index, self.instructions.len()));
        }
        let instruction = assemble_instruction(text, pool)?;
        self.replace_instruction(index, instruction)
    }

    /// Encode to code units, see [`dexpatch_isa::encode`].
    pub fn encode(&self) -> std::result::Result<(Vec<u16>, Vec<u32>), EncodeError> {
        encode(&self.instructions)
    }
}

fn payload_for(opcode: Opcode) -> Option<Opcode> {
    match opcode {
        Opcode::PackedSwitch => Some(Opcode::PackedSwitchPayload),
        Opcode::SparseSwitch => Some(Opcode::SparseSwitchPayload),
        Opcode::FillArrayData => Some(Opcode::ArrayPayload),
        _ => None,
    }
}

/// A method declaration, with code unless abstract or native.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub defining_class: String,
    pub name: String,
    pub parameters: Vec<String>,
    pub return_type: String,
    pub access_flags: AccessFlags,
    pub implementation: Option<MethodImplementation>,
}

impl Method {
    pub fn reference(&self) -> MethodReference {
        MethodReference {
            defining_class: self.defining_class.clone(),
            name: self.name.clone(),
            parameter_types: self.parameters.clone(),
            return_type: self.return_type.clone(),
        }
    }

    pub fn implementation(&self) -> Option<&MethodImplementation> {
        self.implementation.as_ref()
    }

    pub fn implementation_mut(&mut self) -> Option<&mut MethodImplementation> {
        self.implementation.as_mut()
    }

    pub fn replace_instruction(&mut self, index: usize, instruction: Instruction) -> Result<Instruction> {
        let reference = self.reference();
        self.implementation
            .as_mut()
            .ok_or_else(|| Error::NoImplementation(reference.to_string()))?
            .replace_instruction(index, instruction)
    }

    pub fn replace_instruction_text(
        &mut self,
        index: usize,
        text: &str,
        pool: &mut ConstantPool,
    ) -> Result<Instruction> {
        let reference = self.reference();
        self.implementation
            .as_mut()
            .ok_or_else(|| Error::NoImplementation(reference.to_string()))?
            .replace_instruction_text(index, text, pool)
    }
}
