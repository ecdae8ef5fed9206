use dexpatch_isa::{DecodeError, EncodeError, OperandError};
use thiserror::Error;

/// Errors from editing a method body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("instruction index {0} out of bounds (method has {1} instructions)")]
    IndexOutOfBounds(usize, usize),

    #[error("label {0} out of bounds (method has {1} instructions)")]
    LabelOutOfBounds(u32, usize),

    #[error("register v{register} outside the frame of {registers} registers")]
    RegisterOutsideFrame { register: u32, registers: u16 },

    #[error("instruction {0}: payload slots cannot be replaced or created")]
    PayloadSlot(usize),

    #[error("method {0} has no implementation")]
    NoImplementation(String),

    #[error(transparent)]
    Assemble(#[from] AssembleError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Malformed reference text or an index the pool does not hold.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("malformed {kind} reference `{text}`")]
    Malformed { kind: &'static str, text: String },

    #[error("invalid type descriptor `{0}`")]
    InvalidType(String),

    #[error("{prefix}@{index} is not in the constant pool")]
    UnknownIndex { prefix: &'static str, index: u32 },

    #[error("instruction does not take a constant-pool reference")]
    NotAReference,
}

/// An assembly failure at a 1-based listing line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct AssembleError {
    pub line: usize,
    pub kind: AssembleErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssembleErrorKind {
    #[error("empty instruction")]
    Empty,

    #[error("unknown mnemonic `{0}`")]
    UnknownMnemonic(String),

    #[error("`{mnemonic}` expects {expected} operands, found {found}")]
    OperandCount {
        mnemonic: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("invalid register `{0}`")]
    InvalidRegister(String),

    #[error("invalid register list `{0}`")]
    InvalidRegisterList(String),

    #[error("invalid literal `{0}`")]
    InvalidLiteral(String),

    #[error("undefined label `{0}`")]
    UndefinedLabel(String),

    #[error("label `{0}` defined twice")]
    DuplicateLabel(String),

    #[error("malformed directive `{0}`")]
    Directive(String),

    #[error(transparent)]
    Reference(#[from] ReferenceError),

    #[error(transparent)]
    Operands(#[from] OperandError),
}

/// Errors from parsing a binary `code_item`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("offset {0:#x} out of bounds (data size: {1:#x})")]
    OffsetOutOfBounds(usize, usize),

    #[error("invalid LEB128 encoding at offset {0:#x}")]
    InvalidLeb128(usize),

    #[error("try item {index} points at handler offset {offset:#x} outside the handler list")]
    InvalidHandlerOffset { index: usize, offset: u16 },

    #[error("try item {0} covers code units past the end of the instructions")]
    TryOutOfRange(usize),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Errors from loading or saving a YAML listing.
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{class}->{method}: {source}")]
    Assemble {
        class: String,
        method: String,
        #[source]
        source: AssembleError,
    },

    #[error("{class}->{method}: {source}")]
    Encode {
        class: String,
        method: String,
        #[source]
        source: EncodeError,
    },

    #[error("{class}->{method}: register v{register} outside the frame of {registers} registers")]
    RegisterOutsideFrame {
        class: String,
        method: String,
        register: u32,
        registers: u16,
    },

    #[error("{context}: {source}")]
    Reference {
        context: String,
        #[source]
        source: ReferenceError,
    },

    #[error("unknown access flag `{0}`")]
    AccessFlag(String),

    #[error("I/O error: {0}")]
    Io(String),
}
