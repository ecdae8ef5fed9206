//! Dex method bodies and the tooling to edit them: constant pool, method and
//! class model, smali-style assembler and disassembler, YAML listings and
//! binary `code_item` parsing.

pub mod access;
pub mod assemble;
pub mod class;
pub mod code_item;
pub mod disassemble;
pub mod error;
pub mod leb128;
pub mod listing;
pub mod method;
pub mod pool;
pub mod reference;

pub use access::AccessFlags;
pub use assemble::{assemble_instruction, assemble_method};
pub use class::{ClassDef, DexImage};
pub use code_item::{CatchHandler, CodeItem, TryItem, TypeAddrPair};
pub use disassemble::{disassemble, render_instruction};
pub use error::{AssembleError, AssembleErrorKind, Error, ListingError, ParseError, ReferenceError, Result};
pub use listing::{ClassListing, Listing, MethodListing};
pub use method::{Method, MethodImplementation};
pub use pool::ConstantPool;
pub use reference::{
    FieldReference, MethodReference, ProtoReference, Reference, is_type_descriptor, parse_type_list, quote, unquote,
};
